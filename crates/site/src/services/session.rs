//! Session gateway.
//!
//! Keeps the signed-in [`AuthSession`] in the server-side session store and
//! keeps its access token fresh. Protected views resolve access through
//! [`ViewAccess`].

use std::future::Future;

use thiserror::Error;
use tower_sessions::Session;

use safe_disposal_core::Email;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{AuthSession, session_keys};
use crate::supabase::{BackendError, SignUpOutcome, SupabaseClient};

/// Errors from sign-in, sign-up, and sign-out.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store error: {0}")]
    Store(#[from] tower_sessions::session::Error),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Access resolution for a view that needs a signed-in user.
///
/// Starts in `Checking` and moves once to a terminal state.
#[derive(Debug)]
pub enum ViewAccess {
    Checking,
    Authenticated(Box<AuthSession>),
    Redirecting,
}

impl ViewAccess {
    /// Advance from `Checking` given the resolved session.
    ///
    /// Terminal states are returned unchanged.
    #[must_use]
    pub fn resolve(self, session: Option<AuthSession>) -> Self {
        match self {
            Self::Checking => session.map_or(Self::Redirecting, |s| Self::Authenticated(Box::new(s))),
            terminal => terminal,
        }
    }
}

/// Auth operations the session gateway needs from the hosted service.
pub trait AuthBackend: Send + Sync {
    fn sign_in(
        &self,
        email: &Email,
        password: &str,
    ) -> impl Future<Output = Result<AuthSession, BackendError>> + Send;

    fn sign_up(
        &self,
        email: &Email,
        password: &str,
        full_name: Option<&str>,
    ) -> impl Future<Output = Result<SignUpOutcome, BackendError>> + Send;

    fn refresh(
        &self,
        session: &AuthSession,
    ) -> impl Future<Output = Result<AuthSession, BackendError>> + Send;

    fn sign_out(&self, session: &AuthSession)
    -> impl Future<Output = Result<(), BackendError>> + Send;
}

impl AuthBackend for SupabaseClient {
    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, BackendError> {
        Self::sign_in(self, email, password).await
    }

    async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome, BackendError> {
        Self::sign_up(self, email, password, full_name).await
    }

    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, BackendError> {
        Self::refresh(self, session).await
    }

    async fn sign_out(&self, session: &AuthSession) -> Result<(), BackendError> {
        Self::sign_out(self, session).await
    }
}

/// Reads and writes the signed-in user in the session store.
#[derive(Clone)]
pub struct SessionGateway<A> {
    auth: A,
}

impl<A: AuthBackend> SessionGateway<A> {
    #[must_use]
    pub const fn new(auth: A) -> Self {
        Self { auth }
    }

    /// The signed-in user, if any.
    ///
    /// An expired access token is refreshed once. If the refresh is rejected
    /// the stored session is cleared and `None` is returned.
    pub async fn current(&self, session: &Session) -> Option<AuthSession> {
        let stored: AuthSession = match session.get(session_keys::AUTH_SESSION).await {
            Ok(Some(stored)) => stored,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read session");
                return None;
            }
        };

        if !stored.is_expired() {
            return Some(stored);
        }

        match self.auth.refresh(&stored).await {
            Ok(fresh) => {
                if let Err(e) = session.insert(session_keys::AUTH_SESSION, &fresh).await {
                    tracing::error!(error = %e, "Failed to store refreshed session");
                }
                tracing::debug!(user_id = %fresh.user_id, "Refreshed access token");
                Some(fresh)
            }
            Err(e) => {
                tracing::warn!(user_id = %stored.user_id, error = %e, "Token refresh failed, signing out");
                if let Err(e) = session
                    .remove::<AuthSession>(session_keys::AUTH_SESSION)
                    .await
                {
                    tracing::error!(error = %e, "Failed to clear session");
                }
                None
            }
        }
    }

    /// Sign in and store the session.
    ///
    /// # Errors
    ///
    /// `Backend(Unauthorized)` for wrong credentials; `Store` if the session
    /// cannot be written.
    pub async fn sign_in(
        &self,
        session: &Session,
        email: &Email,
        password: &str,
    ) -> Result<AuthSession, SessionError> {
        let auth = self.auth.sign_in(email, password).await?;
        establish(session, &auth).await?;
        tracing::info!(user_id = %auth.user_id, "User signed in");
        Ok(auth)
    }

    /// Create an account; signs the user in when the service allows it.
    ///
    /// # Errors
    ///
    /// `Backend(Duplicate)` if the email is taken; `Store` if the session
    /// cannot be written.
    pub async fn sign_up(
        &self,
        session: &Session,
        email: &Email,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<Option<AuthSession>, SessionError> {
        match self.auth.sign_up(email, password, full_name).await? {
            SignUpOutcome::SignedIn(auth) => {
                establish(session, &auth).await?;
                tracing::info!(user_id = %auth.user_id, "User signed up");
                Ok(Some(*auth))
            }
            SignUpOutcome::ConfirmationPending => {
                tracing::info!("Sign-up awaiting email confirmation");
                Ok(None)
            }
        }
    }

    /// Revoke tokens (best effort) and clear the session.
    ///
    /// # Errors
    ///
    /// Returns error if the session cannot be flushed.
    pub async fn sign_out(&self, session: &Session) -> Result<(), SessionError> {
        if let Ok(Some(auth)) = session.get::<AuthSession>(session_keys::AUTH_SESSION).await {
            if let Err(e) = self.auth.sign_out(&auth).await {
                tracing::warn!(user_id = %auth.user_id, error = %e, "Token revocation failed");
            }
            tracing::info!(user_id = %auth.user_id, "User signed out");
        }
        session.flush().await?;
        clear_sentry_user();
        Ok(())
    }
}

/// Replace the display name on the stored session so the greeting follows a
/// profile edit without signing in again.
///
/// # Errors
///
/// Returns error if the session cannot be written.
pub async fn rename(session: &Session, auth: &AuthSession, full_name: &str) -> Result<(), SessionError> {
    let mut renamed = auth.clone();
    renamed.full_name = (!full_name.is_empty()).then(|| full_name.to_string());
    session.insert(session_keys::AUTH_SESSION, &renamed).await?;
    Ok(())
}

/// Store `auth` under a fresh session id.
async fn establish(session: &Session, auth: &AuthSession) -> Result<(), SessionError> {
    session.cycle_id().await?;
    session.insert(session_keys::AUTH_SESSION, auth).await?;
    set_sentry_user(&auth.user_id, Some(auth.email.as_str()));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{TimeDelta, Utc};
    use secrecy::SecretString;
    use tower_sessions::MemoryStore;

    use safe_disposal_core::UserId;

    use super::*;

    #[derive(Default)]
    struct FakeAuth {
        refreshes: AtomicUsize,
        reject_refresh: bool,
    }

    fn auth_session(expires_in: TimeDelta, token: &str) -> AuthSession {
        AuthSession {
            user_id: UserId::new("u-42"),
            email: Email::parse("ward@hospital.example").unwrap(),
            full_name: Some("Ward Clerk".to_string()),
            access_token: SecretString::from(token),
            refresh_token: SecretString::from("refresh"),
            expires_at: Utc::now() + expires_in,
        }
    }

    impl AuthBackend for FakeAuth {
        async fn sign_in(&self, _email: &Email, password: &str) -> Result<AuthSession, BackendError> {
            if password == "correct horse" {
                Ok(auth_session(TimeDelta::hours(1), "signed-in"))
            } else {
                Err(BackendError::Unauthorized("Invalid login credentials".to_string()))
            }
        }

        async fn sign_up(
            &self,
            _email: &Email,
            _password: &str,
            _full_name: Option<&str>,
        ) -> Result<SignUpOutcome, BackendError> {
            Ok(SignUpOutcome::ConfirmationPending)
        }

        async fn refresh(&self, _session: &AuthSession) -> Result<AuthSession, BackendError> {
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            if self.reject_refresh {
                return Err(BackendError::Unauthorized("Invalid Refresh Token".to_string()));
            }
            Ok(auth_session(TimeDelta::hours(1), "refreshed"))
        }

        async fn sign_out(&self, _session: &AuthSession) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn new_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[test]
    fn test_view_access_transitions() {
        let redirect = ViewAccess::Checking.resolve(None);
        assert!(matches!(redirect, ViewAccess::Redirecting));

        let signed_in = ViewAccess::Checking.resolve(Some(auth_session(TimeDelta::hours(1), "t")));
        assert!(matches!(signed_in, ViewAccess::Authenticated(_)));

        // Terminal states do not move again.
        let still = ViewAccess::Redirecting.resolve(Some(auth_session(TimeDelta::hours(1), "t")));
        assert!(matches!(still, ViewAccess::Redirecting));
    }

    #[tokio::test]
    async fn test_current_without_login_is_none() {
        let gateway = SessionGateway::new(FakeAuth::default());
        assert!(gateway.current(&new_session()).await.is_none());
    }

    #[tokio::test]
    async fn test_sign_in_then_current() {
        let gateway = SessionGateway::new(FakeAuth::default());
        let session = new_session();
        let email = Email::parse("ward@hospital.example").unwrap();

        gateway.sign_in(&session, &email, "correct horse").await.unwrap();

        let current = gateway.current(&session).await.unwrap();
        assert_eq!(current.bearer(), "signed-in");
        assert_eq!(gateway.auth.refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wrong_password_stores_nothing() {
        let gateway = SessionGateway::new(FakeAuth::default());
        let session = new_session();
        let email = Email::parse("ward@hospital.example").unwrap();

        let err = gateway.sign_in(&session, &email, "nope").await.unwrap_err();

        assert!(matches!(err, SessionError::Backend(BackendError::Unauthorized(_))));
        assert!(gateway.current(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_once() {
        let gateway = SessionGateway::new(FakeAuth::default());
        let session = new_session();
        session
            .insert(session_keys::AUTH_SESSION, auth_session(-TimeDelta::minutes(5), "stale"))
            .await
            .unwrap();

        let current = gateway.current(&session).await.unwrap();
        assert_eq!(current.bearer(), "refreshed");

        // The refreshed token is stored, so the next read does not refresh.
        let again = gateway.current(&session).await.unwrap();
        assert_eq!(again.bearer(), "refreshed");
        assert_eq!(gateway.auth.refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_refresh_clears_session() {
        let gateway = SessionGateway::new(FakeAuth {
            reject_refresh: true,
            ..FakeAuth::default()
        });
        let session = new_session();
        session
            .insert(session_keys::AUTH_SESSION, auth_session(-TimeDelta::minutes(5), "stale"))
            .await
            .unwrap();

        assert!(gateway.current(&session).await.is_none());
        let stored: Option<AuthSession> = session.get(session_keys::AUTH_SESSION).await.unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn test_sign_up_pending_confirmation_does_not_sign_in() {
        let gateway = SessionGateway::new(FakeAuth::default());
        let session = new_session();
        let email = Email::parse("new@hospital.example").unwrap();

        let signed_in = gateway
            .sign_up(&session, &email, "long enough", Some("New Hire"))
            .await
            .unwrap();

        assert!(signed_in.is_none());
        assert!(gateway.current(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_rename_updates_greeting() {
        let gateway = SessionGateway::new(FakeAuth::default());
        let session = new_session();
        let email = Email::parse("ward@hospital.example").unwrap();
        let auth = gateway.sign_in(&session, &email, "correct horse").await.unwrap();

        rename(&session, &auth, "Charge Nurse").await.unwrap();
        assert_eq!(gateway.current(&session).await.unwrap().display_name(), "Charge Nurse");

        rename(&session, &auth, "").await.unwrap();
        assert_eq!(gateway.current(&session).await.unwrap().display_name(), "ward@hospital.example");
    }

    #[tokio::test]
    async fn test_sign_out_clears_session() {
        let gateway = SessionGateway::new(FakeAuth::default());
        let session = new_session();
        let email = Email::parse("ward@hospital.example").unwrap();
        gateway.sign_in(&session, &email, "correct horse").await.unwrap();

        gateway.sign_out(&session).await.unwrap();

        assert!(gateway.current(&session).await.is_none());
    }
}
