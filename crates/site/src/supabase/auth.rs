//! Auth endpoints: password sign-in, sign-up, token refresh, sign-out.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use safe_disposal_core::{Email, UserId};

use super::{BackendError, SupabaseClient, check, decode};
use crate::models::AuthSession;

/// Result of a sign-up request.
#[derive(Debug)]
pub enum SignUpOutcome {
    /// The account is active and the user is signed in.
    SignedIn(Box<AuthSession>),
    /// The account was created but the email address must be confirmed first.
    ConfirmationPending,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: UserId,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    #[serde(default)]
    full_name: Option<String>,
}

/// Sign-up answers with a token pair when confirmation is off, and with the
/// bare user otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

#[derive(Serialize)]
struct SignUpMetadata<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<&'a str>,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Result<AuthSession, BackendError> {
        let email = self
            .user
            .email
            .as_deref()
            .ok_or_else(|| BackendError::Parse("auth user has no email".to_string()))
            .and_then(|raw| Email::parse(raw).map_err(|e| BackendError::Parse(e.to_string())))?;

        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| now + TimeDelta::seconds(self.expires_in));

        Ok(AuthSession {
            user_id: self.user.id,
            email,
            full_name: self.user.user_metadata.full_name,
            access_token: SecretString::from(self.access_token),
            refresh_token: SecretString::from(self.refresh_token),
            expires_at,
        })
    }
}

impl SupabaseClient {
    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unauthorized` for wrong credentials, and other
    /// variants if the request fails.
    #[tracing::instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, BackendError> {
        let mut url = self.auth_url("token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .http()
            .post(url)
            .json(&PasswordGrant {
                email: email.as_str(),
                password,
            })
            .send()
            .await?;

        let token: TokenResponse = decode(response).await?;
        token.into_session(Utc::now())
    }

    /// Create an account, storing `full_name` as user metadata.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Duplicate` if the email is already registered.
    #[tracing::instrument(skip(self, password, full_name), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<SignUpOutcome, BackendError> {
        let url = self.auth_url("signup")?;
        let response = self
            .http()
            .post(url)
            .json(&SignUpRequest {
                email: email.as_str(),
                password,
                data: SignUpMetadata { full_name },
            })
            .send()
            .await?;

        let body: SignUpResponse = decode(response).await?;
        match body {
            SignUpResponse::Session(token) => Ok(SignUpOutcome::SignedIn(Box::new(
                token.into_session(Utc::now())?,
            ))),
            SignUpResponse::User(_) => Ok(SignUpOutcome::ConfirmationPending),
        }
    }

    /// Exchange the refresh token for a new token pair.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unauthorized` if the refresh token was revoked
    /// or already used.
    #[tracing::instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, BackendError> {
        let mut url = self.auth_url("token")?;
        url.query_pairs_mut().append_pair("grant_type", "refresh_token");

        let response = self
            .http()
            .post(url)
            .json(&RefreshGrant {
                refresh_token: session.refresh_token.expose_secret(),
            })
            .send()
            .await?;

        let token: TokenResponse = decode(response).await?;
        token.into_session(Utc::now())
    }

    /// Revoke the session's refresh token.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[tracing::instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn sign_out(&self, session: &AuthSession) -> Result<(), BackendError> {
        let url = self.auth_url("logout")?;
        let response = self
            .http()
            .post(url)
            .bearer_auth(session.bearer())
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Check that the auth service is reachable.
    ///
    /// # Errors
    ///
    /// Returns error if the service is down or unreachable.
    pub async fn health(&self) -> Result<(), BackendError> {
        let url = self.auth_url("health")?;
        let response = self.http().get(url).send().await?;
        check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOKEN_BODY: &str = r#"{
        "access_token": "eyJhbGciOi.access",
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 1767225600,
        "refresh_token": "r-123",
        "user": {
            "id": "5f0c6b9e-8a1d-4c6e-9a33-0d7b0f1e2a44",
            "email": "Pharmacist@Clinic.Example",
            "user_metadata": {"full_name": "Sam Okafor"}
        }
    }"#;

    #[test]
    fn test_token_response_becomes_session() {
        let token: TokenResponse = serde_json::from_str(TOKEN_BODY).unwrap();
        let session = token.into_session(Utc::now()).unwrap();

        assert_eq!(session.user_id.as_str(), "5f0c6b9e-8a1d-4c6e-9a33-0d7b0f1e2a44");
        assert_eq!(session.email.as_str(), "pharmacist@clinic.example");
        assert_eq!(session.full_name.as_deref(), Some("Sam Okafor"));
        assert_eq!(session.bearer(), "eyJhbGciOi.access");
        assert_eq!(session.expires_at.timestamp(), 1_767_225_600);
    }

    #[test]
    fn test_expiry_falls_back_to_expires_in() {
        let body = TOKEN_BODY.replace("\"expires_at\": 1767225600,", "");
        let token: TokenResponse = serde_json::from_str(&body).unwrap();
        let now = Utc::now();
        let session = token.into_session(now).unwrap();
        assert_eq!(session.expires_at, now + TimeDelta::seconds(3600));
    }

    #[test]
    fn test_signup_without_session_needs_confirmation() {
        let body = r#"{"id": "u-1", "email": "new@clinic.example", "user_metadata": {}}"#;
        let parsed: SignUpResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(parsed, SignUpResponse::User(_)));

        let parsed: SignUpResponse = serde_json::from_str(TOKEN_BODY).unwrap();
        assert!(matches!(parsed, SignUpResponse::Session(_)));
    }

    #[test]
    fn test_signup_request_nests_metadata() {
        let json = serde_json::to_value(SignUpRequest {
            email: "a@b.org",
            password: "pw",
            data: SignUpMetadata {
                full_name: Some("Ana"),
            },
        })
        .unwrap();
        assert_eq!(json["data"]["full_name"], "Ana");
    }
}
