//! Authentication extractors.
//!
//! Protected views take [`RequireSession`]; views that only greet the user
//! take [`OptionalSession`]. Both go through the session gateway, so an
//! expired access token is refreshed before the handler runs.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::AuthSession;
use crate::services::ViewAccess;
use crate::state::AppState;

/// Where unauthenticated visitors of protected views are sent.
pub const LOGIN_PATH: &str = "/auth";

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn wishlist(RequireSession(auth): RequireSession) -> impl IntoResponse {
///     format!("Saved items for {}", auth.display_name())
/// }
/// ```
pub struct RequireSession(pub AuthSession);

/// Rejection for [`RequireSession`].
#[derive(Debug)]
pub enum AuthRejection {
    /// No signed-in user; send them to the login page.
    RedirectToLogin,
    /// Session layer missing from the stack.
    MissingSessionLayer,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::MissingSessionLayer => {
                tracing::error!("Session layer not installed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::MissingSessionLayer)?;
        let state = AppState::from_ref(state);

        let current = state.sessions().current(&session).await;
        match ViewAccess::Checking.resolve(current) {
            ViewAccess::Authenticated(auth) => Ok(Self(*auth)),
            ViewAccess::Checking | ViewAccess::Redirecting => {
                tracing::debug!(path = %parts.uri.path(), "Protected view without session");
                Err(AuthRejection::RedirectToLogin)
            }
        }
    }
}

/// Extractor that yields the signed-in user if there is one.
pub struct OptionalSession(pub Option<AuthSession>);

impl<S> FromRequestParts<S> for OptionalSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(Self(None));
        };
        let state = AppState::from_ref(state);
        Ok(Self(state.sessions().current(&session).await))
    }
}
