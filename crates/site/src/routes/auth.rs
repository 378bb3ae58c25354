//! Authentication route handlers.
//!
//! Sign-in and sign-up go through the hosted auth service; the resulting
//! tokens are kept server-side in the session store.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{OriginalUri, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use safe_disposal_core::Email;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::views::PageShell;
use crate::filters;
use crate::middleware::{LOGIN_PATH, OptionalSession};
use crate::notice::{self, NoticeKind, NoticeQuery};
use crate::services::SessionError;
use crate::state::AppState;
use crate::supabase::BackendError;

/// Shortest password the sign-up form accepts.
pub const MIN_PASSWORD_CHARS: usize = 6;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Sign-up form data.
#[derive(Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Which tab the auth page opens on.
#[derive(Debug, Default, Deserialize)]
pub struct AuthQuery {
    #[serde(default)]
    pub tab: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Sign in / sign up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth.html")]
pub struct AuthTemplate {
    pub shell: PageShell,
    pub signup: bool,
    pub min_password: usize,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the sign in / sign up page. Signed-in users go home.
pub async fn page(
    OptionalSession(auth): OptionalSession,
    Query(notice): Query<NoticeQuery>,
    Query(query): Query<AuthQuery>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    if auth.is_some() {
        return Redirect::to("/").into_response();
    }
    AuthTemplate {
        shell: PageShell::new(None, &notice, &super::path_and_query(&uri)),
        signup: query.tab.as_deref() == Some("signup"),
        min_password: MIN_PASSWORD_CHARS,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Redirect {
    let Ok(email) = Email::parse(&form.email) else {
        return notice::redirect(LOGIN_PATH, NoticeKind::InvalidCredentials);
    };

    match state.sessions().sign_in(&session, &email, &form.password).await {
        Ok(_) => notice::redirect(
            &notice::local_path(form.return_to.as_deref()),
            NoticeKind::SignedIn,
        ),
        Err(SessionError::Backend(BackendError::Unauthorized(_))) => {
            tracing::info!(email_domain = email.domain(), "Login rejected");
            notice::redirect(LOGIN_PATH, NoticeKind::InvalidCredentials)
        }
        Err(e) => {
            tracing::error!(error = %e, "Login failed");
            notice::redirect(LOGIN_PATH, NoticeKind::AuthUnavailable)
        }
    }
}

/// Handle sign-up form submission.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Redirect {
    let signup_page = format!("{LOGIN_PATH}?tab=signup");
    let email = match Email::parse(&form.email) {
        Ok(email) if form.password.chars().count() >= MIN_PASSWORD_CHARS => email,
        _ => return notice::redirect(&signup_page, NoticeKind::InvalidSignup),
    };
    let full_name = Some(form.full_name.trim()).filter(|name| !name.is_empty());

    match state
        .sessions()
        .sign_up(&session, &email, &form.password, full_name)
        .await
    {
        Ok(Some(_)) => notice::redirect("/", NoticeKind::SignedUp),
        Ok(None) => notice::redirect(LOGIN_PATH, NoticeKind::ConfirmEmail),
        Err(SessionError::Backend(BackendError::Duplicate(_))) => {
            notice::redirect(&signup_page, NoticeKind::AccountExists)
        }
        Err(SessionError::Backend(
            BackendError::Unauthorized(_) | BackendError::Api { status: 400..=499, .. },
        )) => notice::redirect(&signup_page, NoticeKind::InvalidSignup),
        Err(e) => {
            tracing::error!(error = %e, "Sign-up failed");
            notice::redirect(&signup_page, NoticeKind::AuthUnavailable)
        }
    }
}

/// Sign out and go home.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    if let Err(e) = state.sessions().sign_out(&session).await {
        tracing::error!(error = %e, "Failed to clear session on logout");
    }
    notice::redirect("/", NoticeKind::SignedOut)
}
