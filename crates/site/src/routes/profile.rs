//! Profile handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{OriginalUri, Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use super::views::PageShell;
use crate::filters;
use crate::middleware::RequireSession;
use crate::notice::{self, NoticeKind, NoticeQuery};
use crate::services::{ProfileError, rename};
use crate::state::AppState;

const PROFILE_PATH: &str = "/profile";

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub full_name: String,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub shell: PageShell,
    pub display_name: String,
    pub full_name: String,
    pub email: String,
    pub member_since: Option<String>,
}

/// Display the profile form.
///
/// When the row can't be loaded the form falls back to what the session
/// knows and shows an error notice.
#[instrument(skip_all, fields(user_id = %auth.user_id))]
pub async fn show(
    State(state): State<AppState>,
    RequireSession(auth): RequireSession,
    Query(notice): Query<NoticeQuery>,
    OriginalUri(uri): OriginalUri,
) -> impl IntoResponse {
    let shell = PageShell::new(Some(&auth), &notice, &super::path_and_query(&uri));

    match state.profiles().fetch(&auth).await {
        Ok(profile) => ProfileTemplate {
            shell,
            display_name: profile.display_name().to_string(),
            full_name: profile.full_name.clone().unwrap_or_default(),
            email: profile
                .email
                .clone()
                .unwrap_or_else(|| auth.email.to_string()),
            member_since: Some(profile.member_since()),
        },
        Err(_) => ProfileTemplate {
            shell: shell.with_notice(NoticeKind::ProfileLoadFailed.notice()),
            display_name: auth.display_name().to_string(),
            full_name: auth.full_name.clone().unwrap_or_default(),
            email: auth.email.to_string(),
            member_since: None,
        },
    }
}

/// Save a new full name.
#[instrument(skip_all, fields(user_id = %auth.user_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireSession(auth): RequireSession,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Redirect {
    let kind = match state.profiles().update_full_name(&auth, &form.full_name).await {
        Ok(name) => {
            if let Err(e) = rename(&session, &auth, &name).await {
                tracing::error!(error = %e, "Failed to store new display name in session");
            }
            NoticeKind::ProfileUpdated
        }
        Err(ProfileError::NameTooLong) => NoticeKind::ProfileNameTooLong,
        Err(ProfileError::Backend(_)) => NoticeKind::ProfileUpdateFailed,
    };
    notice::redirect(PROFILE_PATH, kind)
}
