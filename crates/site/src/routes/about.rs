//! Markdown content page handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{OriginalUri, Query, State},
    response::IntoResponse,
};
use chrono::NaiveDate;
use tracing::instrument;

use super::views::PageShell;
use crate::content::Highlight;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalSession;
use crate::notice::NoticeQuery;
use crate::state::AppState;

/// Content page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct ContentPageTemplate {
    pub shell: PageShell,
    pub title: String,
    pub description: String,
    pub updated_at: Option<NaiveDate>,
    pub highlights: Vec<Highlight>,
    pub content_html: String,
}

/// Display the About page.
///
/// # Errors
///
/// Returns 404 if the page doesn't exist.
#[instrument(skip_all)]
pub async fn about(
    State(state): State<AppState>,
    OptionalSession(auth): OptionalSession,
    Query(notice): Query<NoticeQuery>,
    OriginalUri(uri): OriginalUri,
) -> Result<impl IntoResponse> {
    let page = state
        .content()
        .page("about")
        .ok_or_else(|| AppError::NotFound("page about".to_string()))?;

    Ok(ContentPageTemplate {
        shell: PageShell::new(auth.as_ref(), &notice, &super::path_and_query(&uri)),
        title: page.meta.title.clone(),
        description: page.meta.description.clone().unwrap_or_default(),
        updated_at: page.meta.updated_at,
        highlights: page.meta.highlights.clone(),
        content_html: page.content_html.clone(),
    })
}
