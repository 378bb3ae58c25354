//! Video resource library handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{OriginalUri, Path, Query, State},
    response::IntoResponse,
};
use safe_disposal_core::ResourceFilter;
use serde::Deserialize;
use tracing::instrument;

use super::views::{OptionView, PageShell, ResourceCard};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalSession;
use crate::notice::NoticeQuery;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResourceQuery {
    pub q: String,
    pub category: String,
}

/// Resource library template.
#[derive(Template, WebTemplate)]
#[template(path = "resources.html")]
pub struct ResourcesTemplate {
    pub shell: PageShell,
    pub query: String,
    pub categories: Vec<OptionView>,
    pub resources: Vec<ResourceCard>,
}

/// Single video template.
#[derive(Template, WebTemplate)]
#[template(path = "resource.html")]
pub struct ResourceTemplate {
    pub shell: PageShell,
    pub resource: ResourceCard,
}

/// Display the resource library.
#[instrument(skip(state, auth, notice, uri))]
pub async fn index(
    State(state): State<AppState>,
    OptionalSession(auth): OptionalSession,
    Query(notice): Query<NoticeQuery>,
    Query(query): Query<ResourceQuery>,
    OriginalUri(uri): OriginalUri,
) -> impl IntoResponse {
    let catalog = state.catalog();
    let filter = ResourceFilter::new(&query.q, &query.category);
    let categories = catalog.resource_categories();

    ResourcesTemplate {
        shell: PageShell::new(auth.as_ref(), &notice, &super::path_and_query(&uri)),
        query: query.q.trim().to_string(),
        categories: OptionView::list(
            "All Categories",
            categories.iter().map(|c| (*c, *c)),
            filter.category.as_param(),
        ),
        resources: catalog
            .search_resources(&filter)
            .into_iter()
            .map(ResourceCard::from)
            .collect(),
    }
}

/// Display one video with its embedded player.
///
/// # Errors
///
/// Returns 404 if the resource is not in the catalog.
#[instrument(skip(state, auth, notice, uri))]
pub async fn show(
    State(state): State<AppState>,
    OptionalSession(auth): OptionalSession,
    Query(notice): Query<NoticeQuery>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<impl IntoResponse> {
    let resource = state
        .catalog()
        .resource(&id)
        .ok_or_else(|| AppError::NotFound(format!("resource {id}")))?;

    Ok(ResourceTemplate {
        shell: PageShell::new(auth.as_ref(), &notice, &super::path_and_query(&uri)),
        resource: ResourceCard::from(resource),
    })
}
