//! Product search and detail handlers.
//!
//! The search page re-runs the filter on every request; all state lives in
//! the query string so results are linkable.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{OriginalUri, Path, Query, State},
    response::IntoResponse,
};
use safe_disposal_core::{HazardLevel, ProductFilter};
use serde::Deserialize;
use tracing::instrument;

use super::views::{OptionView, PageShell, ProductCard};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::OptionalSession;
use crate::notice::NoticeQuery;
use crate::state::AppState;

/// Search form values. Missing fields mean "no filter".
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub q: String,
    pub category: String,
    pub hazard: String,
}

/// Product search page template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub shell: PageShell,
    pub query: String,
    pub categories: Vec<OptionView>,
    pub hazards: Vec<OptionView>,
    pub products: Vec<ProductCard>,
    pub filtered: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub shell: PageShell,
    pub product: ProductCard,
}

/// Display the product search page.
#[instrument(skip(state, auth, notice, uri))]
pub async fn index(
    State(state): State<AppState>,
    OptionalSession(auth): OptionalSession,
    Query(notice): Query<NoticeQuery>,
    Query(query): Query<SearchQuery>,
    OriginalUri(uri): OriginalUri,
) -> impl IntoResponse {
    let catalog = state.catalog();
    let filter = ProductFilter::new(&query.q, &query.category, &query.hazard);
    let products: Vec<ProductCard> = catalog
        .search_products(&filter)
        .into_iter()
        .map(ProductCard::from)
        .collect();
    tracing::debug!(results = products.len(), "Product search");

    let categories = catalog.product_categories();
    SearchTemplate {
        shell: PageShell::new(auth.as_ref(), &notice, &super::path_and_query(&uri)),
        query: query.q.trim().to_string(),
        categories: OptionView::list(
            "All Categories",
            categories.iter().map(|c| (*c, *c)),
            filter.category.as_param(),
        ),
        hazards: OptionView::list(
            "All Levels",
            HazardLevel::ALL.iter().map(|h| (h.as_str(), h.label())),
            filter.hazard.as_param(),
        ),
        products,
        filtered: !filter.is_unfiltered(),
    }
}

/// Display a product with its disposal instructions.
///
/// # Errors
///
/// Returns 404 if the product is not in the catalog.
#[instrument(skip(state, auth, notice, uri))]
pub async fn show(
    State(state): State<AppState>,
    OptionalSession(auth): OptionalSession,
    Query(notice): Query<NoticeQuery>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Result<impl IntoResponse> {
    let product = state
        .catalog()
        .product(&id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductTemplate {
        shell: PageShell::new(auth.as_ref(), &notice, &super::path_and_query(&uri)),
        product: ProductCard::from(product),
    })
}
