//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{OriginalUri, Query, State},
    response::IntoResponse,
};
use safe_disposal_core::{Catalog, Product};
use tracing::instrument;

use super::views::{PageShell, ProductCard};
use crate::filters;
use crate::middleware::OptionalSession;
use crate::notice::NoticeQuery;
use crate::state::AppState;

/// Products shown under "Handle with care" on the home page.
const FEATURED_COUNT: usize = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub shell: PageShell,
    pub featured: Vec<ProductCard>,
    pub product_count: usize,
    pub resource_count: usize,
}

/// Display the home page.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    OptionalSession(auth): OptionalSession,
    Query(notice): Query<NoticeQuery>,
    OriginalUri(uri): OriginalUri,
) -> impl IntoResponse {
    let catalog = state.catalog();

    HomeTemplate {
        shell: PageShell::new(auth.as_ref(), &notice, &super::path_and_query(&uri)),
        featured: featured(catalog).into_iter().map(ProductCard::from).collect(),
        product_count: catalog.products().len(),
        resource_count: catalog.resources().len(),
    }
}

/// Highest-risk products first, catalog order within a level.
fn featured(catalog: &Catalog) -> Vec<&Product> {
    let mut products: Vec<_> = catalog.products().iter().collect();
    products.sort_by_key(|p| std::cmp::Reverse(p.hazard_level));
    products.truncate(FEATURED_COUNT);
    products
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_featured_puts_unclassified_last() {
        let products = r#"[
            {"id": "a", "name": "Mystery Vial", "hazard_level": "radioactive"},
            {"id": "b", "name": "Gauze", "hazard_level": "low"},
            {"id": "c", "name": "Scalpel", "hazard_level": "critical"},
            {"id": "d", "name": "Solvent", "hazard_level": "high"}
        ]"#;
        let catalog = Catalog::from_json(products, "[]").unwrap();

        let ids: Vec<&str> = featured(&catalog).iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, ["c", "d", "b"]);
    }
}
