//! Filter engine properties against the bundled catalog.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use safe_disposal_core::{
    Catalog, HazardLevel, Product, ProductFilter, ProductId, ResourceFilter,
};

fn catalog() -> Catalog {
    Catalog::bundled().unwrap()
}

fn ids(products: &[&Product]) -> Vec<String> {
    products.iter().map(|p| p.id.to_string()).collect()
}

/// Whether `sub` appears in `all` in the same relative order.
fn is_ordered_subsequence(sub: &[String], all: &[String]) -> bool {
    let mut rest = all.iter();
    sub.iter().all(|id| rest.any(|candidate| candidate == id))
}

#[test]
fn test_unfiltered_search_returns_whole_catalog_in_order() {
    let catalog = catalog();
    let found = catalog.search_products(&ProductFilter::new("", "all", "all"));
    let all: Vec<&Product> = catalog.products().iter().collect();
    assert_eq!(found, all);

    let resources = catalog.search_resources(&ResourceFilter::new("  ", ""));
    assert_eq!(resources.len(), catalog.resources().len());
}

#[test]
fn test_every_filter_yields_ordered_subsequence() {
    let catalog = catalog();
    let all = ids(&catalog.products().iter().collect::<Vec<_>>());

    let queries = ["", "pain", "VIALS", "needle", "zzz"];
    let categories = ["all", "Sharps", "Pharmaceutical", "Chemical", "Nope"];
    for q in queries {
        for cat in categories {
            for hazard in HazardLevel::ALL.into_iter().map(HazardLevel::as_str).chain(["all"]) {
                let filter = ProductFilter::new(q, cat, hazard);
                let found = catalog.search_products(&filter);
                assert!(
                    is_ordered_subsequence(&ids(&found), &all),
                    "{q:?}/{cat}/{hazard} is not an ordered subsequence"
                );
                assert!(found.iter().all(|p| filter.matches(p)));
            }
        }
    }
}

#[test]
fn test_sharps_category_selects_only_sharps() {
    let catalog = catalog();
    let found = catalog.search_products(&ProductFilter::new("", "Sharps", "all"));
    assert_eq!(ids(&found), ["prd-001", "prd-002", "prd-003"]);
}

#[test]
fn test_category_and_hazard_are_anded() {
    let catalog = catalog();
    let found = catalog.search_products(&ProductFilter::new("", "Sharps", "critical"));
    assert_eq!(ids(&found), ["prd-001", "prd-002"]);
}

#[test]
fn test_query_ignores_case() {
    let catalog = catalog();
    let lower = catalog.search_products(&ProductFilter::new("aspirin", "all", "all"));
    let upper = catalog.search_products(&ProductFilter::new("ASPIRIN", "all", "all"));
    assert_eq!(lower, upper);
    assert_eq!(lower[0].id, ProductId::new("prd-005"));
}

#[test]
fn test_sequential_filters_equal_combined_filter() {
    let catalog = catalog();
    let first = ProductFilter::new("", "Chemical", "all");
    let second = ProductFilter::new("", "all", "high");

    let step: Vec<&Product> = second.apply(catalog.search_products(&first));
    let combined = first.combine(&second).unwrap();
    assert_eq!(step, catalog.search_products(&combined));
    assert_eq!(ids(&step), ["prd-009", "prd-014"]);
}

#[test]
fn test_bleach_and_syringe_catalog() {
    let products = r#"[
        {"id": "1", "name": "Bleach", "category": "Chemical", "hazard_level": "high"},
        {"id": "2", "name": "Syringe", "category": "Sharps", "hazard_level": "critical"}
    ]"#;
    let catalog = Catalog::from_json(products, "[]").unwrap();
    let found = catalog.search_products(&ProductFilter::new("", "Sharps", "all"));
    assert_eq!(ids(&found), ["2"]);
}

#[test]
fn test_resource_filter_by_category() {
    let catalog = catalog();
    let found = catalog.search_resources(&ResourceFilter::new("", "Chemical"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Cleaning Up a Mercury Spill");
}
