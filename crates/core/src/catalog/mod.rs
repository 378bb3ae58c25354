//! Static catalog store.
//!
//! Products and video resources are loaded once, wholesale, from two JSON
//! feeds and never change afterwards. The bundled feeds live in `data/` and
//! are compiled into the crate; callers that want different data (tests, the
//! CLI's `validate --dir`) hand their own JSON to [`Catalog::from_json`].

pub mod filter;

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::types::{HazardLevel, ProductId, ResourceId};
use crate::wishlist::{ItemRef, WishlistEntry, WishlistItem};

pub use filter::{ProductFilter, ResourceFilter, Searchable, Selector, TextQuery};

const BUNDLED_PRODUCTS: &str = include_str!("../../data/products.json");
const BUNDLED_RESOURCES: &str = include_str!("../../data/resources.json");

/// Which of the two feeds an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Products,
    Resources,
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Products => f.write_str("products"),
            Self::Resources => f.write_str("resources"),
        }
    }
}

/// Errors raised while loading catalog feeds.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A feed is not valid JSON or does not match the record shape.
    #[error("failed to parse {feed} feed: {source}")]
    Parse {
        feed: Feed,
        #[source]
        source: serde_json::Error,
    },

    /// Two records in the same feed share an id.
    #[error("duplicate id '{id}' in {feed} feed")]
    DuplicateId { feed: Feed, id: String },
}

/// Deserialize a missing or `null` string as empty.
fn string_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn hazard_or_null<'de, D>(deserializer: D) -> Result<HazardLevel, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<HazardLevel>::deserialize(deserializer)?.unwrap_or_default())
}

/// A medicinal or clinical product with disposal guidance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default, deserialize_with = "string_or_null")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub category: String,
    #[serde(default, deserialize_with = "hazard_or_null")]
    pub hazard_level: HazardLevel,
    #[serde(default, deserialize_with = "string_or_null")]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub image_url: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub disposal_instructions: String,
}

/// A training video in the resource library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    #[serde(default, deserialize_with = "string_or_null")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub category: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub video_url: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub thumbnail_url: String,
    #[serde(default, deserialize_with = "string_or_null")]
    pub duration: String,
}

impl Resource {
    /// Embeddable form of `video_url`.
    ///
    /// YouTube watch and short links are rewritten to their `/embed/` form;
    /// anything else is returned unchanged.
    #[must_use]
    pub fn embed_url(&self) -> String {
        let url = self.video_url.as_str();
        if let Some(rest) = url
            .strip_prefix("https://www.youtube.com/watch?v=")
            .or_else(|| url.strip_prefix("https://youtube.com/watch?v="))
        {
            let id = rest.split('&').next().unwrap_or(rest);
            return format!("https://www.youtube.com/embed/{id}");
        }
        if let Some(rest) = url.strip_prefix("https://youtu.be/") {
            let id = rest.split(['?', '&']).next().unwrap_or(rest);
            return format!("https://www.youtube.com/embed/{id}");
        }
        url.to_owned()
    }
}

/// A catalog record of either kind.
///
/// Serializes as `{"kind": "product", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum CatalogItem {
    Product(Product),
    Resource(Resource),
}

impl CatalogItem {
    /// Reference to this item, as stored in a wishlist.
    #[must_use]
    pub fn item_ref(&self) -> ItemRef {
        match self {
            Self::Product(p) => ItemRef::Product(p.id.clone()),
            Self::Resource(r) => ItemRef::Resource(r.id.clone()),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Product(p) => &p.name,
            Self::Resource(r) => &r.title,
        }
    }

    #[must_use]
    pub fn category(&self) -> &str {
        match self {
            Self::Product(p) => &p.category,
            Self::Resource(r) => &r.category,
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Product(p) => &p.description,
            Self::Resource(r) => &r.description,
        }
    }

    /// Image shown on cards: product photo or video thumbnail.
    #[must_use]
    pub fn image_url(&self) -> &str {
        match self {
            Self::Product(p) => &p.image_url,
            Self::Resource(r) => &r.thumbnail_url,
        }
    }

    /// Site path of the item's detail page.
    #[must_use]
    pub fn detail_path(&self) -> String {
        match self {
            Self::Product(p) => format!("/search/{}", p.id),
            Self::Resource(r) => format!("/resources/{}", r.id),
        }
    }

    #[must_use]
    pub const fn is_resource(&self) -> bool {
        matches!(self, Self::Resource(_))
    }
}

/// The immutable, load-time-populated catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    resources: Vec<Resource>,
}

impl Catalog {
    /// Load the feeds compiled into this crate.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the bundled data is malformed; the crate's
    /// own tests keep that from shipping.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json(BUNDLED_PRODUCTS, BUNDLED_RESOURCES)
    }

    /// Parse both feeds from JSON arrays.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed JSON and
    /// `CatalogError::DuplicateId` when a feed repeats an id.
    pub fn from_json(products: &str, resources: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> =
            serde_json::from_str(products).map_err(|source| CatalogError::Parse {
                feed: Feed::Products,
                source,
            })?;
        let resources: Vec<Resource> =
            serde_json::from_str(resources).map_err(|source| CatalogError::Parse {
                feed: Feed::Resources,
                source,
            })?;
        Self::from_records(products, resources)
    }

    /// Build a catalog from already-decoded records.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` when a feed repeats an id.
    pub fn from_records(
        products: Vec<Product>,
        resources: Vec<Resource>,
    ) -> Result<Self, CatalogError> {
        ensure_unique(Feed::Products, products.iter().map(|p| p.id.as_str()))?;
        ensure_unique(Feed::Resources, resources.iter().map(|r| r.id.as_str()))?;
        Ok(Self {
            products,
            resources,
        })
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    #[must_use]
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id.as_str() == id)
    }

    #[must_use]
    pub fn resource(&self, id: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id.as_str() == id)
    }

    /// Distinct product categories, in first-seen order.
    #[must_use]
    pub fn product_categories(&self) -> Vec<&str> {
        distinct(self.products.iter().map(|p| p.category.as_str()))
    }

    /// Distinct resource categories, in first-seen order.
    #[must_use]
    pub fn resource_categories(&self) -> Vec<&str> {
        distinct(self.resources.iter().map(|r| r.category.as_str()))
    }

    /// Products matching `filter`, in catalog order.
    #[must_use]
    pub fn search_products(&self, filter: &ProductFilter) -> Vec<&Product> {
        filter.apply(&self.products)
    }

    /// Resources matching `filter`, in catalog order.
    #[must_use]
    pub fn search_resources(&self, filter: &ResourceFilter) -> Vec<&Resource> {
        filter.apply(&self.resources)
    }

    /// Look up the record an item reference points at.
    #[must_use]
    pub fn resolve(&self, item: &ItemRef) -> Option<CatalogItem> {
        match item {
            ItemRef::Product(id) => self.product(id.as_str()).cloned().map(CatalogItem::Product),
            ItemRef::Resource(id) => self
                .resource(id.as_str())
                .cloned()
                .map(CatalogItem::Resource),
        }
    }

    /// Resolve a stored wishlist row into a displayable entry.
    ///
    /// Returns `None` when the row points at an id this catalog doesn't have.
    #[must_use]
    pub fn resolve_entry(&self, row: &WishlistItem) -> Option<WishlistEntry> {
        self.resolve(&row.item).map(|item| WishlistEntry {
            id: row.id.clone(),
            item,
        })
    }
}

fn ensure_unique<'a>(
    feed: Feed,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                feed,
                id: id.to_owned(),
            });
        }
    }
    Ok(())
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::{UserId, WishlistItemId};

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = Catalog::bundled().unwrap();
        assert!(!catalog.products().is_empty());
        assert!(!catalog.resources().is_empty());
    }

    #[test]
    fn test_bundled_products_are_classified() {
        let catalog = Catalog::bundled().unwrap();
        for product in catalog.products() {
            assert_ne!(
                product.hazard_level,
                HazardLevel::Unclassified,
                "{} has no hazard level",
                product.id
            );
            assert!(!product.disposal_instructions.is_empty());
        }
    }

    #[test]
    fn test_missing_and_null_fields_become_empty() {
        let catalog = Catalog::from_json(
            r#"[{"id": "p1", "name": "Gauze", "category": "Dressings", "description": null}]"#,
            r#"[{"id": "r1", "title": "Intro"}]"#,
        )
        .unwrap();

        let product = &catalog.products()[0];
        assert_eq!(product.description, "");
        assert_eq!(product.image_url, "");
        assert_eq!(product.hazard_level, HazardLevel::Unclassified);

        let resource = &catalog.resources()[0];
        assert_eq!(resource.category, "");
        assert_eq!(resource.duration, "");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Catalog::from_json(
            r#"[{"id": "p1", "name": "A"}, {"id": "p1", "name": "B"}]"#,
            "[]",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::DuplicateId {
                feed: Feed::Products,
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_feed_names_the_feed() {
        let err = Catalog::from_json("[]", "{not json").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse resources feed"));
    }

    #[test]
    fn test_categories_are_distinct_in_first_seen_order() {
        let catalog = Catalog::from_json(
            r#"[
                {"id": "1", "name": "Bleach", "category": "Chemical"},
                {"id": "2", "name": "Syringe", "category": "Sharps"},
                {"id": "3", "name": "Lye", "category": "Chemical"},
                {"id": "4", "name": "Mystery"}
            ]"#,
            "[]",
        )
        .unwrap();
        assert_eq!(catalog.product_categories(), vec!["Chemical", "Sharps"]);
    }

    #[test]
    fn test_resolve_entry_drops_unknown_ids() {
        let catalog = Catalog::from_json(r#"[{"id": "1", "name": "Bleach"}]"#, "[]").unwrap();

        let known = WishlistItem {
            id: WishlistItemId::new("w1"),
            user_id: UserId::new("u1"),
            item: ItemRef::Product(ProductId::new("1")),
        };
        let unknown = WishlistItem {
            id: WishlistItemId::new("w2"),
            user_id: UserId::new("u1"),
            item: ItemRef::Resource(ResourceId::new("gone")),
        };

        let entry = catalog.resolve_entry(&known).unwrap();
        assert_eq!(entry.item.title(), "Bleach");
        assert!(catalog.resolve_entry(&unknown).is_none());
    }

    #[test]
    fn test_catalog_item_serializes_as_tagged_variant() {
        let item = CatalogItem::Resource(Resource {
            id: ResourceId::new("r1"),
            title: "Sharps safety".to_string(),
            description: String::new(),
            category: "Sharps".to_string(),
            video_url: String::new(),
            thumbnail_url: String::new(),
            duration: "4:10".to_string(),
        });
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"], "resource");
        assert_eq!(json["data"]["title"], "Sharps safety");
    }

    #[test]
    fn test_embed_url_rewrites_youtube_links() {
        let mut resource = Resource {
            id: ResourceId::new("r1"),
            title: String::new(),
            description: String::new(),
            category: String::new(),
            video_url: "https://www.youtube.com/watch?v=abc123&t=10".to_string(),
            thumbnail_url: String::new(),
            duration: String::new(),
        };
        assert_eq!(resource.embed_url(), "https://www.youtube.com/embed/abc123");

        resource.video_url = "https://youtu.be/xyz?si=1".to_string();
        assert_eq!(resource.embed_url(), "https://www.youtube.com/embed/xyz");

        resource.video_url = "https://player.vimeo.com/video/1".to_string();
        assert_eq!(resource.embed_url(), "https://player.vimeo.com/video/1");
    }
}
