//! Display data shared by page templates.

use safe_disposal_core::{CatalogItem, HazardLevel, Product, Resource, WishlistEntry};

use crate::models::AuthSession;
use crate::notice::{self, Notice, NoticeQuery};

/// Shown when a product has no photo.
pub const DEFAULT_PRODUCT_IMAGE: &str =
    "https://images.unsplash.com/photo-1587854692152-cbe660dbde88?w=400";

/// Shown when a resource has no thumbnail.
pub const DEFAULT_RESOURCE_IMAGE: &str =
    "https://images.unsplash.com/photo-1532187863486-abf9dbad1b69?w=400";

fn or_default(url: &str, fallback: &str) -> String {
    if url.trim().is_empty() {
        fallback.to_string()
    } else {
        url.to_string()
    }
}

/// Data every page needs: the nav greeting, the toast, and the current path
/// (the feedback form and wishlist buttons return to it).
#[derive(Debug, Clone)]
pub struct PageShell {
    pub user_name: Option<String>,
    pub notice: Option<Notice>,
    pub path: String,
}

impl PageShell {
    /// `path_and_query` is the request target; its `notice` parameter is
    /// consumed here so it does not survive the next redirect.
    #[must_use]
    pub fn new(auth: Option<&AuthSession>, notice: &NoticeQuery, path_and_query: &str) -> Self {
        Self {
            user_name: auth.map(|a| a.display_name().to_string()),
            notice: notice.resolve(),
            path: notice::without_notice(path_and_query),
        }
    }

    /// Same shell with a notice raised by the handler itself.
    #[must_use]
    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.user_name.is_some()
    }
}

/// An entry in a `<select>`.
#[derive(Debug, Clone)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl OptionView {
    /// "All" option followed by one option per value.
    #[must_use]
    pub fn list<'a>(
        all_label: &str,
        values: impl IntoIterator<Item = (&'a str, &'a str)>,
        current: &str,
    ) -> Vec<Self> {
        let mut options = vec![Self {
            value: "all".to_string(),
            label: all_label.to_string(),
            selected: current == "all",
        }];
        options.extend(values.into_iter().map(|(value, label)| Self {
            value: value.to_string(),
            label: label.to_string(),
            selected: value == current,
        }));
        options
    }
}

/// Product card data.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub category: String,
    pub hazard_level: HazardLevel,
    pub description: String,
    pub image_url: String,
    pub disposal_instructions: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            category: product.category.clone(),
            hazard_level: product.hazard_level,
            description: product.description.clone(),
            image_url: or_default(&product.image_url, DEFAULT_PRODUCT_IMAGE),
            disposal_instructions: product.disposal_instructions.clone(),
        }
    }
}

impl ProductCard {
    #[must_use]
    pub const fn hazard_label(&self) -> &'static str {
        self.hazard_level.label()
    }
}

/// Resource card data.
#[derive(Debug, Clone)]
pub struct ResourceCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub thumbnail_url: String,
    pub duration: String,
    pub video_url: String,
    pub embed_url: String,
}

impl From<&Resource> for ResourceCard {
    fn from(resource: &Resource) -> Self {
        Self {
            id: resource.id.to_string(),
            title: resource.title.clone(),
            description: resource.description.clone(),
            category: resource.category.clone(),
            thumbnail_url: or_default(&resource.thumbnail_url, DEFAULT_RESOURCE_IMAGE),
            duration: resource.duration.clone(),
            video_url: resource.video_url.clone(),
            embed_url: resource.embed_url(),
        }
    }
}

/// A saved item on the wishlist page.
#[derive(Debug, Clone)]
pub struct WishlistEntryView {
    /// Wishlist row id, used by the remove button.
    pub id: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub image_url: String,
    pub detail_path: String,
    pub is_resource: bool,
    pub hazard_level: Option<HazardLevel>,
}

impl From<&WishlistEntry> for WishlistEntryView {
    fn from(entry: &WishlistEntry) -> Self {
        let item = &entry.item;
        let (fallback, hazard_level) = match item {
            CatalogItem::Product(p) => (DEFAULT_PRODUCT_IMAGE, Some(p.hazard_level)),
            CatalogItem::Resource(_) => (DEFAULT_RESOURCE_IMAGE, None),
        };
        Self {
            id: entry.id.to_string(),
            title: item.title().to_string(),
            category: item.category().to_string(),
            description: item.description().to_string(),
            image_url: or_default(item.image_url(), fallback),
            detail_path: item.detail_path(),
            is_resource: item.is_resource(),
            hazard_level,
        }
    }
}
