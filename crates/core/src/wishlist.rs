//! Wishlist item references.
//!
//! The hosted `wishlist` table stores one nullable column per catalog kind
//! (`product_id`, `resource_id`). Here that pair becomes [`ItemRef`], a tagged
//! variant, and the "exactly one is set" rule is checked once when a row is
//! decoded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogItem;
use crate::types::{ProductId, ResourceId, UserId, WishlistItemId};

/// Kind of catalog record a wishlist row points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Product,
    Resource,
}

impl ItemKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Resource => "resource",
        }
    }
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(Self::Product),
            "resource" => Ok(Self::Resource),
            _ => Err(format!("invalid item kind: {s}")),
        }
    }
}

/// Reference to a saved catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ItemRef {
    Product(ProductId),
    Resource(ResourceId),
}

impl ItemRef {
    #[must_use]
    pub fn new(kind: ItemKind, id: impl Into<String>) -> Self {
        match kind {
            ItemKind::Product => Self::Product(ProductId::new(id)),
            ItemKind::Resource => Self::Resource(ResourceId::new(id)),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        match self {
            Self::Product(_) => ItemKind::Product,
            Self::Resource(_) => ItemKind::Resource,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Product(id) => id.as_str(),
            Self::Resource(id) => id.as_str(),
        }
    }
}

/// A row whose item columns break the one-of rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WishlistRowError {
    #[error("wishlist row {0} references no item")]
    Empty(String),
    #[error("wishlist row {0} references both a product and a resource")]
    Ambiguous(String),
}

/// Wishlist row as the persistence service returns it.
#[derive(Debug, Deserialize)]
struct WishlistRow {
    id: WishlistItemId,
    user_id: UserId,
    #[serde(default)]
    product_id: Option<ProductId>,
    #[serde(default)]
    resource_id: Option<ResourceId>,
}

/// A saved item owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "WishlistRow")]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub user_id: UserId,
    pub item: ItemRef,
}

impl TryFrom<WishlistRow> for WishlistItem {
    type Error = WishlistRowError;

    fn try_from(row: WishlistRow) -> Result<Self, Self::Error> {
        let item = match (row.product_id, row.resource_id) {
            (Some(product), None) => ItemRef::Product(product),
            (None, Some(resource)) => ItemRef::Resource(resource),
            (None, None) => return Err(WishlistRowError::Empty(row.id.into_inner())),
            (Some(_), Some(_)) => return Err(WishlistRowError::Ambiguous(row.id.into_inner())),
        };
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            item,
        })
    }
}

/// Insert payload for the `wishlist` table.
#[derive(Debug, Serialize)]
pub struct NewWishlistRow<'a> {
    pub user_id: &'a UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<&'a ProductId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<&'a ResourceId>,
}

impl<'a> NewWishlistRow<'a> {
    #[must_use]
    pub const fn new(user_id: &'a UserId, item: &'a ItemRef) -> Self {
        match item {
            ItemRef::Product(id) => Self {
                user_id,
                product_id: Some(id),
                resource_id: None,
            },
            ItemRef::Resource(id) => Self {
                user_id,
                product_id: None,
                resource_id: Some(id),
            },
        }
    }
}

/// A wishlist row resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistEntry {
    pub id: WishlistItemId,
    pub item: CatalogItem,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_with_product_decodes() {
        let item: WishlistItem = serde_json::from_str(
            r#"{"id": "w1", "user_id": "u1", "product_id": "p9", "resource_id": null}"#,
        )
        .unwrap();
        assert_eq!(item.item, ItemRef::Product(ProductId::new("p9")));
        assert_eq!(item.item.kind(), ItemKind::Product);
    }

    #[test]
    fn test_row_with_resource_decodes() {
        let item: WishlistItem =
            serde_json::from_str(r#"{"id": "w2", "user_id": "u1", "resource_id": "r4"}"#).unwrap();
        assert_eq!(item.item.id(), "r4");
        assert_eq!(item.item.kind(), ItemKind::Resource);
    }

    #[test]
    fn test_row_with_neither_is_rejected() {
        let err = serde_json::from_str::<WishlistItem>(
            r#"{"id": "w3", "user_id": "u1", "product_id": null, "resource_id": null}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("references no item"));
    }

    #[test]
    fn test_row_with_both_is_rejected() {
        let err = serde_json::from_str::<WishlistItem>(
            r#"{"id": "w4", "user_id": "u1", "product_id": "p1", "resource_id": "r1"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn test_insert_payload_sets_one_column() {
        let user = UserId::new("u1");
        let item = ItemRef::new(ItemKind::Resource, "r7");
        let json = serde_json::to_value(NewWishlistRow::new(&user, &item)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"user_id": "u1", "resource_id": "r7"})
        );
    }

    #[test]
    fn test_item_ref_is_tagged() {
        let json = serde_json::to_value(ItemRef::new(ItemKind::Product, "p1")).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "product", "id": "p1"}));
    }
}
