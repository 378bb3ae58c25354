//! Safe Disposal Guide Core - Shared catalog library.
//!
//! This crate provides the types and logic shared by every Safe Disposal
//! component:
//! - `site` - Public server-rendered website
//! - `cli` - Command-line catalog tooling
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no network I/O,
//! no HTTP clients, no session handling. The bundled catalog data is compiled
//! in, so loading it never touches the filesystem.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, and hazard levels
//! - [`catalog`] - Product/resource records, the catalog store, and the filter engine
//! - [`wishlist`] - Wishlist item references and resolved entries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;
pub mod wishlist;

pub use catalog::{
    Catalog, CatalogError, CatalogItem, Feed, Product, ProductFilter, Resource, ResourceFilter,
};
pub use types::*;
pub use wishlist::{
    ItemKind, ItemRef, NewWishlistRow, WishlistEntry, WishlistItem, WishlistRowError,
};
