//! Wishlist gateway.
//!
//! Thin CRUD adapter between the routes and the hosted `wishlist` table. The
//! table itself sits behind [`WishlistStore`] so the gateway can be driven by
//! an in-memory store in tests.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use safe_disposal_core::{Catalog, ItemRef, WishlistEntry, WishlistItem, WishlistItemId};

use crate::models::AuthSession;
use crate::supabase::{BackendError, SupabaseClient};

/// Failure reported by a [`WishlistStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The user already saved this item.
    #[error("item is already in the wishlist")]
    Duplicate,

    /// Any other persistence failure.
    #[error(transparent)]
    Backend(BackendError),
}

impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Duplicate(_) => Self::Duplicate,
            other => Self::Backend(other),
        }
    }
}

/// Persistence boundary for wishlist rows.
///
/// Implementations report a uniqueness conflict on insert as
/// [`StoreError::Duplicate`].
pub trait WishlistStore: Send + Sync {
    fn insert(
        &self,
        session: &AuthSession,
        item: &ItemRef,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn select(
        &self,
        session: &AuthSession,
    ) -> impl Future<Output = Result<Vec<WishlistItem>, StoreError>> + Send;

    fn delete(
        &self,
        session: &AuthSession,
        id: &WishlistItemId,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl WishlistStore for SupabaseClient {
    async fn insert(&self, session: &AuthSession, item: &ItemRef) -> Result<(), StoreError> {
        Ok(self.insert_wishlist(session, item).await?)
    }

    async fn select(&self, session: &AuthSession) -> Result<Vec<WishlistItem>, StoreError> {
        Ok(self.select_wishlist(session).await?)
    }

    async fn delete(&self, session: &AuthSession, id: &WishlistItemId) -> Result<(), StoreError> {
        Ok(self.delete_wishlist(session, id).await?)
    }
}

/// Successful outcome of [`WishlistGateway::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new row was stored.
    Added,
    /// The item was already saved; nothing changed.
    AlreadySaved,
}

/// Errors from wishlist operations.
#[derive(Debug, Error)]
pub enum WishlistError {
    /// No signed-in user.
    #[error("login required")]
    LoginRequired,

    /// The item is not in the catalog.
    #[error("unknown {} '{}'", .0.kind().as_str(), .0.id())]
    UnknownItem(ItemRef),

    /// The store failed.
    #[error("wishlist backend error: {0}")]
    Backend(#[from] StoreError),
}

/// Wishlist operations for the signed-in user.
#[derive(Clone)]
pub struct WishlistGateway<S> {
    store: S,
    catalog: Arc<Catalog>,
}

impl<S: WishlistStore> WishlistGateway<S> {
    #[must_use]
    pub const fn new(store: S, catalog: Arc<Catalog>) -> Self {
        Self { store, catalog }
    }

    /// Save `item` for the signed-in user.
    ///
    /// Without a session this fails with `LoginRequired` before touching the
    /// store. A duplicate save is `Ok(AddOutcome::AlreadySaved)`.
    ///
    /// # Errors
    ///
    /// `LoginRequired`, `UnknownItem`, or `Backend` for any other store failure.
    pub async fn add(
        &self,
        session: Option<&AuthSession>,
        item: ItemRef,
    ) -> Result<AddOutcome, WishlistError> {
        let session = session.ok_or(WishlistError::LoginRequired)?;
        if self.catalog.resolve(&item).is_none() {
            return Err(WishlistError::UnknownItem(item));
        }

        match self.store.insert(session, &item).await {
            Ok(()) => {
                tracing::info!(user_id = %session.user_id, item = item.id(), "Added to wishlist");
                Ok(AddOutcome::Added)
            }
            Err(StoreError::Duplicate) => {
                tracing::info!(user_id = %session.user_id, item = item.id(), "Item already in wishlist");
                Ok(AddOutcome::AlreadySaved)
            }
            Err(err) => {
                tracing::warn!(user_id = %session.user_id, error = %err, "Wishlist insert failed");
                Err(err.into())
            }
        }
    }

    /// Saved items resolved against the catalog, in store order.
    ///
    /// Rows whose item is no longer in the catalog are left out.
    ///
    /// # Errors
    ///
    /// `Backend` if the store fails.
    pub async fn list(&self, session: &AuthSession) -> Result<Vec<WishlistEntry>, WishlistError> {
        let rows = self.store.select(session).await.inspect_err(|err| {
            tracing::warn!(user_id = %session.user_id, error = %err, "Wishlist load failed");
        })?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let entry = self.catalog.resolve_entry(row);
                if entry.is_none() {
                    tracing::warn!(
                        row = %row.id,
                        kind = row.item.kind().as_str(),
                        item = row.item.id(),
                        "Wishlist row references an item missing from the catalog"
                    );
                }
                entry
            })
            .collect())
    }

    /// Delete one saved item.
    ///
    /// # Errors
    ///
    /// `Backend` if the store fails.
    pub async fn remove(
        &self,
        session: &AuthSession,
        id: &WishlistItemId,
    ) -> Result<(), WishlistError> {
        self.store.delete(session, id).await.map_err(|err| {
            tracing::warn!(user_id = %session.user_id, row = %id, error = %err, "Wishlist remove failed");
            WishlistError::from(err)
        })?;
        tracing::info!(user_id = %session.user_id, row = %id, "Removed from wishlist");
        Ok(())
    }
}
