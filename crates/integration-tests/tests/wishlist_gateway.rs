//! Wishlist gateway scenarios against an in-memory store.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use safe_disposal_core::{Catalog, ItemKind, ItemRef, WishlistItem, WishlistItemId};
use safe_disposal_integration_tests::signed_in;
use safe_disposal_site::models::AuthSession;
use safe_disposal_site::notice::NoticeKind;
use safe_disposal_site::services::{
    AddOutcome, StoreError, WishlistError, WishlistGateway, WishlistStore,
};

/// Shared in-memory table with a (user, item) uniqueness rule.
#[derive(Clone, Default)]
struct SharedStore {
    rows: Arc<Mutex<Vec<WishlistItem>>>,
    calls: Arc<AtomicUsize>,
}

impl SharedStore {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl WishlistStore for SharedStore {
    async fn insert(&self, session: &AuthSession, item: &ItemRef) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|r| r.user_id == session.user_id && &r.item == item)
        {
            return Err(StoreError::Duplicate);
        }
        let id = WishlistItemId::new(format!("row-{}", rows.len() + 1));
        rows.push(WishlistItem {
            id,
            user_id: session.user_id.clone(),
            item: item.clone(),
        });
        Ok(())
    }

    async fn select(&self, session: &AuthSession) -> Result<Vec<WishlistItem>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|r| r.user_id == session.user_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, session: &AuthSession, id: &WishlistItemId) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.rows
            .lock()
            .unwrap()
            .retain(|r| !(r.user_id == session.user_id && &r.id == id));
        Ok(())
    }
}

fn gateway(store: &SharedStore) -> WishlistGateway<SharedStore> {
    WishlistGateway::new(store.clone(), Arc::new(Catalog::bundled().unwrap()))
}

fn product(id: &str) -> ItemRef {
    ItemRef::new(ItemKind::Product, id)
}

#[tokio::test]
async fn test_second_add_reports_already_saved() {
    let store = SharedStore::default();
    let wishlist = gateway(&store);
    let user = signed_in("user-1");

    let first = wishlist.add(Some(&user), product("prd-002")).await.unwrap();
    let second = wishlist.add(Some(&user), product("prd-002")).await.unwrap();

    assert_eq!(first, AddOutcome::Added);
    assert_eq!(second, AddOutcome::AlreadySaved);
    assert_eq!(wishlist.list(&user).await.unwrap().len(), 1);

    let duplicate = NoticeKind::AlreadySaved.notice();
    let failure = NoticeKind::WishlistAddFailed.notice();
    assert_ne!(duplicate.description, failure.description);
    assert!(!duplicate.is_destructive());
    assert!(failure.is_destructive());
}

#[tokio::test]
async fn test_add_without_session_never_reaches_store() {
    let store = SharedStore::default();
    let wishlist = gateway(&store);

    let result = wishlist.add(None, product("prd-001")).await;

    assert!(matches!(result, Err(WishlistError::LoginRequired)));
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_users_do_not_see_each_others_items() {
    let store = SharedStore::default();
    let wishlist = gateway(&store);
    let alice = signed_in("alice");
    let bob = signed_in("bob");

    wishlist.add(Some(&alice), product("prd-007")).await.unwrap();
    wishlist
        .add(Some(&bob), ItemRef::new(ItemKind::Resource, "res-005"))
        .await
        .unwrap();

    let mine = wishlist.list(&alice).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].item.title(), "Opioid Pain Patches");
}

#[tokio::test]
async fn test_remove_then_list_is_empty() {
    let store = SharedStore::default();
    let wishlist = gateway(&store);
    let user = signed_in("user-2");

    wishlist.add(Some(&user), product("prd-011")).await.unwrap();
    let saved = wishlist.list(&user).await.unwrap();
    wishlist.remove(&user, &saved[0].id).await.unwrap();

    assert!(wishlist.list(&user).await.unwrap().is_empty());
}
