//! Table endpoints: `wishlist` and `profiles`.
//!
//! Filters use the `column=op.value` query syntax of the table API.

use reqwest::header::ACCEPT;
use serde::Serialize;

use safe_disposal_core::{ItemRef, NewWishlistRow, WishlistItem, WishlistItemId};

use super::{BackendError, SupabaseClient, check, decode};
use crate::models::{AuthSession, Profile};

const WISHLIST: &str = "wishlist";
const PROFILES: &str = "profiles";
const WISHLIST_COLUMNS: &str = "id,user_id,product_id,resource_id";

/// Ask for a single object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

#[derive(Serialize)]
struct ProfileUpdate<'a> {
    full_name: &'a str,
}

impl SupabaseClient {
    /// Insert a wishlist row for the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Duplicate` if the user already saved the item.
    #[tracing::instrument(skip(self, session), fields(user_id = %session.user_id, item = item.id()))]
    pub async fn insert_wishlist(
        &self,
        session: &AuthSession,
        item: &ItemRef,
    ) -> Result<(), BackendError> {
        let url = self.rest_url(WISHLIST)?;
        let response = self
            .http()
            .post(url)
            .bearer_auth(session.bearer())
            .header("Prefer", "return=minimal")
            .json(&NewWishlistRow::new(&session.user_id, item))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// All wishlist rows owned by the signed-in user.
    ///
    /// Rows that reference neither or both kinds are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not an array.
    #[tracing::instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn select_wishlist(
        &self,
        session: &AuthSession,
    ) -> Result<Vec<WishlistItem>, BackendError> {
        let mut url = self.rest_url(WISHLIST)?;
        url.query_pairs_mut()
            .append_pair("select", WISHLIST_COLUMNS)
            .append_pair("user_id", &format!("eq.{}", session.user_id));

        let response = self
            .http()
            .get(url)
            .bearer_auth(session.bearer())
            .send()
            .await?;

        let rows: Vec<serde_json::Value> = decode(response).await?;
        Ok(decode_rows(rows))
    }

    /// Delete one wishlist row owned by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[tracing::instrument(skip(self, session), fields(user_id = %session.user_id, row = %id))]
    pub async fn delete_wishlist(
        &self,
        session: &AuthSession,
        id: &WishlistItemId,
    ) -> Result<(), BackendError> {
        let mut url = self.rest_url(WISHLIST)?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"))
            .append_pair("user_id", &format!("eq.{}", session.user_id));

        let response = self
            .http()
            .delete(url)
            .bearer_auth(session.bearer())
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// The signed-in user's profile row.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or no row exists.
    #[tracing::instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn fetch_profile(&self, session: &AuthSession) -> Result<Profile, BackendError> {
        let mut url = self.rest_url(PROFILES)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("id", &format!("eq.{}", session.user_id));

        let response = self
            .http()
            .get(url)
            .bearer_auth(session.bearer())
            .header(ACCEPT, SINGLE_OBJECT)
            .send()
            .await?;

        decode(response).await
    }

    /// Set the signed-in user's display name.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[tracing::instrument(skip(self, session, full_name), fields(user_id = %session.user_id))]
    pub async fn update_profile_name(
        &self,
        session: &AuthSession,
        full_name: &str,
    ) -> Result<(), BackendError> {
        let mut url = self.rest_url(PROFILES)?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{}", session.user_id));

        let response = self
            .http()
            .patch(url)
            .bearer_auth(session.bearer())
            .header("Prefer", "return=minimal")
            .json(&ProfileUpdate { full_name })
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

fn decode_rows(rows: Vec<serde_json::Value>) -> Vec<WishlistItem> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<WishlistItem>(row) {
            Ok(item) => Some(item),
            Err(error) => {
                tracing::warn!(%error, "Skipping malformed wishlist row");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use safe_disposal_core::ItemKind;

    #[test]
    fn test_decode_rows_skips_malformed() {
        let rows = vec![
            serde_json::json!({"id": "w1", "user_id": "u", "product_id": "prd-001", "resource_id": null}),
            serde_json::json!({"id": "w2", "user_id": "u", "product_id": null, "resource_id": null}),
            serde_json::json!({"id": "w3", "user_id": "u", "product_id": null, "resource_id": "res-002"}),
        ];
        let items = decode_rows(rows);
        let kinds: Vec<ItemKind> = items.iter().map(|i| i.item.kind()).collect();
        assert_eq!(kinds, vec![ItemKind::Product, ItemKind::Resource]);
    }
}
