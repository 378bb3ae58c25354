//! Wishlist handlers.
//!
//! Adding is open to everyone so that anonymous visitors get the "login
//! required" notice instead of a redirect to the login page; viewing and
//! removing need a session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{OriginalUri, Path, Query, State},
    response::{IntoResponse, Redirect},
};
use safe_disposal_core::{ItemKind, ItemRef, WishlistItemId};
use serde::Deserialize;
use tracing::instrument;

use super::views::{PageShell, WishlistEntryView};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalSession, RequireSession};
use crate::notice::{self, NoticeKind, NoticeQuery};
use crate::services::{AddOutcome, WishlistError};
use crate::state::AppState;

/// Add-to-wishlist form posted from catalog cards.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist.html")]
pub struct WishlistTemplate {
    pub shell: PageShell,
    pub items: Vec<WishlistEntryView>,
}

/// Display the signed-in user's saved items.
///
/// A failed load shows an empty list with an error notice.
#[instrument(skip_all, fields(user_id = %auth.user_id))]
pub async fn index(
    State(state): State<AppState>,
    RequireSession(auth): RequireSession,
    Query(notice): Query<NoticeQuery>,
    OriginalUri(uri): OriginalUri,
) -> impl IntoResponse {
    let shell = PageShell::new(Some(&auth), &notice, &super::path_and_query(&uri));

    match state.wishlist().list(&auth).await {
        Ok(entries) => WishlistTemplate {
            shell,
            items: entries.iter().map(WishlistEntryView::from).collect(),
        },
        Err(_) => WishlistTemplate {
            shell: shell.with_notice(NoticeKind::WishlistLoadFailed.notice()),
            items: Vec::new(),
        },
    }
}

/// Save a product or resource and return to the page it was added from.
///
/// # Errors
///
/// Returns 400 for an unknown kind and 404 for an id the catalog doesn't have.
#[instrument(skip(state, auth))]
pub async fn add(
    State(state): State<AppState>,
    OptionalSession(auth): OptionalSession,
    Form(form): Form<AddForm>,
) -> Result<Redirect> {
    let return_to = notice::local_path(form.return_to.as_deref());
    let kind: ItemKind = form.kind.parse().map_err(AppError::BadRequest)?;
    let item = ItemRef::new(kind, form.id.trim());

    let kind_notice = match state.wishlist().add(auth.as_ref(), item).await {
        Ok(AddOutcome::Added) => {
            add_breadcrumb("wishlist", "Added item", Some(&[("item", form.id.as_str())]));
            NoticeKind::WishlistAdded
        }
        Ok(AddOutcome::AlreadySaved) => match kind {
            ItemKind::Product => NoticeKind::AlreadySaved,
            ItemKind::Resource => NoticeKind::ResourceAlreadySaved,
        },
        Err(WishlistError::LoginRequired) => NoticeKind::LoginRequired,
        Err(WishlistError::UnknownItem(item)) => {
            return Err(AppError::NotFound(format!("{} {}", item.kind().as_str(), item.id())));
        }
        Err(WishlistError::Backend(_)) => NoticeKind::WishlistAddFailed,
    };

    Ok(notice::redirect(&return_to, kind_notice))
}

/// Delete one saved item.
#[instrument(skip(state, auth), fields(user_id = %auth.user_id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireSession(auth): RequireSession,
    Path(id): Path<String>,
) -> Redirect {
    let kind = match state.wishlist().remove(&auth, &WishlistItemId::new(id)).await {
        Ok(()) => NoticeKind::WishlistRemoved,
        Err(_) => NoticeKind::WishlistRemoveFailed,
    };
    notice::redirect("/wishlist", kind)
}
