//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /about                  - About page (markdown content)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (auth service reachable)
//!
//! # Catalog
//! GET  /search                 - Product search (q, category, hazard)
//! GET  /search/{id}            - Product detail with disposal instructions
//! GET  /resources              - Video library (q, category)
//! GET  /resources/{id}         - Single video
//!
//! # Wishlist
//! GET  /wishlist               - Saved items (requires session)
//! POST /wishlist               - Add item (anonymous posts get a notice)
//! POST /wishlist/{id}/remove   - Remove item (requires session)
//!
//! # Account
//! GET  /profile                - Profile form (requires session)
//! POST /profile                - Update full name (requires session)
//! GET  /auth                   - Sign in / sign up page
//! POST /auth/login             - Sign in (rate limited)
//! POST /auth/signup            - Sign up (rate limited)
//! POST /auth/logout            - Sign out
//!
//! # Feedback
//! POST /feedback               - Footer feedback form (rate limited)
//! ```

pub mod about;
pub mod auth;
pub mod feedback;
pub mod health;
pub mod home;
pub mod profile;
pub mod resources;
pub mod search;
pub mod views;
pub mod wishlist;

use axum::{
    Router,
    http::Uri,
    routing::{get, post},
};

use crate::middleware::{auth_rate_limiter, feedback_rate_limiter};
use crate::state::AppState;

/// Request target as the browser sent it, used for `return_to` links.
pub(crate) fn path_and_query(uri: &Uri) -> String {
    uri.path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string)
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/", get(auth::page))
        .route("/logout", post(auth::logout))
        .merge(limited)
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(search::index))
        .route("/search/{id}", get(search::show))
        .route("/resources", get(resources::index))
        .route("/resources/{id}", get(resources::show))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::index).post(wishlist::add))
        .route("/{id}/remove", post(wishlist::remove))
}

/// Create all page routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/about", get(about::about))
        .merge(catalog_routes())
        .nest("/wishlist", wishlist_routes())
        .route("/profile", get(profile::show).post(profile::update))
        .nest("/auth", auth_routes())
        .merge(feedback_routes())
}

/// Create the feedback routes router.
pub fn feedback_routes() -> Router<AppState> {
    Router::new()
        .route("/feedback", post(feedback::submit))
        .layer(feedback_rate_limiter())
}

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}
