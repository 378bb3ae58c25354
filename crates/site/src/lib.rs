//! Safe Disposal Guide site library.
//!
//! The public website: catalog search, the video library, wishlists, and
//! profiles. The binary in `main.rs` only loads configuration and serves
//! [`app`]; everything else lives here so integration tests can drive the
//! router directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod content;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod notice;
pub mod routes;
pub mod services;
pub mod state;
pub mod supabase;

use axum::{Router, body::Body, http::Request};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use state::AppState;

/// Markdown pages shipped with the crate.
pub const CONTENT_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/content");

/// Stylesheets and images served under `/static`.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the full application router.
///
/// Layers run outermost first: Sentry, tracing, request id, session,
/// security headers.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .merge(routes::health_routes())
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            path = %request.uri().path(),
                            request_id = tracing::field::Empty,
                        )
                    }),
                )
                .layer(axum::middleware::from_fn(middleware::request_id_middleware))
                .layer(session_layer)
                .layer(axum::middleware::from_fn(
                    middleware::security_headers_middleware,
                )),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
