//! Integration tests for the Safe Disposal Guide.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p safe-disposal-integration-tests
//! ```
//!
//! Tests drive the router in-process. The hosted auth service is pointed at
//! a closed local port, so any test that reaches it sees a connection error;
//! tests that must not touch the network rely on that to prove it.
//!
//! # Test Categories
//!
//! - `catalog_filter` - Filter engine properties against the bundled catalog
//! - `wishlist_gateway` - Wishlist scenarios against an in-memory store
//! - `site_routes` - HTTP behaviour of the assembled router

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use chrono::{TimeDelta, Utc};
use secrecy::SecretString;
use tower::ServiceExt;
use url::Url;

use safe_disposal_core::{Catalog, Email, UserId};
use safe_disposal_site::config::{SiteConfig, SupabaseConfig};
use safe_disposal_site::models::AuthSession;
use safe_disposal_site::state::AppState;
use safe_disposal_site::{CONTENT_DIR, app};

/// Auth service address nothing listens on.
pub const UNREACHABLE_BACKEND: &str = "http://127.0.0.1:9";

/// Largest response body the helpers will read.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Configuration with no feedback relay and no Sentry.
///
/// # Panics
///
/// Never; the URL literal is valid.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_config() -> SiteConfig {
    SiteConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        catalog_dir: None,
        supabase: SupabaseConfig {
            url: Url::parse(UNREACHABLE_BACKEND).expect("valid test URL"),
            anon_key: SecretString::from("test-anon-key"),
        },
        feedback: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The full router over the bundled catalog.
///
/// # Panics
///
/// Panics if the bundled catalog or content fails to load.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_app() -> Router {
    let catalog = Catalog::bundled().expect("bundled catalog loads");
    let state = AppState::new(test_config(), catalog, Path::new(CONTENT_DIR))
        .expect("state builds");
    app(state)
}

/// A signed-in session that has not expired.
///
/// # Panics
///
/// Never; the email literal is valid.
#[must_use]
#[allow(clippy::expect_used)]
pub fn signed_in(user: &str) -> AuthSession {
    AuthSession {
        user_id: UserId::new(user),
        email: Email::parse("nurse@clinic.example").expect("valid test email"),
        full_name: Some("Night Nurse".to_string()),
        access_token: SecretString::from("access"),
        refresh_token: SecretString::from("refresh"),
        expires_at: Utc::now() + TimeDelta::hours(1),
    }
}

/// GET `uri`.
///
/// # Panics
///
/// Panics if the request cannot be built or the router fails.
#[allow(clippy::expect_used)]
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::get(uri)
        .body(Body::empty())
        .expect("request builds");
    app.oneshot(request).await.expect("router is infallible")
}

/// POST a urlencoded form to `uri` from a fixed client address.
///
/// # Panics
///
/// Panics if the request cannot be built or the router fails.
#[allow(clippy::expect_used)]
pub async fn post_form(app: Router, uri: &str, form: &str) -> Response<Body> {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::from(form.to_owned()))
        .expect("request builds");
    app.oneshot(request).await.expect("router is infallible")
}

/// `Location` header of a redirect, if any.
#[must_use]
pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Body as UTF-8 text.
///
/// # Panics
///
/// Panics if the body cannot be read or is not UTF-8.
#[allow(clippy::expect_used)]
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), MAX_BODY_BYTES)
        .await
        .expect("body reads");
    String::from_utf8(bytes.to_vec()).expect("body is UTF-8")
}
