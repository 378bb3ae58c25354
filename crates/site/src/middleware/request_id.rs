//! Request ID middleware for request tracing and correlation.
//!
//! Every request gets an id, taken from the upstream proxy when present and
//! otherwise generated. It is recorded in the tracing span, tagged on the
//! Sentry scope, and echoed in the response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream id accepted as-is.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// Upstream id if it is short, printable ASCII; otherwise a fresh UUID v4.
fn resolve_id(upstream: Option<&HeaderValue>) -> String {
    upstream
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_UPSTREAM_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Attach a request id to the span, the Sentry scope, and the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = resolve_id(request.headers().get(REQUEST_ID_HEADER));

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_id_is_kept() {
        let header = HeaderValue::from_static("cf-ray-8a1b2c");
        assert_eq!(resolve_id(Some(&header)), "cf-ray-8a1b2c");
    }

    #[test]
    fn test_missing_or_oversized_id_is_generated() {
        let generated = resolve_id(None);
        assert!(Uuid::parse_str(&generated).is_ok());

        let long = "x".repeat(MAX_UPSTREAM_ID_LEN + 1);
        let header = HeaderValue::from_str(&long).unwrap_or_else(|_| HeaderValue::from_static("x"));
        assert_ne!(resolve_id(Some(&header)), long);
    }
}
