//! Client for the hosted auth and database service.
//!
//! # Architecture
//!
//! - Auth endpoints live under `<project>/auth/v1` (password grant, refresh
//!   grant, signup, logout, health)
//! - Table endpoints live under `<project>/rest/v1` (`wishlist`, `profiles`)
//! - Every request carries the anon key in `apikey`; row requests add the
//!   user's bearer token so row-level security applies
//! - The service is the source of truth; nothing is cached locally
//!
//! # Example
//!
//! ```rust,ignore
//! use safe_disposal_site::supabase::SupabaseClient;
//!
//! let client = SupabaseClient::new(&config.supabase)?;
//! let session = client.sign_in(&email, "hunter22").await?;
//! let rows = client.select_wishlist(&session).await?;
//! ```

mod auth;
mod rest;

pub use auth::SignUpOutcome;

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::SupabaseConfig;

/// Per-request timeout for calls to the hosted service.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Postgres `unique_violation` SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Auth error codes that mean "these credentials or tokens are not accepted".
const REJECTED_CREDENTIAL_CODES: [&str; 5] = [
    "invalid_credentials",
    "invalid_grant",
    "refresh_token_not_found",
    "refresh_token_already_used",
    "bad_jwt",
];

/// Errors from the hosted auth/database service.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// A uniqueness constraint rejected the write.
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Credentials or tokens were rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Error body shapes used by the auth and table endpoints.
///
/// Table errors carry `code` (a SQLSTATE string) and `message`; auth errors
/// carry some of `error`, `error_code`, `error_description`, `msg`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn code_str(&self) -> Option<&str> {
        self.code.as_ref().and_then(serde_json::Value::as_str)
    }

    fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.msg.as_deref())
            .or(self.error_description.as_deref())
            .or(self.error.as_deref())
    }

    fn is_rejected_credential(&self) -> bool {
        [self.error_code.as_deref(), self.error.as_deref()]
            .into_iter()
            .flatten()
            .any(|code| REJECTED_CREDENTIAL_CODES.contains(&code))
    }

    fn is_already_registered(&self) -> bool {
        matches!(
            self.error_code.as_deref(),
            Some("user_already_exists" | "email_exists")
        )
    }
}

/// Map an error status and body to a [`BackendError`].
fn classify(status: StatusCode, body: &str) -> BackendError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed.message().unwrap_or(body).to_string();

    // Only a unique violation is a duplicate; PostgREST also answers 409 for
    // foreign-key and exclusion conflicts.
    if parsed.code_str() == Some(UNIQUE_VIOLATION) || parsed.is_already_registered() {
        return BackendError::Duplicate(message);
    }
    if status == StatusCode::UNAUTHORIZED || parsed.is_rejected_credential() {
        return BackendError::Unauthorized(message);
    }
    BackendError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Turn a non-success response into an error, passing successes through.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify(status, &body))
}

/// Check the status, then decode the JSON body.
///
/// A body that doesn't match `T` is `Parse`, not `Http`.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    check(response)
        .await?
        .json()
        .await
        .map_err(|e| BackendError::Parse(e.to_string()))
}

/// Client for the hosted auth/database service.
///
/// Cheap to clone; the connection pool is shared.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    auth_base: Url,
    rest_base: Url,
}

impl SupabaseClient {
    /// Create a new client for the configured project.
    ///
    /// # Errors
    ///
    /// Returns error if the anon key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.anon_key.expose_secret())
                .map_err(|e| BackendError::Parse(format!("Invalid anon key format: {e}")))?,
        );
        headers.insert(
            "X-Client-Info",
            HeaderValue::from_static(concat!("safe-disposal-site/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(SupabaseClientInner {
                client,
                auth_base: endpoint_base(&config.url, "auth/v1")?,
                rest_base: endpoint_base(&config.url, "rest/v1")?,
            }),
        })
    }

    fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    fn auth_url(&self, path: &str) -> Result<Url, BackendError> {
        join(&self.inner.auth_base, path)
    }

    fn rest_url(&self, table: &str) -> Result<Url, BackendError> {
        join(&self.inner.rest_base, table)
    }
}

/// `<project>/<prefix>/` with a trailing slash so later joins append.
fn endpoint_base(project: &Url, prefix: &str) -> Result<Url, BackendError> {
    let root = project.as_str().trim_end_matches('/');
    Url::parse(&format!("{root}/{prefix}/")).map_err(|e| BackendError::Parse(e.to_string()))
}

fn join(base: &Url, path: &str) -> Result<Url, BackendError> {
    base.join(path).map_err(|e| BackendError::Parse(e.to_string()))
}
