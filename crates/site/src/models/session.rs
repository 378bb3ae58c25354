//! Session-related types.
//!
//! Types stored in the server-side session for authentication state.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use safe_disposal_core::{Email, UserId};

/// Tokens younger than this margin before expiry are refreshed early.
const EXPIRY_MARGIN_SECONDS: i64 = 30;

/// Signed-in user as issued by the hosted auth service.
///
/// Stored in the session store (never in the cookie). Tokens stay wrapped in
/// `SecretString` so they cannot leak through `Debug` or tracing fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Auth user ID (also the `profiles.id` and `wishlist.user_id`).
    pub user_id: UserId,
    /// Email the user signed in with.
    pub email: Email,
    /// Display name from signup metadata, if any.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Bearer token for row requests.
    #[serde(with = "secret_serde")]
    pub access_token: SecretString,
    /// Token used to obtain a new access token.
    #[serde(with = "secret_serde")]
    pub refresh_token: SecretString,
    /// When the access token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Whether the access token is expired (or about to be) at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + TimeDelta::seconds(EXPIRY_MARGIN_SECONDS) >= self.expires_at
    }

    /// Whether the access token is expired right now.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Raw bearer token for outgoing requests.
    #[must_use]
    pub fn bearer(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.email.as_str())
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for the signed-in user's [`super::AuthSession`].
    pub const AUTH_SESSION: &str = "auth_session";
}

/// (De)serialize `SecretString` as a plain string for the session store.
mod secret_serde {
    use secrecy::{ExposeSecret, SecretString};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(secret.expose_secret())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
        String::deserialize(deserializer).map(SecretString::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session(expires_at: DateTime<Utc>) -> AuthSession {
        AuthSession {
            user_id: UserId::new("7d1c"),
            email: Email::parse("nurse@clinic.example").unwrap(),
            full_name: None,
            access_token: SecretString::from("access-abc"),
            refresh_token: SecretString::from("refresh-xyz"),
            expires_at,
        }
    }

    #[test]
    fn test_expiry_uses_margin() {
        let now = Utc::now();
        assert!(!session(now + TimeDelta::hours(1)).is_expired_at(now));
        assert!(session(now + TimeDelta::seconds(10)).is_expired_at(now));
        assert!(session(now - TimeDelta::seconds(1)).is_expired_at(now));
    }

    #[test]
    fn test_debug_hides_tokens() {
        let debug = format!("{:?}", session(Utc::now()));
        assert!(!debug.contains("access-abc"));
        assert!(!debug.contains("refresh-xyz"));
    }

    #[test]
    fn test_session_store_roundtrip_keeps_tokens() {
        let original = session(Utc::now());
        let json = serde_json::to_string(&original).unwrap();
        let restored: AuthSession = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.bearer(), "access-abc");
        assert_eq!(restored.refresh_token.expose_secret(), "refresh-xyz");
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut s = session(Utc::now());
        assert_eq!(s.display_name(), "nurse@clinic.example");
        s.full_name = Some("Dana Reyes".to_string());
        assert_eq!(s.display_name(), "Dana Reyes");
    }
}
