//! Flash notifications carried across redirects.
//!
//! Form posts answer with a redirect whose URL carries `notice=<code>`. The
//! page that receives it looks the code up and renders the matching toast.
//! Unknown codes are ignored.

use axum::response::Redirect;
use serde::{Deserialize, Deserializer};

/// Query parameter carrying the notice code.
pub const PARAM: &str = "notice";

/// Visual weight of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Destructive,
}

/// Rendered notice text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub title: &'static str,
    pub description: &'static str,
    pub tone: Tone,
}

impl Notice {
    #[must_use]
    pub fn is_destructive(&self) -> bool {
        self.tone == Tone::Destructive
    }
}

/// Every notification the site can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    LoginRequired,
    AlreadySaved,
    ResourceAlreadySaved,
    WishlistAdded,
    WishlistAddFailed,
    WishlistLoadFailed,
    WishlistRemoved,
    WishlistRemoveFailed,
    ProfileLoadFailed,
    ProfileUpdated,
    ProfileUpdateFailed,
    ProfileNameTooLong,
    FeedbackMissingFields,
    FeedbackInvalidEmail,
    FeedbackSent,
    FeedbackRejected,
    FeedbackNetwork,
    FeedbackUnavailable,
    SignedIn,
    SignedUp,
    ConfirmEmail,
    InvalidCredentials,
    InvalidSignup,
    AccountExists,
    AuthUnavailable,
    SignedOut,
}

impl NoticeKind {
    pub const ALL: [Self; 26] = [
        Self::LoginRequired,
        Self::AlreadySaved,
        Self::ResourceAlreadySaved,
        Self::WishlistAdded,
        Self::WishlistAddFailed,
        Self::WishlistLoadFailed,
        Self::WishlistRemoved,
        Self::WishlistRemoveFailed,
        Self::ProfileLoadFailed,
        Self::ProfileUpdated,
        Self::ProfileUpdateFailed,
        Self::ProfileNameTooLong,
        Self::FeedbackMissingFields,
        Self::FeedbackInvalidEmail,
        Self::FeedbackSent,
        Self::FeedbackRejected,
        Self::FeedbackNetwork,
        Self::FeedbackUnavailable,
        Self::SignedIn,
        Self::SignedUp,
        Self::ConfirmEmail,
        Self::InvalidCredentials,
        Self::InvalidSignup,
        Self::AccountExists,
        Self::AuthUnavailable,
        Self::SignedOut,
    ];

    /// Code used in the query string.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::LoginRequired => "login_required",
            Self::AlreadySaved => "already_saved",
            Self::ResourceAlreadySaved => "resource_already_saved",
            Self::WishlistAdded => "wishlist_added",
            Self::WishlistAddFailed => "wishlist_add_failed",
            Self::WishlistLoadFailed => "wishlist_load_failed",
            Self::WishlistRemoved => "wishlist_removed",
            Self::WishlistRemoveFailed => "wishlist_remove_failed",
            Self::ProfileLoadFailed => "profile_load_failed",
            Self::ProfileUpdated => "profile_updated",
            Self::ProfileUpdateFailed => "profile_update_failed",
            Self::ProfileNameTooLong => "profile_name_too_long",
            Self::FeedbackMissingFields => "feedback_missing_fields",
            Self::FeedbackInvalidEmail => "feedback_invalid_email",
            Self::FeedbackSent => "feedback_sent",
            Self::FeedbackRejected => "feedback_rejected",
            Self::FeedbackNetwork => "feedback_network",
            Self::FeedbackUnavailable => "feedback_unavailable",
            Self::SignedIn => "signed_in",
            Self::SignedUp => "signed_up",
            Self::ConfirmEmail => "confirm_email",
            Self::InvalidCredentials => "invalid_credentials",
            Self::InvalidSignup => "invalid_signup",
            Self::AccountExists => "account_exists",
            Self::AuthUnavailable => "auth_unavailable",
            Self::SignedOut => "signed_out",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Title, description, and tone shown to the user.
    #[must_use]
    pub const fn notice(self) -> Notice {
        use Tone::{Destructive, Info};

        let (title, description, tone) = match self {
            Self::LoginRequired => ("Login Required", "Please login to add items to wishlist", Destructive),
            Self::AlreadySaved => ("Already in Wishlist", "This item is already in your wishlist", Info),
            Self::ResourceAlreadySaved => (
                "Already in Wishlist",
                "This resource is already in your wishlist",
                Info,
            ),
            Self::WishlistAdded => ("Success", "Added to wishlist", Info),
            Self::WishlistAddFailed => ("Error", "Failed to add to wishlist", Destructive),
            Self::WishlistLoadFailed => ("Error", "Failed to load wishlist", Destructive),
            Self::WishlistRemoved => ("Success", "Removed from wishlist", Info),
            Self::WishlistRemoveFailed => ("Error", "Failed to remove item", Destructive),
            Self::ProfileLoadFailed => ("Error", "Failed to load profile", Destructive),
            Self::ProfileUpdated => ("Success", "Profile updated successfully", Info),
            Self::ProfileUpdateFailed => ("Error", "Failed to update profile", Destructive),
            Self::ProfileNameTooLong => (
                "Error",
                "Full name must be at most 100 characters",
                Destructive,
            ),
            Self::FeedbackMissingFields => ("Missing Information", "Please fill in all fields", Destructive),
            Self::FeedbackInvalidEmail => ("Invalid Email", "Please enter a valid email address", Destructive),
            Self::FeedbackSent => (
                "Feedback Submitted",
                "Thank you for your feedback! We'll review it soon.",
                Info,
            ),
            Self::FeedbackRejected => ("Submission Failed", "Please try again later.", Destructive),
            Self::FeedbackNetwork => ("Network Error", "Could not submit feedback.", Destructive),
            Self::FeedbackUnavailable => ("Submission Failed", "Service temporarily unavailable", Destructive),
            Self::SignedIn => ("Welcome back", "You are now signed in", Info),
            Self::SignedUp => ("Account created", "You are now signed in", Info),
            Self::ConfirmEmail => (
                "Check your email",
                "Confirm your email address to finish signing up",
                Info,
            ),
            Self::InvalidCredentials => ("Sign in failed", "Invalid email or password", Destructive),
            Self::InvalidSignup => (
                "Sign up failed",
                "Enter a valid email and a password of at least 6 characters",
                Destructive,
            ),
            Self::AccountExists => (
                "Sign up failed",
                "An account with this email already exists",
                Destructive,
            ),
            Self::AuthUnavailable => (
                "Error",
                "Authentication service unavailable, please try again",
                Destructive,
            ),
            Self::SignedOut => ("Signed out", "You have been signed out", Info),
        };

        Notice {
            title,
            description,
            tone,
        }
    }
}

/// `?notice=` query parameter, tolerant of unknown codes.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    #[serde(default, deserialize_with = "known_notice")]
    pub notice: Option<NoticeKind>,
}

impl NoticeQuery {
    #[must_use]
    pub fn resolve(&self) -> Option<Notice> {
        self.notice.map(NoticeKind::notice)
    }
}

fn known_notice<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NoticeKind>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(NoticeKind::from_code))
}

/// Replace anything that is not a local absolute path with `/`.
///
/// Protocol-relative (`//host`) and backslash forms are rejected so a
/// redirect can never leave the site.
#[must_use]
pub fn local_path(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}

/// Split `path` into its base and a serializer holding every query pair
/// except `notice`.
fn strip(path: &str) -> (&str, url::form_urlencoded::Serializer<'static, String>) {
    let (base, query) = path.split_once('?').unwrap_or((path, ""));
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if key != PARAM {
            serializer.append_pair(&key, &value);
        }
    }
    (base, serializer)
}

/// `path` with its `notice` parameter set to `kind`.
///
/// Any notice already present is dropped so the parameter appears once.
#[must_use]
pub fn with_notice(path: &str, kind: NoticeKind) -> String {
    let (base, mut serializer) = strip(path);
    serializer.append_pair(PARAM, kind.code());
    format!("{base}?{}", serializer.finish())
}

/// `path` with any `notice` parameter removed.
#[must_use]
pub fn without_notice(path: &str) -> String {
    let (base, mut serializer) = strip(path);
    let query = serializer.finish();
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{query}")
    }
}

/// Redirect to `path` carrying `kind`.
#[must_use]
pub fn redirect(path: &str, kind: NoticeKind) -> Redirect {
    Redirect::to(&with_notice(path, kind))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_codes_are_unique_and_roundtrip() {
        let codes: HashSet<&str> = NoticeKind::ALL.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), NoticeKind::ALL.len());
        for kind in NoticeKind::ALL {
            assert_eq!(NoticeKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(NoticeKind::from_code("made_up"), None);
    }

    #[test]
    fn test_duplicate_differs_from_failure() {
        let duplicate = NoticeKind::AlreadySaved.notice();
        let failure = NoticeKind::WishlistAddFailed.notice();
        assert_ne!(duplicate.description, failure.description);
        assert!(!duplicate.is_destructive());
        assert!(failure.is_destructive());
    }

    #[test]
    fn test_local_path_rejects_offsite() {
        assert_eq!(local_path(Some("/search?q=bleach")), "/search?q=bleach");
        assert_eq!(local_path(Some("https://evil.example/")), "/");
        assert_eq!(local_path(Some("//evil.example/")), "/");
        assert_eq!(local_path(Some("/\\evil.example")), "/");
        assert_eq!(local_path(Some("")), "/");
        assert_eq!(local_path(None), "/");
    }

    #[test]
    fn test_with_notice_replaces_existing() {
        assert_eq!(
            with_notice("/search", NoticeKind::WishlistAdded),
            "/search?notice=wishlist_added"
        );
        assert_eq!(
            with_notice("/search?q=sharps+bin&notice=login_required", NoticeKind::WishlistAdded),
            "/search?q=sharps+bin&notice=wishlist_added"
        );
    }

    #[test]
    fn test_without_notice_keeps_other_params() {
        assert_eq!(without_notice("/wishlist?notice=wishlist_removed"), "/wishlist");
        assert_eq!(
            without_notice("/search?category=Sharps&notice=wishlist_added"),
            "/search?category=Sharps"
        );
        assert_eq!(without_notice("/about"), "/about");
    }

    #[test]
    fn test_query_ignores_unknown_code() {
        let known: NoticeQuery = serde_urlencoded_like("notice=signed_out");
        assert_eq!(known.notice, Some(NoticeKind::SignedOut));
        let unknown: NoticeQuery = serde_urlencoded_like("notice=bogus");
        assert_eq!(unknown.notice, None);
    }

    fn serde_urlencoded_like(query: &str) -> NoticeQuery {
        let map: serde_json::Map<String, serde_json::Value> = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), serde_json::Value::String(v.into_owned())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map)).unwrap_or_default()
    }
}
