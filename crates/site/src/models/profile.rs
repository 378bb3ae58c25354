//! Profile row owned by a signed-in user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use safe_disposal_core::UserId;

/// A row of the hosted `profiles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Name shown in the profile header ("User" when unset).
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("User")
    }

    /// Membership date as shown on the profile page.
    #[must_use]
    pub fn member_since(&self) -> String {
        self.created_at.format("%B %-d, %Y").to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_postgrest_row() {
        let profile: Profile = serde_json::from_str(
            r#"{"id": "u1", "email": "a@b.org", "full_name": null,
                "created_at": "2025-03-04T10:00:00.123456+00:00", "updated_at": "2025-03-04T10:00:00+00:00"}"#,
        )
        .unwrap();
        assert_eq!(profile.display_name(), "User");
        assert_eq!(profile.member_since(), "March 4, 2025");
    }
}
