//! Profile gateway: read and rename the signed-in user's `profiles` row.

use thiserror::Error;

use crate::models::{AuthSession, Profile};
use crate::supabase::{BackendError, SupabaseClient};

/// Longest display name accepted.
pub const MAX_NAME_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("full name must be at most {MAX_NAME_CHARS} characters")]
    NameTooLong,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Clone)]
pub struct ProfileGateway {
    client: SupabaseClient,
}

impl ProfileGateway {
    #[must_use]
    pub const fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// # Errors
    ///
    /// Returns error if the row cannot be read.
    pub async fn fetch(&self, session: &AuthSession) -> Result<Profile, ProfileError> {
        self.client.fetch_profile(session).await.map_err(|e| {
            tracing::warn!(user_id = %session.user_id, error = %e, "Profile load failed");
            e.into()
        })
    }

    /// Store a new display name and return it as stored. Surrounding
    /// whitespace is dropped; an empty name clears it.
    ///
    /// # Errors
    ///
    /// `NameTooLong`, or `Backend` if the update fails.
    pub async fn update_full_name(
        &self,
        session: &AuthSession,
        full_name: &str,
    ) -> Result<String, ProfileError> {
        let name = normalize_name(full_name)?;
        self.client
            .update_profile_name(session, name)
            .await
            .map_err(|e| {
                tracing::warn!(user_id = %session.user_id, error = %e, "Profile update failed");
                ProfileError::from(e)
            })?;
        tracing::info!(user_id = %session.user_id, "Profile updated");
        Ok(name.to_string())
    }
}

fn normalize_name(raw: &str) -> Result<&str, ProfileError> {
    let name = raw.trim();
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ProfileError::NameTooLong);
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Priya Nair ").ok(), Some("Priya Nair"));
        assert_eq!(normalize_name("   ").ok(), Some(""));
        assert!(matches!(
            normalize_name(&"x".repeat(MAX_NAME_CHARS + 1)),
            Err(ProfileError::NameTooLong)
        ));
    }
}
