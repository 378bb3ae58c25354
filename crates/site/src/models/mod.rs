//! Domain models for the site.

pub mod profile;
pub mod session;

pub use profile::Profile;
pub use session::{AuthSession, keys as session_keys};
