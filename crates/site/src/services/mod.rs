//! Gateways between route handlers and external services.

pub mod feedback;
pub mod profile;
pub mod session;
pub mod wishlist;

pub use feedback::{FeedbackClient, FeedbackError, FeedbackForm, InvalidFeedback};
pub use profile::{ProfileError, ProfileGateway};
pub use session::{AuthBackend, SessionError, SessionGateway, ViewAccess, rename};
pub use wishlist::{AddOutcome, StoreError, WishlistError, WishlistGateway, WishlistStore};
