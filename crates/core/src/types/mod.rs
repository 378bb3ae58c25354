//! Core types for the Safe Disposal Guide.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod hazard;
pub mod id;

pub use email::{Email, EmailError};
pub use hazard::HazardLevel;
pub use id::*;
