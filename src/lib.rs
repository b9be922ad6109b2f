//! telecall - patient-side voice call session for a telehealth app
//!
//! Coordinates room creation or joining, a live participant roster fed by
//! an external meeting provider, presence messaging, and the side effects of
//! hanging up (appointment completion and navigation).

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interface;

// Re-export commonly used types
pub use domain::shared::error::{DomainError, Result};
