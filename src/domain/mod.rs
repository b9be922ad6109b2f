//! Domain layer - Core business logic and rules
//!
//! This layer contains:
//! - The call session aggregate and its events
//! - Roster and presence tracking
//! - Value objects shared by every module
//! - Ports for the meeting provider, the backend and navigation

pub mod action_guard;
pub mod appointment;
pub mod doctor;
pub mod meeting;
pub mod navigation;
pub mod presence;
pub mod reconnect;
pub mod session;
pub mod shared;

// Re-export commonly used types
pub use shared::{DomainError, Result};
