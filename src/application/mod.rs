//! Application layer - Use cases and application services
//!
//! This layer orchestrates domain objects to fulfill use cases.
//! It's responsible for:
//! - Resolving and persisting the room identity
//! - Driving the session aggregate from user gestures and meeting events
//! - Running the hang-up side effects

pub mod call_screen;
pub mod hang_up;
pub mod room_service;

pub use call_screen::{JoinOutcome, ScreenPorts, VoiceCallScreen};
pub use hang_up::{HangUpCoordinator, HangUpOutcome, HangUpReport};
pub use room_service::{ResolvedRoom, RoomService, RoomSync};
