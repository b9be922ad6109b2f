//! Session bounded context - lifecycle of one patient call screen

pub mod aggregate;
pub mod event;
pub mod value_object;

pub use aggregate::CallSession;
pub use event::SessionEvent;
pub use value_object::{MicState, SessionState};
