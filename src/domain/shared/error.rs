//! Domain errors

use thiserror::Error;

/// Domain result type
pub type Result<T> = std::result::Result<T, DomainError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// The meeting provider could not create a room
    #[error("Room creation failed: {0}")]
    RoomCreation(String),

    #[error("Room code is empty")]
    EmptyRoomCode,

    /// Reading the doctor profile from the backend failed
    #[error("Profile fetch failed: {0}")]
    ProfileFetch(String),

    /// Writing the appointment status failed
    #[error("Status update failed: {0}")]
    StatusUpdate(String),

    /// Writing the meeting room id onto the appointment failed
    #[error("Room persist failed: {0}")]
    RoomPersist(String),

    #[error("Meeting connection error: {0}")]
    Connection(String),

    /// A request to an external service never produced a usable response
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DomainError {
    /// Short label used for logs and metric tags
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::InvalidStateTransition(_) => "invalid_state_transition",
            DomainError::RoomCreation(_) => "room_creation",
            DomainError::EmptyRoomCode => "empty_room_code",
            DomainError::ProfileFetch(_) => "profile_fetch",
            DomainError::StatusUpdate(_) => "status_update",
            DomainError::RoomPersist(_) => "room_persist",
            DomainError::Connection(_) => "connection",
            DomainError::Transport(_) => "transport",
            DomainError::Navigation(_) => "navigation",
            DomainError::Configuration(_) => "configuration",
        }
    }
}
