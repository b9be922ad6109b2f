//! Shared value objects used across multiple bounded contexts

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Local session identifier, one per screen instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declares an opaque string identifier. The wrapped value is never parsed or
/// validated; it is handed to the external services exactly as received.
macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

opaque_id!(
    /// Meeting room identifier, generated by the provider or pasted by the user
    RoomId
);

opaque_id!(
    /// Backend appointment row identifier
    AppointmentId
);

opaque_id!(
    /// Patient/record identifier carried in from navigation. Keys the doctor
    /// profile lookup and is forwarded to the session-ended screen.
    RecordId
);

opaque_id!(
    /// Participant identifier as reported by the meeting provider
    ParticipantId
);

/// Identifiers that correlate one call screen with backend records.
///
/// Passed explicitly to every component instead of being read from ambient
/// navigation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub appointment: AppointmentId,
    pub record: RecordId,
}

impl SessionContext {
    pub fn new(appointment: impl Into<AppointmentId>, record: impl Into<RecordId>) -> Self {
        Self {
            appointment: appointment.into(),
            record: record.into(),
        }
    }
}
