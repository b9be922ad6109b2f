//! Session domain events

use crate::domain::session::value_object::MicState;
use crate::domain::shared::events::{DomainEvent, EventMetadata};
use crate::domain::shared::value_objects::{RoomId, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base struct for all session events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEventBase {
    /// Event id, timestamp and type name
    pub metadata: EventMetadata,
    /// Session that recorded the event
    pub session_id: SessionId,
}

impl SessionEventBase {
    pub(crate) fn new(event_type: &str, session_id: SessionId) -> Self {
        Self {
            metadata: EventMetadata::new(event_type),
            session_id,
        }
    }
}

/// Room assigned and connection opened
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionActivated {
    pub base: SessionEventBase,
    /// Room the session is now bound to
    pub room_id: RoomId,
    /// Whether the room was generated by the provider rather than pasted
    pub created: bool,
}

/// Microphone muted or unmuted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicToggled {
    pub base: SessionEventBase,
    /// State after the toggle
    pub mic: MicState,
}

/// Transport dropped, or a rejoin attempt failed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReconnecting {
    pub base: SessionEventBase,
    /// Rejoin attempt about to be scheduled, starting at 1
    pub attempt: u32,
}

/// Transport came back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRestored {
    pub base: SessionEventBase,
}

/// Patient hung up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEnded {
    pub base: SessionEventBase,
    /// When the session ended
    pub ended_at: DateTime<Utc>,
    /// Time since activation; `None` if no room was ever assigned
    pub duration_seconds: Option<i64>,
}

/// Union of all session events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    Activated(SessionActivated),
    MicToggled(MicToggled),
    Reconnecting(SessionReconnecting),
    Restored(SessionRestored),
    Ended(SessionEnded),
}

impl SessionEvent {
    fn base(&self) -> &SessionEventBase {
        match self {
            SessionEvent::Activated(e) => &e.base,
            SessionEvent::MicToggled(e) => &e.base,
            SessionEvent::Reconnecting(e) => &e.base,
            SessionEvent::Restored(e) => &e.base,
            SessionEvent::Ended(e) => &e.base,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.base().session_id
    }
}

impl DomainEvent for SessionEvent {
    fn metadata(&self) -> &EventMetadata {
        &self.base().metadata
    }
}
