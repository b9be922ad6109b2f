//! Meeting provider ports
//!
//! The real-time transport, signaling and room membership belong to the
//! external meeting SDK. This module only describes what the call screen
//! needs from it: a way to create rooms, a way to open a connection with a
//! fixed configuration, and a push stream of roster and transport events.

use crate::domain::shared::error::Result;
use crate::domain::shared::value_objects::{ParticipantId, RoomId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Display name the patient joins every room with
pub const PATIENT_DISPLAY_NAME: &str = "Patient";

/// Connection configuration handed to the meeting provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingConfig {
    pub meeting_id: RoomId,
    pub mic_enabled: bool,
    pub webcam_enabled: bool,
    pub name: String,
}

impl MeetingConfig {
    /// Audio-only patient configuration. Video is never requested.
    pub fn patient(room_id: RoomId) -> Self {
        Self {
            meeting_id: room_id,
            mic_enabled: true,
            webcam_enabled: false,
            name: PATIENT_DISPLAY_NAME.to_string(),
        }
    }
}

/// Events pushed by an open meeting connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetingEvent {
    ParticipantJoined {
        id: ParticipantId,
        display_name: Option<String>,
    },
    ParticipantLeft {
        id: ParticipantId,
    },
    ConnectionLost {
        reason: String,
    },
    ConnectionRestored,
}

/// Room-creation endpoint of the meeting provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomProvisioner: Send + Sync {
    /// Ask the provider for a brand new room
    async fn create_room(&self) -> Result<RoomId>;
}

/// An open connection to one room
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeetingConnection: Send + Sync {
    /// Join the room
    async fn join(&self) -> Result<()>;

    /// Leave the room and disconnect
    async fn leave(&self) -> Result<()>;

    /// Enable or disable the local audio track, whichever it is not
    async fn toggle_mic(&self) -> Result<()>;

    /// Subscribe to roster and transport events
    fn events(&self) -> broadcast::Receiver<MeetingEvent>;
}

/// Opens connections to rooms
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeetingConnector: Send + Sync {
    async fn open(&self, config: MeetingConfig) -> Result<Arc<dyn MeetingConnection>>;
}
