//! Participant roster and presence messaging
//!
//! The roster is fed by the meeting connection's join/leave notifications.
//! Presence is decided purely by head count: with exactly two participants
//! in the room the screen announces the doctor, with any other count it
//! stays quiet. Participants carry no role information, so "the second
//! participant" and "the doctor" are treated as the same thing.

use crate::domain::doctor::{DoctorProfile, DoctorRepository};
use crate::domain::meeting::MeetingEvent;
use crate::domain::shared::error::DomainError;
use crate::domain::shared::value_objects::{ParticipantId, RecordId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Shown while exactly two participants are connected
pub const DOCTOR_JOINED_MESSAGE: &str = "Doctor has joined the call.";

/// Inline text when the backend rejects the profile lookup
pub const PROFILE_FETCH_FAILED: &str = "could not fetch description articles in database";

/// Inline text when the profile lookup fails for any other reason
pub const PROFILE_UNEXPECTED_ERROR: &str = "An unexpected error occurred";

/// Roster size that triggers the presence message
const PRESENCE_ROSTER_SIZE: usize = 2;

/// A connected participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: Option<String>,
}

/// Result of applying one roster notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceChange {
    pub roster_changed: bool,
    pub size: usize,
    pub message_changed: bool,
}

/// Doctor profile loading state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProfileState {
    #[default]
    NotLoaded,
    Loaded(DoctorProfile),
    Failed(String),
}

/// Live roster plus the presence message derived from it
#[derive(Debug, Default)]
pub struct PresenceTracker {
    roster: IndexMap<ParticipantId, Participant>,
    message: String,
    profile: ProfileState,
    profile_requested: bool,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a meeting event. Transport events leave the roster untouched.
    pub fn apply(&mut self, event: &MeetingEvent) -> PresenceChange {
        let roster_changed = match event {
            MeetingEvent::ParticipantJoined { id, display_name } => {
                if self.roster.contains_key(id) {
                    false
                } else {
                    self.roster.insert(
                        id.clone(),
                        Participant {
                            id: id.clone(),
                            display_name: display_name.clone(),
                        },
                    );
                    true
                }
            }
            // shift_remove keeps the remaining entries in join order
            MeetingEvent::ParticipantLeft { id } => self.roster.shift_remove(id).is_some(),
            MeetingEvent::ConnectionLost { .. } | MeetingEvent::ConnectionRestored => false,
        };

        let message_changed = roster_changed && self.recompute_message();

        if roster_changed {
            debug!(
                "Roster now has {} participant(s), presence message: {:?}",
                self.roster.len(),
                self.message
            );
        }

        PresenceChange {
            roster_changed,
            size: self.roster.len(),
            message_changed,
        }
    }

    fn recompute_message(&mut self) -> bool {
        let next = if self.roster.len() == PRESENCE_ROSTER_SIZE {
            DOCTOR_JOINED_MESSAGE
        } else {
            ""
        };

        if self.message == next {
            return false;
        }
        self.message = next.to_string();
        true
    }

    /// Fetch the doctor profile. Runs at most once per tracker; later calls
    /// are ignored whatever the first outcome was.
    pub async fn load_profile(&mut self, doctors: &dyn DoctorRepository, record: &RecordId) {
        if self.profile_requested {
            return;
        }
        self.profile_requested = true;

        self.profile = match doctors.find_by_id(record).await {
            Ok(profile) => ProfileState::Loaded(profile),
            Err(DomainError::ProfileFetch(reason)) => {
                warn!("Doctor profile {} unavailable: {}", record, reason);
                ProfileState::Failed(PROFILE_FETCH_FAILED.to_string())
            }
            Err(e) => {
                warn!("Doctor profile {} lookup failed: {}", record, e);
                ProfileState::Failed(PROFILE_UNEXPECTED_ERROR.to_string())
            }
        };
    }

    /// Presence message, empty unless exactly two participants are present
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The participant to display: the first roster entry
    pub fn remote_participant(&self) -> Option<&Participant> {
        self.roster.values().next()
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.roster.values()
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn profile(&self) -> &ProfileState {
        &self.profile
    }
}
