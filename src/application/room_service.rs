//! Room identity resolution and room-id persistence
//!
//! Decides whether to create a new room or use a pasted code, then records
//! the room on the appointment. The backend write is best-effort: a failure
//! leaves the sync `Pending` and [`RoomService::sync_room_id`] retries it
//! later. Re-running the sync once it has succeeded is a no-op.

use crate::domain::appointment::AppointmentRepository;
use crate::domain::meeting::RoomProvisioner;
use crate::domain::shared::error::{DomainError, Result};
use crate::domain::shared::value_objects::{AppointmentId, RoomId};
use crate::interface::metrics;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of resolving a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoom {
    pub room_id: RoomId,
    /// Generated by the provider rather than pasted by the user
    pub created: bool,
}

/// Whether the appointment durably knows its room id
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RoomSync {
    #[default]
    Unassigned,
    Pending(RoomId),
    Synced(RoomId),
}

pub struct RoomService {
    provisioner: Arc<dyn RoomProvisioner>,
    appointments: Arc<dyn AppointmentRepository>,
    sync: RoomSync,
}

impl RoomService {
    pub fn new(
        provisioner: Arc<dyn RoomProvisioner>,
        appointments: Arc<dyn AppointmentRepository>,
    ) -> Self {
        Self {
            provisioner,
            appointments,
            sync: RoomSync::Unassigned,
        }
    }

    /// Use `explicit_code` verbatim, or create a fresh room when it is absent.
    ///
    /// Only the empty string is rejected. Anything else, whitespace included,
    /// goes to the meeting provider untouched.
    pub async fn resolve(&self, explicit_code: Option<&str>) -> Result<ResolvedRoom> {
        if let Some(code) = explicit_code {
            if code.is_empty() {
                return Err(DomainError::EmptyRoomCode);
            }
            debug!("Joining pasted room {}", code);
            metrics::record_room_joined();
            return Ok(ResolvedRoom {
                room_id: RoomId::new(code),
                created: false,
            });
        }

        let room_id = match self.provisioner.create_room().await {
            Ok(room_id) if !room_id.as_str().is_empty() => room_id,
            Ok(_) => {
                error!("Meeting provider returned an empty room id");
                metrics::record_room_creation_failed();
                return Err(DomainError::RoomCreation(
                    "provider returned no room id".to_string(),
                ));
            }
            Err(e) => {
                error!("Failed to create room: {}", e);
                metrics::record_room_creation_failed();
                return Err(match e {
                    DomainError::RoomCreation(_) => e,
                    other => DomainError::RoomCreation(other.to_string()),
                });
            }
        };

        info!("Created room {}", room_id);
        metrics::record_room_created();
        Ok(ResolvedRoom {
            room_id,
            created: true,
        })
    }

    /// Store `room_id` on the appointment. Never fails the caller; returns
    /// whether the write went through.
    pub async fn persist(&mut self, appointment: &AppointmentId, room_id: &RoomId) -> bool {
        self.sync = RoomSync::Pending(room_id.clone());
        self.write(appointment, room_id).await
    }

    /// Retry a pending room-id write. Idempotent.
    pub async fn sync_room_id(&mut self, appointment: &AppointmentId) -> &RoomSync {
        if let RoomSync::Pending(room_id) = self.sync.clone() {
            debug!("Reconciling room id {} for appointment {}", room_id, appointment);
            self.write(appointment, &room_id).await;
        }
        &self.sync
    }

    async fn write(&mut self, appointment: &AppointmentId, room_id: &RoomId) -> bool {
        match self.appointments.set_meeting_id(appointment, room_id).await {
            Ok(()) => {
                debug!("Appointment {} now references room {}", appointment, room_id);
                self.sync = RoomSync::Synced(room_id.clone());
                true
            }
            Err(e) => {
                warn!(
                    "Error updating meeting ID on appointment {}: {}",
                    appointment, e
                );
                metrics::record_backend_failure("set_meeting_id");
                false
            }
        }
    }

    pub fn sync_state(&self) -> &RoomSync {
        &self.sync
    }

    /// Read the room id currently stored on the appointment
    pub async fn stored_room_id(&self, appointment: &AppointmentId) -> Result<Option<RoomId>> {
        self.appointments.meeting_id(appointment).await
    }
}
