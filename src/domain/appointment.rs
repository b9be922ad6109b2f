//! Appointment records in the backend
//!
//! The call screen writes two facts onto an appointment: the meeting room id
//! it was assigned and, on hang-up, its terminal status.

use crate::domain::shared::error::Result;
use crate::domain::shared::value_objects::{AppointmentId, RoomId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Appointment status column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Pending,
    Upcoming,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Upcoming => "Upcoming",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository interface for appointment rows
///
/// All access is an exact match on the appointment id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Store the meeting room id on the appointment
    async fn set_meeting_id(&self, id: &AppointmentId, room_id: &RoomId) -> Result<()>;

    /// Overwrite the appointment status
    async fn set_status(&self, id: &AppointmentId, status: AppointmentStatus) -> Result<()>;

    /// Read back the stored meeting room id, if any
    async fn meeting_id(&self, id: &AppointmentId) -> Result<Option<RoomId>>;
}
