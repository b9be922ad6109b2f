//! Terminal side effects of hanging up
//!
//! Leave the meeting, mark the appointment completed, navigate to the
//! session-ended screen. Every step runs regardless of how the previous one
//! went and nothing is rolled back.

use crate::domain::appointment::{AppointmentRepository, AppointmentStatus};
use crate::domain::meeting::MeetingConnection;
use crate::domain::navigation::{Navigator, Route, RouteParams};
use crate::domain::shared::value_objects::SessionContext;
use crate::interface::metrics;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Which hang-up steps went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HangUpReport {
    pub left_meeting: bool,
    pub status_updated: bool,
    pub navigated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HangUpOutcome {
    Completed(HangUpReport),
    /// The session had already ended; nothing ran again
    AlreadyEnded,
}

pub struct HangUpCoordinator {
    appointments: Arc<dyn AppointmentRepository>,
    navigator: Arc<dyn Navigator>,
}

impl HangUpCoordinator {
    pub fn new(appointments: Arc<dyn AppointmentRepository>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            appointments,
            navigator,
        }
    }

    /// Run the three hang-up steps in order
    pub async fn run(
        &self,
        connection: Option<&dyn MeetingConnection>,
        context: &SessionContext,
    ) -> HangUpReport {
        let left_meeting = match connection {
            Some(connection) => match connection.leave().await {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to leave meeting: {}", e);
                    false
                }
            },
            None => {
                warn!("Hang-up without an open meeting connection");
                false
            }
        };

        let status_updated = match self
            .appointments
            .set_status(&context.appointment, AppointmentStatus::Completed)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!(
                    "Failed to mark appointment {} completed: {}",
                    context.appointment, e
                );
                metrics::record_backend_failure("set_status");
                false
            }
        };

        let mut params = RouteParams::new();
        params.insert("id".to_string(), context.record.to_string());
        let navigated = match self.navigator.push(Route::SessionEnded, params) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to navigate to {}: {}", Route::SessionEnded.path(), e);
                false
            }
        };

        metrics::record_hang_up();
        info!(
            "Hang-up for appointment {}: left={} status_updated={} navigated={}",
            context.appointment, left_meeting, status_updated, navigated
        );

        HangUpReport {
            left_meeting,
            status_updated,
            navigated,
        }
    }
}
