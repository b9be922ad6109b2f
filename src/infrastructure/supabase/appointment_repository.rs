/// PostgREST implementation of AppointmentRepository
use crate::domain::appointment::{AppointmentRepository, AppointmentStatus};
use crate::domain::shared::error::{DomainError, Result};
use crate::domain::shared::value_objects::{AppointmentId, RoomId};
use crate::infrastructure::supabase::client::PostgrestClient;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

const TABLE: &str = "appointment";

#[derive(Debug, Deserialize)]
struct MeetingIdRow {
    #[serde(rename = "meetingId")]
    meeting_id: Option<String>,
}

pub struct RestAppointmentRepository {
    client: PostgrestClient,
}

impl RestAppointmentRepository {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }

    async fn patch(
        &self,
        id: &AppointmentId,
        body: serde_json::Value,
        to_error: fn(String) -> DomainError,
    ) -> Result<()> {
        let response = self
            .client
            .update(TABLE, id.as_str(), &body)?
            .send()
            .await
            .map_err(|e| to_error(format!("request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            debug!("Updated appointment {}: {}", id, body);
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        error!("Appointment {} update rejected with {}: {}", id, status, detail);
        Err(to_error(format!("backend returned {}: {}", status, detail)))
    }
}

#[async_trait]
impl AppointmentRepository for RestAppointmentRepository {
    async fn set_meeting_id(&self, id: &AppointmentId, room_id: &RoomId) -> Result<()> {
        self.patch(id, json!({ "meetingId": room_id }), DomainError::RoomPersist)
            .await
    }

    async fn set_status(&self, id: &AppointmentId, status: AppointmentStatus) -> Result<()> {
        self.patch(id, json!({ "status": status }), DomainError::StatusUpdate)
            .await
    }

    async fn meeting_id(&self, id: &AppointmentId) -> Result<Option<RoomId>> {
        let response = self
            .client
            .select_one(TABLE, id.as_str(), "meetingId")?
            .send()
            .await
            .map_err(|e| DomainError::Transport(format!("request failed: {}", e)))?;

        let status = response.status();
        // PostgREST answers 406 when a single-object read matches no row
        if status == StatusCode::NOT_ACCEPTABLE {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DomainError::Transport(format!(
                "backend returned {} reading appointment {}",
                status, id
            )));
        }

        let row: MeetingIdRow = response
            .json()
            .await
            .map_err(|e| DomainError::Transport(format!("malformed appointment row: {}", e)))?;

        Ok(row.meeting_id.filter(|m| !m.is_empty()).map(RoomId::new))
    }
}
