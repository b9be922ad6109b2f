/// PostgREST implementation of DoctorRepository
use crate::domain::doctor::{DoctorProfile, DoctorRepository};
use crate::domain::shared::error::{DomainError, Result};
use crate::domain::shared::value_objects::RecordId;
use crate::infrastructure::supabase::client::PostgrestClient;
use async_trait::async_trait;
use tracing::{debug, warn};

const TABLE: &str = "doctors";

pub struct RestDoctorRepository {
    client: PostgrestClient,
}

impl RestDoctorRepository {
    pub fn new(client: PostgrestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DoctorRepository for RestDoctorRepository {
    async fn find_by_id(&self, id: &RecordId) -> Result<DoctorProfile> {
        let response = self
            .client
            .select_one(TABLE, id.as_str(), "*")?
            .send()
            .await
            .map_err(|e| DomainError::Transport(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Doctor {} lookup rejected with {}: {}", id, status, detail);
            return Err(DomainError::ProfileFetch(format!(
                "backend returned {}",
                status
            )));
        }

        let profile: DoctorProfile = response
            .json()
            .await
            .map_err(|e| DomainError::ProfileFetch(format!("malformed doctor row: {}", e)))?;

        debug!("Loaded doctor profile {}", profile.id);
        Ok(profile)
    }
}
