//! Doctor profile projection

use crate::domain::shared::error::Result;
use crate::domain::shared::value_objects::RecordId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only row from the `doctors` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Avatar URL
    pub image: String,
    pub created_at: DateTime<Utc>,
}

impl DoctorProfile {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DoctorRepository: Send + Sync {
    /// Fetch exactly one profile. A missing row is an error.
    async fn find_by_id(&self, id: &RecordId) -> Result<DoctorProfile>;
}
