//! Event envelope shared by aggregates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Something an aggregate recorded; drained by the application layer
pub trait DomainEvent: Send + Sync {
    fn metadata(&self) -> &EventMetadata;

    /// Dotted name such as `session.ended`
    fn event_type(&self) -> &str {
        &self.metadata().event_type
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.metadata().occurred_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub event_type: String,
}

impl EventMetadata {
    /// Stamp a new event with a fresh id and the current time
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            event_type: event_type.into(),
        }
    }
}
