//! Call session aggregate root

use crate::domain::session::event::{
    MicToggled, SessionActivated, SessionEnded, SessionEvent, SessionEventBase,
    SessionReconnecting, SessionRestored,
};
use crate::domain::session::value_object::{MicState, SessionState};
use crate::domain::shared::error::{DomainError, Result};
use crate::domain::shared::value_objects::{RoomId, SessionContext, SessionId};
use chrono::{DateTime, Utc};

/// Call session aggregate root
///
/// Owns the room identity and the lifecycle of one call screen. The room id
/// is assigned exactly once; nothing clears or replaces it afterwards.
#[derive(Debug, Clone)]
pub struct CallSession {
    /// Aggregate root ID
    id: SessionId,
    /// Appointment and doctor record the call belongs to
    context: SessionContext,
    /// Current lifecycle state
    state: SessionState,
    /// Meeting room, set once on activation
    room_id: Option<RoomId>,
    /// Local microphone state
    mic: MicState,
    /// When the room was assigned
    activated_at: Option<DateTime<Utc>>,
    /// When the patient hung up
    ended_at: Option<DateTime<Utc>>,
    /// Pending domain events
    events: Vec<SessionEvent>,
}

impl CallSession {
    pub fn new(context: SessionContext) -> Self {
        Self {
            id: SessionId::new(),
            context,
            state: SessionState::NotStarted,
            room_id: None,
            mic: MicState::default(),
            activated_at: None,
            ended_at: None,
            events: Vec::new(),
        }
    }

    /// Assign the room and enter `Active`
    pub fn activate(&mut self, room_id: RoomId, created: bool) -> Result<()> {
        self.transition_to(SessionState::Active)?;
        self.room_id = Some(room_id.clone());
        self.activated_at = Some(Utc::now());

        self.record_event(SessionEvent::Activated(SessionActivated {
            base: SessionEventBase::new("session.activated", self.id),
            room_id,
            created,
        }));

        Ok(())
    }

    /// Transport dropped (from `Active`) or a rejoin attempt failed (from
    /// `Reconnecting`). Returns the new attempt number.
    pub fn begin_reconnect(&mut self) -> Result<u32> {
        let attempt = match self.state {
            SessionState::Reconnecting { attempt } => attempt + 1,
            _ => 1,
        };
        self.transition_to(SessionState::Reconnecting { attempt })?;

        self.record_event(SessionEvent::Reconnecting(SessionReconnecting {
            base: SessionEventBase::new("session.reconnecting", self.id),
            attempt,
        }));

        Ok(attempt)
    }

    /// Transport is back
    pub fn restore(&mut self) -> Result<()> {
        if !matches!(self.state, SessionState::Reconnecting { .. }) {
            return Err(DomainError::InvalidStateTransition(
                "Can only restore from Reconnecting state".to_string(),
            ));
        }
        self.transition_to(SessionState::Active)?;

        self.record_event(SessionEvent::Restored(SessionRestored {
            base: SessionEventBase::new("session.restored", self.id),
        }));

        Ok(())
    }

    /// Hang up
    pub fn end(&mut self) -> Result<()> {
        self.transition_to(SessionState::Ended)?;
        let ended_at = Utc::now();
        self.ended_at = Some(ended_at);

        let duration_seconds = self
            .activated_at
            .map(|activated| (ended_at - activated).num_seconds());

        self.record_event(SessionEvent::Ended(SessionEnded {
            base: SessionEventBase::new("session.ended", self.id),
            ended_at,
            duration_seconds,
        }));

        Ok(())
    }

    /// Flip the microphone. Independent of the session state.
    pub fn toggle_mic(&mut self) -> MicState {
        self.mic = self.mic.toggled();

        self.record_event(SessionEvent::MicToggled(MicToggled {
            base: SessionEventBase::new("session.mic_toggled", self.id),
            mic: self.mic,
        }));

        self.mic
    }

    fn transition_to(&mut self, new_state: SessionState) -> Result<()> {
        if !self.state.can_transition_to(&new_state) {
            return Err(DomainError::InvalidStateTransition(format!(
                "Cannot transition from {:?} to {:?}",
                self.state, new_state
            )));
        }

        self.state = new_state;
        Ok(())
    }

    fn record_event(&mut self, event: SessionEvent) {
        self.events.push(event);
    }

    /// Take all pending events
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // Getters
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.room_id.as_ref()
    }

    pub fn mic(&self) -> MicState {
        self.mic
    }

    pub fn activated_at(&self) -> Option<&DateTime<Utc>> {
        self.activated_at.as_ref()
    }

    pub fn ended_at(&self) -> Option<&DateTime<Utc>> {
        self.ended_at.as_ref()
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.activated_at
            .and_then(|activated| self.ended_at.map(|ended| ended - activated))
    }
}
