//! Voice call screen orchestration
//!
//! Ties room resolution, the session aggregate, the presence tracker and the
//! hang-up coordinator together behind the handful of gestures the patient
//! can make. Every operation takes `&mut self`, so transitions run to
//! completion one at a time; a UI shell that shares the screen wraps it in
//! an async mutex.
//!
//! Rejoin attempts after a dropped connection are scheduled, not looped:
//! [`VoiceCallScreen::next_event`] runs one attempt whenever the backoff
//! deadline passes, so restore events and hang-up are never held up by the
//! backoff.

use crate::application::hang_up::{HangUpCoordinator, HangUpOutcome};
use crate::application::room_service::{RoomService, RoomSync};
use crate::domain::action_guard::ActionGuard;
use crate::domain::appointment::AppointmentRepository;
use crate::domain::doctor::DoctorRepository;
use crate::domain::meeting::{
    MeetingConfig, MeetingConnection, MeetingConnector, MeetingEvent, RoomProvisioner,
};
use crate::domain::navigation::Navigator;
use crate::domain::presence::PresenceTracker;
use crate::domain::reconnect::ReconnectPolicy;
use crate::domain::session::{CallSession, MicState, SessionEvent, SessionState};
use crate::domain::shared::error::{DomainError, Result};
use crate::domain::shared::value_objects::{RoomId, SessionContext};
use crate::interface::metrics;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// External collaborators of the screen
#[derive(Clone)]
pub struct ScreenPorts {
    pub provisioner: Arc<dyn RoomProvisioner>,
    pub connector: Arc<dyn MeetingConnector>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub doctors: Arc<dyn DoctorRepository>,
    pub navigator: Arc<dyn Navigator>,
}

/// What happened to a press of the "join call" control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    /// The control was disabled; nothing was sent
    Ignored,
}

pub struct VoiceCallScreen {
    session: CallSession,
    presence: PresenceTracker,
    rooms: RoomService,
    hang_up: HangUpCoordinator,
    connector: Arc<dyn MeetingConnector>,
    doctors: Arc<dyn DoctorRepository>,
    navigator: Arc<dyn Navigator>,
    reconnect: ReconnectPolicy,
    connection: Option<Arc<dyn MeetingConnection>>,
    events: Option<broadcast::Receiver<MeetingEvent>>,
    join_guard: ActionGuard,
    /// When the next rejoin attempt is due, while reconnecting
    retry_at: Option<Instant>,
    connection_lost: bool,
    last_error: Option<String>,
}

/// What woke the event pump
enum Wake {
    Event(std::result::Result<MeetingEvent, RecvError>),
    RetryDue,
}

impl VoiceCallScreen {
    pub fn new(context: SessionContext, ports: ScreenPorts, reconnect: ReconnectPolicy) -> Self {
        Self {
            session: CallSession::new(context),
            presence: PresenceTracker::new(),
            rooms: RoomService::new(ports.provisioner, ports.appointments.clone()),
            hang_up: HangUpCoordinator::new(ports.appointments, ports.navigator.clone()),
            connector: ports.connector,
            doctors: ports.doctors,
            navigator: ports.navigator,
            reconnect,
            connection: None,
            events: None,
            join_guard: ActionGuard::default(),
            retry_at: None,
            connection_lost: false,
            last_error: None,
        }
    }

    /// Screen mounted: fetch the doctor profile (once)
    pub async fn mount(&mut self) {
        let record = self.session.context().record.clone();
        self.presence.load_profile(self.doctors.as_ref(), &record).await;
    }

    /// "Create Room"
    pub async fn create_room(&mut self) -> Result<RoomId> {
        self.start(None).await
    }

    /// "Join the Room" with a pasted code
    pub async fn join_room(&mut self, code: &str) -> Result<RoomId> {
        self.start(Some(code)).await
    }

    async fn start(&mut self, code: Option<&str>) -> Result<RoomId> {
        if self.session.state() != SessionState::NotStarted {
            return Err(DomainError::InvalidStateTransition(format!(
                "Room already assigned, session is {:?}",
                self.session.state()
            )));
        }

        let resolved = self.rooms.resolve(code).await;
        let resolved = match resolved {
            Ok(resolved) => resolved,
            Err(e) => return Err(self.remember(e)),
        };

        let appointment = self.session.context().appointment.clone();
        self.rooms.persist(&appointment, &resolved.room_id).await;

        let config = MeetingConfig::patient(resolved.room_id.clone());
        let opened = self.connector.open(config).await;
        let connection = match opened {
            Ok(connection) => connection,
            Err(e) => {
                error!("Could not open meeting {}: {}", resolved.room_id, e);
                return Err(self.remember(e));
            }
        };

        self.session
            .activate(resolved.room_id.clone(), resolved.created)?;
        self.events = Some(connection.events());
        self.connection = Some(connection);
        self.last_error = None;
        info!(
            "Session {} active in room {}",
            self.session.id(),
            resolved.room_id
        );

        Ok(resolved.room_id)
    }

    /// The "join call" control. Disabled while a join is in flight and after
    /// one succeeded; a failed join re-enables it.
    pub async fn join_call(&mut self) -> Result<JoinOutcome> {
        let connection = match (&self.connection, self.session.state().is_in_call()) {
            (Some(connection), true) => connection.clone(),
            _ => {
                return Err(DomainError::InvalidStateTransition(format!(
                    "Cannot join the call while {:?}",
                    self.session.state()
                )))
            }
        };

        if !self.join_guard.try_begin() {
            debug!("Join control pressed while disabled");
            return Ok(JoinOutcome::Ignored);
        }

        let result = connection.join().await;
        self.join_guard.settle(&result);

        match result {
            Ok(()) => {
                let appointment = self.session.context().appointment.clone();
                self.rooms.sync_room_id(&appointment).await;
                Ok(JoinOutcome::Joined)
            }
            Err(e) => {
                warn!("Joining room failed: {}", e);
                Err(self.remember(e))
            }
        }
    }

    /// Mute or unmute. Touches neither the session state nor the roster.
    pub async fn toggle_mic(&mut self) -> MicState {
        let mic = self.session.toggle_mic();

        if let Some(connection) = &self.connection {
            if let Err(e) = connection.toggle_mic().await {
                warn!("Meeting connection rejected mic toggle: {}", e);
            }
        }

        mic
    }

    /// Hang up. The first call ends the session and runs the terminal side
    /// effects; later calls do nothing. No other backend call runs first.
    pub async fn hang_up(&mut self) -> Result<HangUpOutcome> {
        match self.session.state() {
            SessionState::Ended => return Ok(HangUpOutcome::AlreadyEnded),
            SessionState::NotStarted => {
                return Err(DomainError::InvalidStateTransition(
                    "No call to hang up".to_string(),
                ))
            }
            SessionState::Active | SessionState::Reconnecting { .. } => {}
        }

        if let RoomSync::Pending(room_id) = self.rooms.sync_state() {
            warn!(
                "Room {} still not stored on appointment {} at hang-up",
                room_id,
                self.session.context().appointment
            );
        }

        self.retry_at = None;
        self.session.end()?;
        let report = self
            .hang_up
            .run(self.connection.as_deref(), self.session.context())
            .await;

        Ok(HangUpOutcome::Completed(report))
    }

    /// Back arrow on the create/join screen
    pub fn back(&self) -> Result<()> {
        if self.session.state() != SessionState::NotStarted {
            return Err(DomainError::InvalidStateTransition(
                "Back is only available before a room is assigned".to_string(),
            ));
        }
        self.navigator.back()
    }

    /// Wait for the next meeting event. `None` once the connection's event
    /// stream is closed or before any room is open.
    ///
    /// While reconnecting, a rejoin attempt runs each time the backoff
    /// deadline passes before an event arrives.
    pub async fn next_event(&mut self) -> Option<MeetingEvent> {
        loop {
            let retry_at = self.retry_at;
            let events = self.events.as_mut()?;
            let wake = match retry_at {
                Some(deadline) => tokio::select! {
                    received = events.recv() => Wake::Event(received),
                    _ = tokio::time::sleep_until(deadline) => Wake::RetryDue,
                },
                None => Wake::Event(events.recv().await),
            };

            match wake {
                Wake::Event(Ok(event)) => return Some(event),
                Wake::Event(Err(RecvError::Lagged(skipped))) => {
                    warn!("Dropped {} meeting event(s), roster may be stale", skipped);
                }
                Wake::Event(Err(RecvError::Closed)) => {
                    debug!("Meeting event stream closed");
                    self.events = None;
                    self.retry_at = None;
                    return None;
                }
                Wake::RetryDue => self.retry_reconnect().await,
            }
        }
    }

    /// Apply events until the session ends or the stream closes
    pub async fn pump_events(&mut self) {
        while !self.session.state().is_ended() {
            match self.next_event().await {
                Some(event) => self.handle_meeting_event(event).await,
                None => break,
            }
        }
    }

    /// Apply one meeting event
    pub async fn handle_meeting_event(&mut self, event: MeetingEvent) {
        if self.session.state().is_ended() {
            return;
        }

        match &event {
            MeetingEvent::ParticipantJoined { .. } | MeetingEvent::ParticipantLeft { .. } => {
                self.presence.apply(&event);
            }
            MeetingEvent::ConnectionLost { reason } => {
                if self.session.state() == SessionState::Active {
                    warn!("Meeting connection lost: {}", reason);
                    self.enter_reconnect();
                }
            }
            MeetingEvent::ConnectionRestored => {
                if matches!(self.session.state(), SessionState::Reconnecting { .. }) {
                    self.restore();
                }
            }
        }
    }

    /// Whether a rejoin attempt is scheduled
    pub fn retry_pending(&self) -> bool {
        self.retry_at.is_some()
    }

    fn enter_reconnect(&mut self) {
        match self.session.begin_reconnect() {
            Ok(attempt) => self.schedule_retry(attempt),
            Err(e) => error!("Cannot enter reconnect: {}", e),
        }
    }

    fn schedule_retry(&mut self, attempt: u32) {
        match self.reconnect.delay_for(attempt) {
            Some(delay) => {
                debug!("Reconnect attempt {} in {:?}", attempt, delay);
                self.retry_at = Some(Instant::now() + delay);
            }
            None => self.give_up_reconnect(),
        }
    }

    /// One rejoin attempt; schedules the next on failure
    async fn retry_reconnect(&mut self) {
        self.retry_at = None;
        let attempt = match self.session.state() {
            SessionState::Reconnecting { attempt } => attempt,
            _ => return,
        };
        let Some(connection) = self.connection.clone() else {
            return;
        };

        metrics::record_reconnect_attempt();
        let result = connection.join().await;
        match result {
            Ok(()) => self.restore(),
            Err(e) => {
                warn!("Reconnect attempt {} failed: {}", attempt, e);
                if attempt >= self.reconnect.max_attempts {
                    self.give_up_reconnect();
                    return;
                }
                match self.session.begin_reconnect() {
                    Ok(next) => self.schedule_retry(next),
                    Err(e) => error!("Cannot continue reconnect: {}", e),
                }
            }
        }
    }

    fn give_up_reconnect(&mut self) {
        warn!(
            "Giving up on reconnect after {} attempt(s)",
            self.reconnect.max_attempts
        );
        self.connection_lost = true;
    }

    fn restore(&mut self) {
        self.retry_at = None;
        match self.session.restore() {
            Ok(()) => {
                info!("Meeting connection restored");
                self.connection_lost = false;
            }
            Err(e) => warn!("Ignoring restore: {}", e),
        }
    }

    /// Room id currently stored on the appointment, for diagnostics
    pub async fn stored_meeting_id(&self) -> Option<RoomId> {
        let appointment = &self.session.context().appointment;
        let stored = self.rooms.stored_room_id(appointment).await;
        match stored {
            Ok(room_id) => {
                debug!("Meeting ID fetched: {:?}", room_id);
                room_id
            }
            Err(e) => {
                error!("Error fetching meeting ID: {}", e);
                None
            }
        }
    }

    fn remember(&mut self, e: DomainError) -> DomainError {
        self.last_error = Some(e.to_string());
        e
    }

    pub fn take_session_events(&mut self) -> Vec<SessionEvent> {
        self.session.take_events()
    }

    // Getters
    pub fn session(&self) -> &CallSession {
        &self.session
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn room_sync(&self) -> &RoomSync {
        self.rooms.sync_state()
    }

    pub fn join_enabled(&self) -> bool {
        self.connection.is_some() && self.join_guard.is_enabled()
    }

    pub fn connection_lost(&self) -> bool {
        self.connection_lost
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
