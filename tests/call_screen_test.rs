//! Voice call screen scenario tests
//!
//! Drive the screen end to end over the loopback meeting connection, with
//! in-memory backend fakes recording what was written.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use telecall::application::{HangUpOutcome, JoinOutcome, RoomSync, ScreenPorts, VoiceCallScreen};
use telecall::domain::appointment::{AppointmentRepository, AppointmentStatus};
use telecall::domain::doctor::{DoctorProfile, DoctorRepository};
use telecall::domain::meeting::{MeetingEvent, RoomProvisioner};
use telecall::domain::navigation::Route;
use telecall::domain::presence::DOCTOR_JOINED_MESSAGE;
use telecall::domain::reconnect::ReconnectPolicy;
use telecall::domain::session::{MicState, SessionEvent, SessionState};
use telecall::domain::shared::value_objects::{
    AppointmentId, ParticipantId, RecordId, RoomId, SessionContext,
};
use telecall::infrastructure::meeting::{ConnectionCommand, LoopbackConnection, LoopbackConnector};
use telecall::infrastructure::navigation::HistoryNavigator;
use telecall::{DomainError, Result};
use tokio::sync::RwLock;
use tokio_test::assert_ok;

const APPOINTMENT: &str = "appt-42";
const RECORD: &str = "doc-7";

/// Hands out a fixed room id and counts calls
struct FakeProvisioner {
    room_id: String,
    calls: AtomicUsize,
}

#[async_trait]
impl RoomProvisioner for FakeProvisioner {
    async fn create_room(&self) -> Result<RoomId> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.room_id.is_empty() {
            return Err(DomainError::RoomCreation("no roomId in response".to_string()));
        }
        Ok(RoomId::new(self.room_id.clone()))
    }
}

#[derive(Default)]
struct FakeAppointments {
    meeting_ids: RwLock<Vec<(AppointmentId, RoomId)>>,
    statuses: RwLock<Vec<(AppointmentId, AppointmentStatus)>>,
    fail_meeting_id: AtomicBool,
    stall_meeting_id: AtomicBool,
    meeting_id_calls: AtomicUsize,
    fail_status: AtomicBool,
}

#[async_trait]
impl AppointmentRepository for FakeAppointments {
    async fn set_meeting_id(&self, id: &AppointmentId, room_id: &RoomId) -> Result<()> {
        self.meeting_id_calls.fetch_add(1, Ordering::SeqCst);
        if self.stall_meeting_id.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_meeting_id.load(Ordering::SeqCst) {
            return Err(DomainError::RoomPersist("503".to_string()));
        }
        self.meeting_ids
            .write()
            .await
            .push((id.clone(), room_id.clone()));
        Ok(())
    }

    async fn set_status(&self, id: &AppointmentId, status: AppointmentStatus) -> Result<()> {
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(DomainError::StatusUpdate("503".to_string()));
        }
        self.statuses.write().await.push((id.clone(), status));
        Ok(())
    }

    async fn meeting_id(&self, _id: &AppointmentId) -> Result<Option<RoomId>> {
        Ok(self
            .meeting_ids
            .read()
            .await
            .last()
            .map(|(_, room_id)| room_id.clone()))
    }
}

struct FakeDoctors;

#[async_trait]
impl DoctorRepository for FakeDoctors {
    async fn find_by_id(&self, id: &RecordId) -> Result<DoctorProfile> {
        Ok(DoctorProfile {
            id: id.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Reyes".to_string(),
            image: "https://cdn.example.com/ana.png".to_string(),
            created_at: Utc::now(),
        })
    }
}

struct Harness {
    screen: VoiceCallScreen,
    provisioner: Arc<FakeProvisioner>,
    connector: Arc<LoopbackConnector>,
    appointments: Arc<FakeAppointments>,
    navigator: Arc<HistoryNavigator>,
}

impl Harness {
    async fn connection(&self) -> Arc<LoopbackConnection> {
        self.connector
            .last_connection()
            .await
            .expect("a connection was opened")
    }

    /// Emit one event and feed it through the screen
    async fn deliver(&mut self, event: MeetingEvent) {
        self.connection().await.emit(event);
        let received = self.screen.next_event().await.expect("event delivered");
        self.screen.handle_meeting_event(received).await;
    }

    /// Pump events (and any due rejoin attempts) for `window`
    async fn pump_for(&mut self, window: Duration) {
        let deadline = tokio::time::Instant::now() + window;
        while let Ok(Some(event)) =
            tokio::time::timeout_at(deadline, self.screen.next_event()).await
        {
            self.screen.handle_meeting_event(event).await;
        }
    }

    async fn join_commands(&self) -> usize {
        self.connection()
            .await
            .commands()
            .await
            .into_iter()
            .filter(|c| *c == ConnectionCommand::Join)
            .count()
    }
}

fn setup_screen(room_id: &str, reconnect: ReconnectPolicy) -> Harness {
    let provisioner = Arc::new(FakeProvisioner {
        room_id: room_id.to_string(),
        calls: AtomicUsize::new(0),
    });
    let connector = Arc::new(LoopbackConnector::new());
    let appointments = Arc::new(FakeAppointments::default());
    let navigator = Arc::new(HistoryNavigator::new());

    let ports = ScreenPorts {
        provisioner: provisioner.clone(),
        connector: connector.clone(),
        appointments: appointments.clone(),
        doctors: Arc::new(FakeDoctors),
        navigator: navigator.clone(),
    };
    let screen = VoiceCallScreen::new(SessionContext::new(APPOINTMENT, RECORD), ports, reconnect);

    Harness {
        screen,
        provisioner,
        connector,
        appointments,
        navigator,
    }
}

fn joined(id: &str) -> MeetingEvent {
    MeetingEvent::ParticipantJoined {
        id: ParticipantId::from(id),
        display_name: None,
    }
}

fn fast_reconnect(max_attempts: u32) -> ReconnectPolicy {
    ReconnectPolicy::new(max_attempts, Duration::from_millis(1), Duration::from_millis(4))
}

#[tokio::test]
async fn test_create_room_persists_room_id() {
    let mut h = setup_screen("ABCD-1234-WXYZ", ReconnectPolicy::default());
    h.screen.mount().await;

    let room_id = assert_ok!(h.screen.create_room().await);

    assert_eq!(room_id.as_str(), "ABCD-1234-WXYZ");
    assert_eq!(h.provisioner.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.screen.session().state(), SessionState::Active);
    assert_eq!(
        h.appointments.meeting_ids.read().await.as_slice(),
        &[(AppointmentId::from(APPOINTMENT), room_id.clone())]
    );
    assert_eq!(h.screen.room_sync(), &RoomSync::Synced(room_id.clone()));
    assert_eq!(h.screen.stored_meeting_id().await, Some(room_id.clone()));

    // The connection was opened as the patient, mic on, camera off
    let config = h.connection().await.config().clone();
    assert_eq!(config.meeting_id, room_id);
    assert_eq!(config.name, "Patient");
    assert!(config.mic_enabled);
    assert!(!config.webcam_enabled);

    let events = h.screen.take_session_events();
    assert!(matches!(
        events.as_slice(),
        [SessionEvent::Activated(e)] if e.created
    ));
}

#[tokio::test]
async fn test_join_pasted_code_skips_creation() {
    let mut h = setup_screen("unused", ReconnectPolicy::default());

    let room_id = assert_ok!(h.screen.join_room("1111-2222-3333").await);

    assert_eq!(room_id.as_str(), "1111-2222-3333");
    assert_eq!(h.provisioner.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.screen.session().state(), SessionState::Active);
    assert_eq!(
        h.appointments.meeting_ids.read().await.as_slice(),
        &[(AppointmentId::from(APPOINTMENT), RoomId::from("1111-2222-3333"))]
    );
}

#[tokio::test]
async fn test_empty_code_rejected_without_side_effects() {
    let mut h = setup_screen("unused", ReconnectPolicy::default());

    let result = h.screen.join_room("").await;

    assert_eq!(result, Err(DomainError::EmptyRoomCode));
    assert_eq!(h.provisioner.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.connector.open_count().await, 0);
    assert_eq!(h.screen.session().state(), SessionState::NotStarted);
    assert!(h.screen.last_error().is_some());
}

#[tokio::test]
async fn test_room_creation_failure_keeps_join_screen() {
    let mut h = setup_screen("", ReconnectPolicy::default());

    let result = h.screen.create_room().await;

    assert!(matches!(result, Err(DomainError::RoomCreation(_))));
    assert_eq!(h.screen.session().state(), SessionState::NotStarted);
    assert!(h.screen.session().room_id().is_none());
    assert!(h.appointments.meeting_ids.read().await.is_empty());

    // Back is still available from the join screen
    assert_ok!(h.screen.back());
}

#[tokio::test]
async fn test_connector_refusal_still_stores_created_room() {
    let mut h = setup_screen("ABCD-1234-WXYZ", ReconnectPolicy::default());
    h.connector.refuse_open(true);

    let result = h.screen.create_room().await;

    assert!(matches!(result, Err(DomainError::Connection(_))));
    assert_eq!(h.screen.session().state(), SessionState::NotStarted);
    // The room exists at the provider, so the appointment still learns it
    assert_eq!(
        h.appointments.meeting_ids.read().await.as_slice(),
        &[(AppointmentId::from(APPOINTMENT), RoomId::from("ABCD-1234-WXYZ"))]
    );
}

#[tokio::test]
async fn test_whitespace_code_used_verbatim() {
    let mut h = setup_screen("unused", ReconnectPolicy::default());

    let room_id = assert_ok!(h.screen.join_room(" ").await);

    assert_eq!(room_id.as_str(), " ");
    assert_eq!(h.provisioner.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.connection().await.config().meeting_id, RoomId::from(" "));
}

#[tokio::test]
async fn test_room_id_write_retried_on_join() {
    let mut h = setup_screen("ABCD-1234-WXYZ", ReconnectPolicy::default());
    h.appointments.fail_meeting_id.store(true, Ordering::SeqCst);

    let room_id = assert_ok!(h.screen.create_room().await);
    assert_eq!(h.screen.room_sync(), &RoomSync::Pending(room_id.clone()));

    h.appointments.fail_meeting_id.store(false, Ordering::SeqCst);
    assert_eq!(assert_ok!(h.screen.join_call().await), JoinOutcome::Joined);

    assert_eq!(h.screen.room_sync(), &RoomSync::Synced(room_id.clone()));
    assert_eq!(h.appointments.meeting_ids.read().await.len(), 1);
}

#[tokio::test]
async fn test_roster_growth_and_presence_message() {
    let mut h = setup_screen("ABCD-1234-WXYZ", ReconnectPolicy::default());
    assert_ok!(h.screen.create_room().await);
    assert!(h.screen.presence().is_empty());

    h.deliver(joined("p1")).await;
    assert_eq!(h.screen.presence().len(), 1);
    assert_eq!(h.screen.presence().message(), "");

    h.deliver(joined("p2")).await;
    assert_eq!(h.screen.presence().len(), 2);
    assert_eq!(h.screen.presence().message(), DOCTOR_JOINED_MESSAGE);

    h.deliver(joined("p3")).await;
    assert_eq!(h.screen.presence().len(), 3);
    assert_eq!(h.screen.presence().message(), "");

    h.deliver(MeetingEvent::ParticipantLeft {
        id: ParticipantId::from("p1"),
    })
    .await;
    assert_eq!(h.screen.presence().message(), DOCTOR_JOINED_MESSAGE);
    assert_eq!(
        h.screen.presence().remote_participant().map(|p| p.id.as_str()),
        Some("p2")
    );
}

#[tokio::test]
async fn test_join_control_disabled_after_success() {
    let mut h = setup_screen("ABCD-1234-WXYZ", ReconnectPolicy::default());
    assert_ok!(h.screen.create_room().await);

    assert!(h.screen.join_enabled());
    assert_eq!(assert_ok!(h.screen.join_call().await), JoinOutcome::Joined);
    assert!(!h.screen.join_enabled());
    assert_eq!(assert_ok!(h.screen.join_call().await), JoinOutcome::Ignored);

    assert_eq!(h.join_commands().await, 1);
}

#[tokio::test]
async fn test_failed_join_rearms_control() {
    let mut h = setup_screen("ABCD-1234-WXYZ", ReconnectPolicy::default());
    assert_ok!(h.screen.create_room().await);
    h.connection().await.fail_next_joins(1);

    let result = h.screen.join_call().await;
    assert!(matches!(result, Err(DomainError::Connection(_))));
    assert!(h.screen.join_enabled());

    assert_eq!(assert_ok!(h.screen.join_call().await), JoinOutcome::Joined);
    assert!(h.connection().await.is_joined());
}

#[tokio::test]
async fn test_mic_toggle_is_independent() {
    let mut h = setup_screen("ABCD-1234-WXYZ", ReconnectPolicy::default());
    assert_ok!(h.screen.create_room().await);
    h.deliver(joined("p1")).await;

    assert_eq!(h.screen.toggle_mic().await, MicState::Off);
    assert!(!h.connection().await.mic_enabled());
    assert_eq!(h.screen.session().state(), SessionState::Active);
    assert_eq!(h.screen.presence().len(), 1);

    assert_eq!(h.screen.toggle_mic().await, MicState::On);
    assert!(h.connection().await.mic_enabled());
}

#[tokio::test]
async fn test_hang_up_runs_side_effects_once() {
    let mut h = setup_screen("ABCD-1234-WXYZ", ReconnectPolicy::default());
    assert_ok!(h.screen.create_room().await);
    assert_ok!(h.screen.join_call().await);

    let outcome = assert_ok!(h.screen.hang_up().await);
    let report = match outcome {
        HangUpOutcome::Completed(report) => report,
        HangUpOutcome::AlreadyEnded => panic!("first hang-up must run"),
    };
    assert!(report.left_meeting && report.status_updated && report.navigated);

    assert_eq!(h.screen.session().state(), SessionState::Ended);
    assert!(!h.connection().await.is_joined());
    assert_eq!(
        h.appointments.statuses.read().await.as_slice(),
        &[(AppointmentId::from(APPOINTMENT), AppointmentStatus::Completed)]
    );
    let (route, params) = h.navigator.current().expect("navigated");
    assert_eq!(route, Route::SessionEnded);
    assert_eq!(params.get("id").map(String::as_str), Some(RECORD));

    // A second press does nothing
    assert_eq!(
        assert_ok!(h.screen.hang_up().await),
        HangUpOutcome::AlreadyEnded
    );
    assert_eq!(h.appointments.statuses.read().await.len(), 1);
    assert_eq!(h.navigator.depth(), 1);
}

#[tokio::test]
async fn test_hang_up_navigates_when_status_update_fails() {
    let mut h = setup_screen("ABCD-1234-WXYZ", ReconnectPolicy::default());
    assert_ok!(h.screen.create_room().await);
    h.appointments.fail_status.store(true, Ordering::SeqCst);

    let outcome = assert_ok!(h.screen.hang_up().await);

    match outcome {
        HangUpOutcome::Completed(report) => {
            assert!(report.left_meeting);
            assert!(!report.status_updated);
            assert!(report.navigated);
        }
        HangUpOutcome::AlreadyEnded => panic!("first hang-up must run"),
    }
    assert_eq!(
        h.connection().await.commands().await.last(),
        Some(&ConnectionCommand::Leave)
    );
    assert_eq!(h.navigator.depth(), 1);
}

#[tokio::test]
async fn test_hang_up_before_room_rejected() {
    let mut h = setup_screen("ABCD-1234-WXYZ", ReconnectPolicy::default());

    let result = h.screen.hang_up().await;

    assert!(matches!(result, Err(DomainError::InvalidStateTransition(_))));
    assert_eq!(h.navigator.depth(), 0);
}

#[tokio::test]
async fn test_events_after_end_ignored() {
    let mut h = setup_screen("ABCD-1234-WXYZ", ReconnectPolicy::default());
    assert_ok!(h.screen.create_room().await);
    assert_ok!(h.screen.hang_up().await);

    h.screen.handle_meeting_event(joined("late")).await;

    assert!(h.screen.presence().is_empty());
}

#[tokio::test]
async fn test_hang_up_not_held_by_stalled_room_id_write() {
    let mut h = setup_screen("ABCD-1234-WXYZ", ReconnectPolicy::default());
    h.appointments.fail_meeting_id.store(true, Ordering::SeqCst);
    let room_id = assert_ok!(h.screen.create_room().await);
    assert_eq!(h.screen.room_sync(), &RoomSync::Pending(room_id));

    // Any further room-id write never returns
    h.appointments.stall_meeting_id.store(true, Ordering::SeqCst);

    let outcome = tokio::time::timeout(Duration::from_millis(500), h.screen.hang_up())
        .await
        .expect("hang-up finished without waiting on the backend");

    match assert_ok!(outcome) {
        HangUpOutcome::Completed(report) => {
            assert!(report.left_meeting && report.status_updated && report.navigated);
        }
        HangUpOutcome::AlreadyEnded => panic!("first hang-up must run"),
    }
    assert_eq!(h.appointments.meeting_id_calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        h.connection().await.commands().await.last(),
        Some(&ConnectionCommand::Leave)
    );
    assert_eq!(h.appointments.statuses.read().await.len(), 1);
    assert_eq!(h.navigator.depth(), 1);
    assert_eq!(h.screen.session().state(), SessionState::Ended);
}

#[tokio::test]
async fn test_reconnect_restores_session() {
    let mut h = setup_screen("ABCD-1234-WXYZ", fast_reconnect(3));
    assert_ok!(h.screen.create_room().await);
    assert_ok!(h.screen.join_call().await);
    h.connection().await.fail_next_joins(1);

    h.deliver(MeetingEvent::ConnectionLost {
        reason: "network changed".to_string(),
    })
    .await;

    // Handling the event only schedules the first attempt
    assert_eq!(
        h.screen.session().state(),
        SessionState::Reconnecting { attempt: 1 }
    );
    assert!(h.screen.retry_pending());

    h.pump_for(Duration::from_millis(100)).await;

    assert_eq!(h.screen.session().state(), SessionState::Active);
    assert!(!h.screen.connection_lost());
    assert!(!h.screen.retry_pending());

    let events = h.screen.take_session_events();
    let attempts: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Reconnecting(e) => Some(e.attempt),
            _ => None,
        })
        .collect();
    assert_eq!(attempts, vec![1, 2]);
    assert!(matches!(events.last(), Some(SessionEvent::Restored(_))));
}

#[tokio::test]
async fn test_queued_restore_ends_backoff() {
    let policy = ReconnectPolicy::new(3, Duration::from_millis(50), Duration::from_millis(200));
    let mut h = setup_screen("ABCD-1234-WXYZ", policy);
    assert_ok!(h.screen.create_room().await);
    assert_ok!(h.screen.join_call().await);
    h.connection().await.fail_next_joins(10);

    let connection = h.connection().await;
    connection.emit(MeetingEvent::ConnectionLost {
        reason: "wifi handover".to_string(),
    });
    connection.emit(MeetingEvent::ConnectionRestored);

    h.pump_for(Duration::from_millis(20)).await;

    assert_eq!(h.screen.session().state(), SessionState::Active);
    assert!(!h.screen.connection_lost());
    assert!(!h.screen.retry_pending());
    // Only the original join; no rejoin attempt was made
    assert_eq!(h.join_commands().await, 1);
}

#[tokio::test]
async fn test_hang_up_during_backoff() {
    let policy = ReconnectPolicy::new(5, Duration::from_secs(10), Duration::from_secs(30));
    let mut h = setup_screen("ABCD-1234-WXYZ", policy);
    assert_ok!(h.screen.create_room().await);
    assert_ok!(h.screen.join_call().await);

    h.deliver(MeetingEvent::ConnectionLost {
        reason: "timeout".to_string(),
    })
    .await;
    assert!(h.screen.retry_pending());

    let outcome = tokio::time::timeout(Duration::from_millis(500), h.screen.hang_up())
        .await
        .expect("hang-up did not wait for the backoff");

    assert!(matches!(assert_ok!(outcome), HangUpOutcome::Completed(_)));
    assert_eq!(h.screen.session().state(), SessionState::Ended);
    assert!(!h.screen.retry_pending());
}

#[tokio::test]
async fn test_reconnect_gives_up_but_hang_up_still_works() {
    let mut h = setup_screen("ABCD-1234-WXYZ", fast_reconnect(2));
    assert_ok!(h.screen.create_room().await);
    assert_ok!(h.screen.join_call().await);
    h.connection().await.fail_next_joins(5);

    h.deliver(MeetingEvent::ConnectionLost {
        reason: "timeout".to_string(),
    })
    .await;
    h.pump_for(Duration::from_millis(100)).await;

    assert_eq!(
        h.screen.session().state(),
        SessionState::Reconnecting { attempt: 2 }
    );
    assert!(h.screen.connection_lost());
    assert!(!h.screen.retry_pending());
    // The original join plus two rejoin attempts
    assert_eq!(h.join_commands().await, 3);

    let outcome = assert_ok!(h.screen.hang_up().await);
    assert!(matches!(outcome, HangUpOutcome::Completed(_)));
    assert_eq!(h.screen.session().state(), SessionState::Ended);
}
