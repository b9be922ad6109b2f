//! View models the UI shell renders
//!
//! Layout, icons and theming stay with the shell; these structs only carry
//! the text and flags derived from the screen's state.

use crate::application::call_screen::VoiceCallScreen;
use crate::domain::presence::ProfileState;
use crate::domain::session::SessionState;
use serde::Serialize;

pub const CREATE_ROOM_LABEL: &str = "Create Room";
pub const JOIN_ROOM_LABEL: &str = "Join the Room";
pub const ROOM_CODE_PLACEHOLDER: &str = "XXXX-XXXX-XXXX";
pub const TAP_TO_CALL: &str = "Tap to call";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum ScreenView {
    Join(JoinView),
    Call(CallView),
    Ended,
}

/// Create/join choice shown before a room exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinView {
    pub create_label: &'static str,
    pub join_label: &'static str,
    pub code_placeholder: &'static str,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    Reconnecting { attempt: u32 },
    Lost,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoctorCard {
    pub name: String,
    pub image: String,
}

/// Call controls and the remote participant card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallView {
    pub room_id: String,
    pub connection: ConnectionStatus,
    pub doctor: Option<DoctorCard>,
    pub profile_error: Option<String>,
    /// "Tap to call" while nobody else is in the room
    pub prompt: Option<&'static str>,
    pub presence_message: Option<String>,
    pub mic_on: bool,
    pub join_enabled: bool,
    pub error: Option<String>,
}

impl ScreenView {
    pub fn of(screen: &VoiceCallScreen) -> Self {
        let session = screen.session();
        let state = session.state();

        let room_id = match (state, session.room_id()) {
            (SessionState::Ended, _) => return ScreenView::Ended,
            (_, Some(room_id)) => room_id.to_string(),
            (_, None) => {
                return ScreenView::Join(JoinView {
                    create_label: CREATE_ROOM_LABEL,
                    join_label: JOIN_ROOM_LABEL,
                    code_placeholder: ROOM_CODE_PLACEHOLDER,
                    error: screen.last_error().map(str::to_string),
                })
            }
        };

        let connection = match state {
            _ if screen.connection_lost() => ConnectionStatus::Lost,
            SessionState::Reconnecting { attempt } => ConnectionStatus::Reconnecting { attempt },
            _ => ConnectionStatus::Connected,
        };

        let presence = screen.presence();
        let (doctor, profile_error) = match presence.profile() {
            ProfileState::Loaded(profile) => (
                Some(DoctorCard {
                    name: profile.display_name(),
                    image: profile.image.clone(),
                }),
                None,
            ),
            ProfileState::Failed(message) => (None, Some(message.clone())),
            ProfileState::NotLoaded => (None, None),
        };

        let message = presence.message();

        ScreenView::Call(CallView {
            room_id,
            connection,
            doctor,
            profile_error,
            prompt: presence.is_empty().then_some(TAP_TO_CALL),
            presence_message: (!message.is_empty()).then(|| message.to_string()),
            mic_on: session.mic().is_on(),
            join_enabled: screen.join_enabled(),
            error: screen.last_error().map(str::to_string),
        })
    }
}
