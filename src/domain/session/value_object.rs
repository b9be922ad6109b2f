//! Session value objects

use serde::{Deserialize, Serialize};

/// Lifecycle of a single call screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No room assigned; the create/join choice is shown
    NotStarted,
    /// Room assigned and meeting connection open
    Active,
    /// Transport dropped; rejoin attempt `attempt` is pending or in flight
    Reconnecting { attempt: u32 },
    /// Patient hung up. Terminal.
    Ended,
}

impl SessionState {
    /// Check if state transition is valid
    pub fn can_transition_to(&self, new_state: &SessionState) -> bool {
        use SessionState::*;

        match (self, new_state) {
            (NotStarted, Active) => true,

            (Active, Reconnecting { attempt }) => *attempt == 1,
            (Active, Ended) => true,

            (Reconnecting { attempt: from }, Reconnecting { attempt: to }) => *to == from + 1,
            (Reconnecting { .. }, Active) => true,
            (Reconnecting { .. }, Ended) => true,

            (Ended, _) => false,

            _ => false,
        }
    }

    /// A room is assigned and the call has not been hung up
    pub fn is_in_call(&self) -> bool {
        matches!(self, SessionState::Active | SessionState::Reconnecting { .. })
    }

    pub fn is_ended(&self) -> bool {
        matches!(self, SessionState::Ended)
    }
}

/// Local microphone state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MicState {
    #[default]
    On,
    Off,
}

impl MicState {
    pub fn toggled(self) -> Self {
        match self {
            MicState::On => MicState::Off,
            MicState::Off => MicState::On,
        }
    }

    pub fn is_on(self) -> bool {
        matches!(self, MicState::On)
    }
}
