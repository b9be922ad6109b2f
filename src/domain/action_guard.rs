//! Guard for one-shot UI actions
//!
//! A press moves the guard from `Armed` to `Pending`; further presses are
//! ignored until the operation settles. Success latches the control off,
//! failure re-arms it so the user can try again.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActionGuard {
    #[default]
    Armed,
    Pending,
    Succeeded,
    Failed,
}

impl ActionGuard {
    /// Claim the action. Returns `false` if a press is already in flight or
    /// the action already succeeded.
    pub fn try_begin(&mut self) -> bool {
        match self {
            ActionGuard::Armed | ActionGuard::Failed => {
                *self = ActionGuard::Pending;
                true
            }
            ActionGuard::Pending | ActionGuard::Succeeded => false,
        }
    }

    pub fn succeed(&mut self) {
        if *self == ActionGuard::Pending {
            *self = ActionGuard::Succeeded;
        }
    }

    pub fn fail(&mut self) {
        if *self == ActionGuard::Pending {
            *self = ActionGuard::Failed;
        }
    }

    /// Settle a pending action from its result
    pub fn settle<T, E>(&mut self, result: &Result<T, E>) {
        match result {
            Ok(_) => self.succeed(),
            Err(_) => self.fail(),
        }
    }

    /// Whether the control should accept a press
    pub fn is_enabled(&self) -> bool {
        matches!(self, ActionGuard::Armed | ActionGuard::Failed)
    }
}
