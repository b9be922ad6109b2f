//! Navigation port

use crate::domain::shared::error::Result;
use std::collections::BTreeMap;

/// Screens the call screen can leave for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    SessionEnded,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::SessionEnded => "(app)/Appointments/VoiceCallAppointment/SessionEnded",
        }
    }
}

/// Parameter bag passed along with a push
pub type RouteParams = BTreeMap<String, String>;

#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn push(&self, route: Route, params: RouteParams) -> Result<()>;

    fn back(&self) -> Result<()>;
}
