//! In-memory navigation history

use crate::domain::navigation::{Navigator, Route, RouteParams};
use crate::domain::shared::error::{DomainError, Result};
use std::sync::Mutex;
use tracing::info;

/// Records pushed routes as a stack; `back` pops the top entry
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    stack: Mutex<Vec<(Route, RouteParams)>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top of the stack
    pub fn current(&self) -> Option<(Route, RouteParams)> {
        self.stack.lock().ok()?.last().cloned()
    }

    pub fn depth(&self) -> usize {
        self.stack.lock().map(|stack| stack.len()).unwrap_or(0)
    }
}

impl Navigator for HistoryNavigator {
    fn push(&self, route: Route, params: RouteParams) -> Result<()> {
        info!("Navigating to {} with {:?}", route.path(), params);
        self.stack
            .lock()
            .map_err(|e| DomainError::Navigation(e.to_string()))?
            .push((route, params));
        Ok(())
    }

    fn back(&self) -> Result<()> {
        let mut stack = self
            .stack
            .lock()
            .map_err(|e| DomainError::Navigation(e.to_string()))?;
        info!("Navigating back");
        // Popping past the bottom hands control back to the host screen
        stack.pop();
        Ok(())
    }
}
