//! In-process meeting connection
//!
//! Stands in for the meeting SDK when no real transport is wired in: it
//! records every command it receives and lets the caller inject roster and
//! transport events. The headless binary and the scenario tests run on it.

use crate::domain::meeting::{MeetingConfig, MeetingConnection, MeetingConnector, MeetingEvent};
use crate::domain::shared::error::{DomainError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};

/// Capacity of the event channel; slower subscribers see `Lagged`
const EVENT_CAPACITY: usize = 256;

/// A command the screen sent to the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionCommand {
    Join,
    Leave,
    ToggleMic,
}

pub struct LoopbackConnection {
    config: MeetingConfig,
    events: broadcast::Sender<MeetingEvent>,
    commands: RwLock<Vec<ConnectionCommand>>,
    joined: AtomicBool,
    mic_enabled: AtomicBool,
    join_failures: AtomicU32,
}

impl LoopbackConnection {
    pub fn new(config: MeetingConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let mic_enabled = AtomicBool::new(config.mic_enabled);
        Self {
            config,
            events,
            commands: RwLock::new(Vec::new()),
            joined: AtomicBool::new(false),
            mic_enabled,
            join_failures: AtomicU32::new(0),
        }
    }

    /// Push an event to every subscriber. Returns how many received it.
    pub fn emit(&self, event: MeetingEvent) -> usize {
        debug!("Loopback event for room {}: {:?}", self.config.meeting_id, event);
        self.events.send(event).unwrap_or(0)
    }

    /// Make the next `count` joins fail
    pub fn fail_next_joins(&self, count: u32) {
        self.join_failures.store(count, Ordering::SeqCst);
    }

    pub async fn commands(&self) -> Vec<ConnectionCommand> {
        self.commands.read().await.clone()
    }

    pub fn config(&self) -> &MeetingConfig {
        &self.config
    }

    pub fn is_joined(&self) -> bool {
        self.joined.load(Ordering::SeqCst)
    }

    pub fn mic_enabled(&self) -> bool {
        self.mic_enabled.load(Ordering::SeqCst)
    }

    async fn record(&self, command: ConnectionCommand) {
        self.commands.write().await.push(command);
    }
}

#[async_trait]
impl MeetingConnection for LoopbackConnection {
    async fn join(&self) -> Result<()> {
        self.record(ConnectionCommand::Join).await;

        let refused = self
            .join_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(DomainError::Connection(format!(
                "room {} refused the join",
                self.config.meeting_id
            )));
        }

        self.joined.store(true, Ordering::SeqCst);
        info!("Joined room {} as {}", self.config.meeting_id, self.config.name);
        Ok(())
    }

    async fn leave(&self) -> Result<()> {
        self.record(ConnectionCommand::Leave).await;
        self.joined.store(false, Ordering::SeqCst);
        info!("Left room {}", self.config.meeting_id);
        Ok(())
    }

    async fn toggle_mic(&self) -> Result<()> {
        self.record(ConnectionCommand::ToggleMic).await;
        self.mic_enabled.fetch_xor(true, Ordering::SeqCst);
        Ok(())
    }

    fn events(&self) -> broadcast::Receiver<MeetingEvent> {
        self.events.subscribe()
    }
}

/// Opens [`LoopbackConnection`]s and keeps a handle to each one
#[derive(Default)]
pub struct LoopbackConnector {
    opened: RwLock<Vec<Arc<LoopbackConnection>>>,
    refuse_open: AtomicBool,
}

impl LoopbackConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `open` fail
    pub fn refuse_open(&self, refuse: bool) {
        self.refuse_open.store(refuse, Ordering::SeqCst);
    }

    /// The most recently opened connection
    pub async fn last_connection(&self) -> Option<Arc<LoopbackConnection>> {
        self.opened.read().await.last().cloned()
    }

    pub async fn open_count(&self) -> usize {
        self.opened.read().await.len()
    }
}

#[async_trait]
impl MeetingConnector for LoopbackConnector {
    async fn open(&self, config: MeetingConfig) -> Result<Arc<dyn MeetingConnection>> {
        if self.refuse_open.load(Ordering::SeqCst) {
            return Err(DomainError::Connection(format!(
                "could not reach room {}",
                config.meeting_id
            )));
        }

        let connection = Arc::new(LoopbackConnection::new(config));
        self.opened.write().await.push(connection.clone());
        Ok(connection)
    }
}
