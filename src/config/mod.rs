//! Configuration management
//!
//! Sources, later ones winning: built-in defaults, an optional
//! `telecall.toml` in the working directory, then `TELECALL_*` environment
//! variables with `__` between nested keys (`TELECALL_MEETING__TOKEN`).

use crate::domain::reconnect::ReconnectPolicy;
use crate::domain::shared::error::{DomainError, Result};
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

const CONFIG_FILE: &str = "telecall";
const ENV_PREFIX: &str = "TELECALL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub meeting: MeetingProviderConfig,
    pub backend: BackendConfig,
    pub http: HttpConfig,
    pub reconnect: ReconnectConfig,
    #[serde(default)]
    pub session: Option<SessionConfig>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct MeetingProviderConfig {
    pub api_base: Url,
    /// Process-wide secret for the room-creation endpoint
    pub token: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub url: Url,
    pub anon_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

/// Call correlation for the headless binary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub appointment_id: String,
    pub record_id: String,
    /// Join this room instead of creating one
    #[serde(default)]
    pub room_code: Option<String>,
}

impl ReconnectConfig {
    pub fn policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

impl fmt::Debug for MeetingProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeetingProviderConfig")
            .field("api_base", &self.api_base.as_str())
            .field("token", &redact(&self.token))
            .finish()
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &redact(&self.anon_key))
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

fn config_error(e: ConfigError) -> DomainError {
    DomainError::Configuration(e.to_string())
}

impl Config {
    /// Load from the default file and the environment
    pub fn load() -> Result<Self> {
        let builder = Self::defaults()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            );
        Self::build(builder)
    }

    /// Load from a TOML document layered over the defaults
    pub fn from_toml(toml: &str) -> Result<Self> {
        let builder = Self::defaults()?.add_source(File::from_str(toml, FileFormat::Toml));
        Self::build(builder)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        config::Config::builder()
            .set_default("meeting.api_base", "https://api.videosdk.live/")
            .and_then(|b| b.set_default("meeting.token", ""))
            .and_then(|b| b.set_default("backend.url", "http://localhost:54321/"))
            .and_then(|b| b.set_default("backend.anon_key", ""))
            .and_then(|b| b.set_default("http.connect_timeout_secs", 10_i64))
            .and_then(|b| b.set_default("reconnect.max_attempts", 5_i64))
            .and_then(|b| b.set_default("reconnect.base_delay_ms", 500_i64))
            .and_then(|b| b.set_default("reconnect.max_delay_ms", 8000_i64))
            .map_err(config_error)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Config = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.meeting.token.trim().is_empty() {
            return Err(DomainError::Configuration(
                "meeting.token is required".to_string(),
            ));
        }
        if self.reconnect.base_delay_ms > self.reconnect.max_delay_ms {
            return Err(DomainError::Configuration(
                "reconnect.base_delay_ms exceeds reconnect.max_delay_ms".to_string(),
            ));
        }
        if let Some(session) = &self.session {
            if session.appointment_id.is_empty() || session.record_id.is_empty() {
                return Err(DomainError::Configuration(
                    "session.appointment_id and session.record_id must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}
