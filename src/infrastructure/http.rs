//! Shared HTTP client setup

use crate::config::HttpConfig;
use crate::domain::shared::error::{DomainError, Result};
use std::time::Duration;
use url::Url;

/// Build the reqwest client shared by every adapter
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .user_agent(concat!("telecall/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DomainError::Configuration(format!("HTTP client: {}", e)))
}

/// Resolve `path` under `base`, treating `base` as a directory even when it
/// lacks a trailing slash.
pub fn endpoint(base: &Url, path: &str) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let dir = format!("{}/", base.path());
        base.set_path(&dir);
    }
    base.join(path)
        .map_err(|e| DomainError::Configuration(format!("invalid endpoint {}: {}", path, e)))
}
