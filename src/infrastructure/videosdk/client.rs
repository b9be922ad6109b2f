//! Room-creation client for the meeting provider's REST API

use crate::domain::meeting::RoomProvisioner;
use crate::domain::shared::error::{DomainError, Result};
use crate::domain::shared::value_objects::RoomId;
use crate::infrastructure::http::endpoint;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::{debug, error};
use url::Url;

const ROOMS_PATH: &str = "v2/rooms";

#[derive(Debug, Deserialize)]
struct CreateRoomResponse {
    #[serde(rename = "roomId")]
    room_id: Option<String>,
}

pub struct VideoSdkClient {
    http: reqwest::Client,
    rooms_url: Url,
    token: String,
}

impl VideoSdkClient {
    pub fn new(http: reqwest::Client, api_base: &Url, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http,
            rooms_url: endpoint(api_base, ROOMS_PATH)?,
            token: token.into(),
        })
    }
}

#[async_trait]
impl RoomProvisioner for VideoSdkClient {
    async fn create_room(&self) -> Result<RoomId> {
        debug!("POST {}", self.rooms_url);

        // The provider expects the raw token, no scheme prefix
        let response = self
            .http
            .post(self.rooms_url.clone())
            .header(AUTHORIZATION, self.token.as_str())
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| DomainError::RoomCreation(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Room creation rejected with {}: {}", status, body);
            return Err(DomainError::RoomCreation(format!(
                "provider returned {}",
                status
            )));
        }

        let body: CreateRoomResponse = response
            .json()
            .await
            .map_err(|e| DomainError::RoomCreation(format!("malformed response: {}", e)))?;

        match body.room_id {
            Some(room_id) if !room_id.is_empty() => Ok(RoomId::new(room_id)),
            _ => Err(DomainError::RoomCreation(
                "response carried no roomId".to_string(),
            )),
        }
    }
}
