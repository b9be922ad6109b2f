//! Minimal PostgREST client
//!
//! Only exact-match filters on `id` are needed, so the client exposes a
//! request builder per table with the filter and auth headers applied.

use crate::domain::shared::error::Result;
use crate::infrastructure::http::endpoint;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use url::Url;

/// Accept header asking PostgREST for exactly one row as a bare object
pub const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

#[derive(Clone)]
pub struct PostgrestClient {
    http: reqwest::Client,
    rest_url: Url,
    anon_key: String,
}

impl PostgrestClient {
    pub fn new(http: reqwest::Client, project_url: &Url, anon_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http,
            rest_url: endpoint(project_url, "rest/v1/")?,
            anon_key: anon_key.into(),
        })
    }

    /// Request against `table` filtered to the row whose id equals `id`
    pub fn row(&self, method: Method, table: &str, id: &str) -> Result<RequestBuilder> {
        let url = endpoint(&self.rest_url, table)?;
        Ok(self
            .http
            .request(method, url)
            .query(&[("id", format!("eq.{}", id))])
            .header("apikey", self.anon_key.as_str())
            .header(AUTHORIZATION, format!("Bearer {}", self.anon_key)))
    }

    /// Single-row read of `columns`
    pub fn select_one(&self, table: &str, id: &str, columns: &str) -> Result<RequestBuilder> {
        Ok(self
            .row(Method::GET, table, id)?
            .query(&[("select", columns)])
            .header(ACCEPT, SINGLE_OBJECT))
    }

    /// Partial update, no representation returned
    pub fn update(&self, table: &str, id: &str, body: &serde_json::Value) -> Result<RequestBuilder> {
        Ok(self
            .row(Method::PATCH, table, id)?
            .header("Prefer", "return=minimal")
            .json(body))
    }
}
