//! HTTP transport for the event-guide backend.
//!
//! The wire contract is deliberately narrow: a GET per table returning a
//! JSON object whose `results` array (when present) holds the table's rows,
//! and a POST for push-token registration. Everything else about the payload
//! is interpreted by the sync engine.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::sync::{FetchRequest, Table, TableResponse};

use super::ApiError;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough to let the
/// next natural cycle retry.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the event-guide backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), table.endpoint())
    }

    /// Fetch one table, returning the parsed payload tagged with the table.
    pub async fn fetch(&self, request: &FetchRequest) -> Result<TableResponse, ApiError> {
        let url = self.table_url(request.table);
        debug!(table = %request.table, %url, "Fetching table");

        let response = self.client.get(&url).send().await?;
        let response = Self::check_response(response).await?;
        let payload: JsonValue = response.json().await?;

        Ok(TableResponse {
            table: request.table,
            payload,
        })
    }

    /// Register the device push token with the backend.
    pub async fn register_push(&self, token: &str) -> Result<(), ApiError> {
        let url = format!("{}/push/registrations", self.base_url.trim_end_matches('/'));
        debug!(%url, "Registering push token");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await?;
        Self::check_response(response).await?;

        Ok(())
    }

    /// Fetch a binary asset (sponsor logo, floor image) as raw bytes.
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.client.get(url).send().await?;
        let response = Self::check_response(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
