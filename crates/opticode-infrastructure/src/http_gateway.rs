//! HTTP client for the remote session gateway.

use async_trait::async_trait;
use opticode_core::config::ApiConfig;
use opticode_core::error::{OpticodeError, Result};
use opticode_core::gateway::{CreateSessionRequest, SessionGateway, SessionSummary};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
}

/// `SessionGateway` implementation over the HTTP API.
pub struct HttpSessionGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSessionGateway {
    /// Creates a gateway client from the API configuration.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl SessionGateway for HttpSessionGateway {
    async fn create(&self, request: &CreateSessionRequest) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint("/api/sessions"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OpticodeError::remote_status(
                format!("session create failed: {status}"),
                status.as_u16(),
            ));
        }

        let body: CreateResponse = response.json().await?;
        tracing::info!("created remote session '{}'", body.id);
        Ok(body.id)
    }

    async fn rename(&self, id: &str, name: &str) -> Result<()> {
        let response = self
            .client
            .patch(self.endpoint(&format!("/api/sessions/item/{id}")))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OpticodeError::remote_status(
                format!("session rename failed: {status}"),
                status.as_u16(),
            ));
        }
        Ok(())
    }

    async fn list_by_owner(&self, email: &str) -> Result<Vec<SessionSummary>> {
        let response = self
            .client
            .get(self.endpoint(&format!("/api/sessions/{email}")))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OpticodeError::remote_status(
                format!("session list failed: {status}"),
                status.as_u16(),
            ));
        }

        Ok(response.json().await?)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint(&format!("/api/sessions/delete/{id}")))
            .send()
            .await?;

        let status = response.status();
        // Already deleted counts as success.
        if status.as_u16() == 404 {
            tracing::debug!("remote session '{}' already deleted", id);
            return Ok(());
        }
        if !status.is_success() {
            return Err(OpticodeError::remote_status(
                format!("session delete failed: {status}"),
                status.as_u16(),
            ));
        }
        Ok(())
    }
}
