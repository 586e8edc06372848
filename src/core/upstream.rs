use std::time::Duration;

use media_relay_core::core::error::UpstreamError;
use media_relay_core::models::settings::UpstreamSettings;
use media_relay_core::models::upstream::{UpstreamEnvelope, YouTubeMedia};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::http_client;

/// Client for the third-party extraction API.
pub struct UpstreamClient {
    client: reqwest::Client,
    settings: UpstreamSettings,
}

impl UpstreamClient {
    pub fn new(settings: &UpstreamSettings) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client::build_client(settings)?,
            settings: settings.clone(),
        })
    }

    pub fn settings(&self) -> &UpstreamSettings {
        &self.settings
    }

    pub async fn youtube(
        &self,
        url: &str,
        format: &str,
        budget: Duration,
    ) -> Result<UpstreamEnvelope<YouTubeMedia>, UpstreamError> {
        let endpoint = format!(
            "{}?url={}&format={}",
            self.settings.youtube_endpoint(),
            urlencoding::encode(url),
            urlencoding::encode(format)
        );
        self.get_envelope(&endpoint, budget).await
    }

    /// The all-in-one endpoint. Its `result` stays untyped here; the shape is
    /// decided by the normalizer.
    pub async fn aio(
        &self,
        url: &str,
        budget: Duration,
    ) -> Result<UpstreamEnvelope<Value>, UpstreamError> {
        let endpoint = format!(
            "{}?url={}",
            self.settings.aio_endpoint(),
            urlencoding::encode(url)
        );
        self.get_envelope(&endpoint, budget).await
    }

    async fn get_envelope<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        budget: Duration,
    ) -> Result<UpstreamEnvelope<T>, UpstreamError> {
        tracing::debug!("upstream: GET {}", endpoint);

        let response = self
            .client
            .get(endpoint)
            .timeout(budget)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, budget))?;

        let status = response.status();
        tracing::debug!("upstream: HTTP status {}", status);

        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(e, budget))?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_slice(&body).map_err(|e| {
            tracing::warn!("upstream: JSON parse error: {}", e);
            UpstreamError::InvalidPayload(e.to_string())
        })
    }
}

fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<Value>(body)
        .ok()?
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

pub fn map_reqwest_error(err: reqwest::Error, budget: Duration) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout(budget)
    } else if err.is_connect() || err.is_request() {
        UpstreamError::Transport(err.to_string())
    } else if err.is_decode() || err.is_body() {
        UpstreamError::InvalidPayload(err.to_string())
    } else {
        UpstreamError::Other(err.to_string())
    }
}
