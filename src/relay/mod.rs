//! Remote chat relay
//!
//! Sends transition messages as `{"text": ...}` JSON to an HTTP endpoint
//! (normally the bundled relay server, which forwards them to Telegram).
//!
//! ## Flex Point
//! Anything implementing `RelaySink` can receive messages; the monitor only
//! needs `send_text`.

pub mod telegram;

use crate::config::RelayConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Acknowledgement from a relay endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    /// HTTP status returned by the endpoint
    pub status: u16,
    /// Parsed response body, when it was JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// Trait for outgoing text relays
///
/// Failures come back as `Error::Relay`; implementations never panic.
pub trait RelaySink: Send + Sync {
    fn send_text(&self, message: &str) -> impl Future<Output = Result<Ack>> + Send;
}

/// Request body accepted by the relay endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct RelayRequest {
    pub text: String,
}

/// Relay over HTTP POST
#[derive(Debug, Clone)]
pub struct HttpRelay {
    client: reqwest::Client,
    url: String,
}

impl HttpRelay {
    /// Create a relay posting to `url` with the given request timeout
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::relay(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Create a relay from the `[relay]` config section
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        Self::new(config.url.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl RelaySink for HttpRelay {
    async fn send_text(&self, message: &str) -> Result<Ack> {
        debug!(url = %self.url, "Sending relay message");

        let response = self
            .client
            .post(&self.url)
            .json(&RelayRequest {
                text: message.to_string(),
            })
            .send()
            .await
            .map_err(|e| Error::relay(format!("Could not connect to relay: {}", e)))?;

        let status = response.status();
        // Body is informational; a non-JSON body is not a failure by itself
        let body = response.json::<serde_json::Value>().await.ok();

        if status.is_success() {
            return Ok(Ack {
                status: status.as_u16(),
                body,
            });
        }

        let message = body
            .as_ref()
            .and_then(|b| b.get("error"))
            .and_then(|e| e.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });

        Err(Error::Relay {
            status: Some(status.as_u16()),
            message,
        })
    }
}
