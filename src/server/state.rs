//! Server shared state
//!
//! Holds the Telegram client for the relay server.

use crate::config::Config;
use crate::error::Result;
use crate::relay::telegram::TelegramClient;
use std::time::Instant;

/// Shared state for the HTTP server
pub struct AppState {
    /// Client for the upstream chat API
    pub telegram: TelegramClient,

    /// When the server started
    started_at: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(config: &Config) -> Result<Self> {
        let telegram = TelegramClient::from_config(&config.telegram)?;
        Ok(Self {
            telegram,
            started_at: Instant::now(),
        })
    }

    /// Seconds since the state was created
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
