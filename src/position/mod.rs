//! Position sources
//!
//! A position source pushes `PositionEvent`s into a channel at its own pace
//! until it runs out or is stopped. Starting a running source and stopping a
//! stopped one are both no-ops.
//!
//! ## Flex Point
//! Adding a new source requires:
//! 1. Create `src/position/{source_name}.rs` implementing `PositionSource`
//! 2. Add `pub mod {source_name};` below

pub mod replay;
pub mod simulated;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// One item from a position source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PositionEvent {
    /// A position fix
    Sample {
        latitude: f64,
        longitude: f64,
        #[serde(default = "now_ms")]
        timestamp_ms: i64,
    },
    /// The source failed (permission revoked, sensor lost, bad input, ...)
    Error { message: String },
}

impl PositionEvent {
    /// A sample stamped with the current time
    pub fn sample(latitude: f64, longitude: f64) -> Self {
        Self::Sample {
            latitude,
            longitude,
            timestamp_ms: now_ms(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Trait for position sources
pub trait PositionSource: Send {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Begin emitting events into `tx`; no-op if already running
    fn start(&mut self, tx: mpsc::Sender<PositionEvent>) -> Result<()>;

    /// Stop emitting; no-op if not running
    fn stop(&mut self);

    /// Whether events may still arrive
    fn is_running(&self) -> bool;
}

/// Background task that feeds a fixed list of events into a channel
#[derive(Debug, Default)]
pub(crate) struct Emitter {
    handle: Option<JoinHandle<()>>,
}

impl Emitter {
    pub(crate) fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn the feeding task unless one is already running
    ///
    /// Returns false when the emitter was already running.
    pub(crate) fn start(
        &mut self,
        events: Vec<PositionEvent>,
        interval: Duration,
        tx: mpsc::Sender<PositionEvent>,
    ) -> bool {
        if self.is_running() {
            return false;
        }

        // tokio::time::interval rejects a zero period
        let period = interval.max(Duration::from_millis(1));
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            for event in events {
                ticker.tick().await;
                if tx.send(event).await.is_err() {
                    debug!("Position receiver dropped, stopping emitter");
                    break;
                }
            }
        }));
        true
    }

    pub(crate) fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Emitter {
    fn drop(&mut self) {
        self.stop();
    }
}
