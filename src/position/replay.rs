//! Replay of recorded positions
//!
//! Reads newline-delimited JSON position events:
//!
//! ```text
//! {"type": "sample", "latitude": -6.2, "longitude": 106.8, "timestamp_ms": 1700000000000}
//! {"type": "error", "message": "User denied Geolocation"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. A line that does not
//! parse becomes an `Error` event, the same way a real sensor reports a bad fix.

use crate::error::{Error, Result};
use crate::position::{Emitter, PositionEvent, PositionSource};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// Emits a fixed list of recorded events at a steady pace
#[derive(Debug)]
pub struct ReplaySource {
    events: Vec<PositionEvent>,
    interval: Duration,
    emitter: Emitter,
}

impl ReplaySource {
    /// Replay the given events
    pub fn from_events(events: Vec<PositionEvent>, interval: Duration) -> Self {
        Self {
            events,
            interval,
            emitter: Emitter::default(),
        }
    }

    /// Replay events parsed from `content`
    pub fn parse(content: &str, interval: Duration) -> Self {
        Self::from_events(parse_events(content), interval)
    }

    /// Replay events read from a file
    pub fn from_path(path: impl AsRef<Path>, interval: Duration) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Position(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(Self::parse(&content, interval))
    }

    pub fn events(&self) -> &[PositionEvent] {
        &self.events
    }
}

/// Parse newline-delimited JSON events
pub fn parse_events(content: &str) -> Vec<PositionEvent> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line.trim()).unwrap_or_else(|e| {
                PositionEvent::error(format!("Invalid position on line {}: {}", index + 1, e))
            })
        })
        .collect()
}

impl PositionSource for ReplaySource {
    fn name(&self) -> &'static str {
        "replay"
    }

    fn start(&mut self, tx: mpsc::Sender<PositionEvent>) -> Result<()> {
        if self
            .emitter
            .start(self.events.clone(), self.interval, tx)
        {
            info!(events = self.events.len(), "Replay started");
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.emitter.stop();
    }

    fn is_running(&self) -> bool {
        self.emitter.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE_LOG: &str = r#"
# walk into the zone
{"type": "sample", "latitude": 0.02, "longitude": 0.0, "timestamp_ms": 1}
{"type": "sample", "latitude": 0.0, "longitude": 0.0, "timestamp_ms": 2}

not json
{"type": "error", "message": "User denied Geolocation"}
"#;

    #[test]
    fn test_parse_events() {
        let events = parse_events(SAMPLE_LOG);
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[0],
            PositionEvent::Sample {
                latitude: 0.02,
                longitude: 0.0,
                timestamp_ms: 1
            }
        );
        match &events[2] {
            PositionEvent::Error { message } => assert!(message.contains("line 6")),
            other => panic!("expected error, got {:?}", other),
        }
        assert_eq!(events[3], PositionEvent::error("User denied Geolocation"));
    }

    #[test]
    fn test_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE_LOG).unwrap();

        let source = ReplaySource::from_path(file.path(), Duration::from_millis(1)).unwrap();
        assert_eq!(source.events().len(), 4);
    }

    #[test]
    fn test_from_missing_path() {
        let result = ReplaySource::from_path("/definitely/not/here.jsonl", Duration::ZERO);
        assert!(matches!(result, Err(Error::Position(_))));
    }

    #[tokio::test]
    async fn test_replay_emits_in_order() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut source = ReplaySource::parse(SAMPLE_LOG, Duration::ZERO);

        source.start(tx.clone()).unwrap();
        source.start(tx).unwrap();

        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            received.push(event);
        }
        assert_eq!(received, source.events().to_vec());
    }

    #[tokio::test]
    async fn test_stop_before_start_is_noop() {
        let mut source = ReplaySource::from_events(Vec::new(), Duration::ZERO);
        source.stop();
        assert!(!source.is_running());
    }
}
