//! Tracking host
//!
//! The monitor owns the geofence tracker and the sinks around it. It feeds
//! position samples to the tracker one at a time, turns transitions into
//! toasts and relay messages, and reacts to source failures.
//!
//! Relay sends run as background tasks. Their outcome is only ever reported;
//! it never touches tracker state.

use crate::error::Error;
use crate::geofence::{Coordinates, Fix, GeofenceTracker};
use crate::map::MapSink;
use crate::notify::{relay_text, Toast, ToastSink};
use crate::position::{PositionEvent, PositionSource};
use crate::relay::{HttpRelay, RelaySink};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

/// Capacity of the position channel between source and monitor
const POSITION_CHANNEL_CAPACITY: usize = 64;

/// Geofence tracking host
pub struct Monitor<R = HttpRelay> {
    tracker: GeofenceTracker,
    toasts: Arc<dyn ToastSink>,
    map: Box<dyn MapSink>,
    relay: Option<Arc<R>>,
    relays_in_flight: JoinSet<()>,
    last_position: Option<Coordinates>,
}

impl Monitor {
    /// Create a monitor without a relay
    pub fn new(
        tracker: GeofenceTracker,
        toasts: Arc<dyn ToastSink>,
        map: Box<dyn MapSink>,
    ) -> Self {
        Self {
            tracker,
            toasts,
            map,
            relay: None,
            relays_in_flight: JoinSet::new(),
            last_position: None,
        }
    }
}

impl<R: RelaySink + 'static> Monitor<R> {
    /// Relay transition messages through `relay`
    pub fn with_relay<S: RelaySink + 'static>(self, relay: S) -> Monitor<S> {
        Monitor {
            tracker: self.tracker,
            toasts: self.toasts,
            map: self.map,
            relay: Some(Arc::new(relay)),
            relays_in_flight: self.relays_in_flight,
            last_position: self.last_position,
        }
    }

    pub fn tracker(&self) -> &GeofenceTracker {
        &self.tracker
    }

    /// Last position received from the source, if any
    pub fn last_position(&self) -> Option<Coordinates> {
        self.last_position
    }

    /// Move the geofence and re-check the last known position
    pub fn set_target(&mut self, lat: f64, lng: f64) -> Option<Fix> {
        self.tracker.set_target(lat, lng);
        self.map.set_target(lat, lng, self.tracker.radius());
        self.toasts.show(Toast::success(
            "Location Saved!",
            "Geofence location has been updated successfully.",
        ));
        self.recheck()
    }

    /// Remove the geofence
    pub fn clear_target(&mut self) {
        self.tracker.clear_target();
        info!("Geofence not set");
    }

    /// Change the radius and re-check the last known position
    pub fn set_radius(&mut self, radius: f64) -> Option<Fix> {
        self.tracker.set_radius(radius);
        if let Some(target) = self.tracker.target() {
            self.map.set_target(target.lat, target.lng, radius);
        }
        info!("Radius set to {} meters", radius);
        self.recheck()
    }

    /// Evaluate the last known position again, if there is one
    fn recheck(&mut self) -> Option<Fix> {
        let position = self.last_position?;
        self.evaluate(position)
    }

    /// Handle one position sample
    pub fn handle_sample(&mut self, lat: f64, lng: f64) -> Option<Fix> {
        let position = Coordinates::new(lat, lng);
        self.last_position = Some(position);
        self.map.set_user_position(lat, lng);
        self.evaluate(position)
    }

    fn evaluate(&mut self, position: Coordinates) -> Option<Fix> {
        let Some(fix) = self.tracker.evaluate(position.lat, position.lng) else {
            debug!(%position, "No geofence target set, skipping check");
            return None;
        };

        info!(
            "{} at {}. Distance to center: {}m. Distance to edge: {}m",
            if fix.inside { "Inside Radius" } else { "Outside Radius" },
            position,
            fix.distance_to_center.round(),
            fix.distance_to_edge.round()
        );

        if let Some(event) = &fix.event {
            self.toasts.show(Toast::for_transition(event));
            self.dispatch_relay(relay_text(event));
        }

        Some(fix)
    }

    /// Send a message through the relay without waiting for it
    fn dispatch_relay(&mut self, text: String) {
        // Reap tasks that already finished so the set does not grow unbounded
        while self.relays_in_flight.try_join_next().is_some() {}

        let Some(relay) = &self.relay else {
            return;
        };
        let relay = Arc::clone(relay);
        let toasts = Arc::clone(&self.toasts);

        self.relays_in_flight.spawn(async move {
            match relay.send_text(&text).await {
                Ok(ack) => info!(status = ack.status, "Relay notification sent"),
                Err(e) => {
                    warn!(error = %e, "Relay notification failed");
                    toasts.show(relay_failure_toast(&e));
                }
            }
        });
    }

    /// Wait for every relay send started so far
    pub async fn flush_relays(&mut self) {
        while self.relays_in_flight.join_next().await.is_some() {}
    }

    /// Start a source; tells the user if it was already running
    pub fn start_tracking(
        &mut self,
        source: &mut dyn PositionSource,
        tx: mpsc::Sender<PositionEvent>,
    ) -> crate::error::Result<()> {
        if source.is_running() {
            self.toasts.show(Toast::info(
                "Already Tracking",
                "Realtime location tracking is already active.",
            ));
            return Ok(());
        }

        source.start(tx)?;
        self.toasts.show(Toast::success(
            "Tracking Started",
            "Realtime location tracking is now active.",
        ));
        Ok(())
    }

    /// Stop a source; silent if it was not running
    pub fn stop_tracking(&mut self, source: &mut dyn PositionSource) {
        if !source.is_running() {
            return;
        }
        source.stop();
        self.toasts.show(Toast::info(
            "Tracking Stopped",
            "Realtime location tracking has been stopped.",
        ));
    }

    /// Handle a failure reported by the source: stop it and tell the user
    ///
    /// Tracker state is left as it was after the last good sample.
    pub fn handle_source_error(&mut self, source: &mut dyn PositionSource, message: &str) {
        warn!(source = source.name(), "Position source failed: {}", message);
        self.toasts.show(Toast::error("Location Access Failed", message));
        self.stop_tracking(source);
    }

    /// Track positions from `source` until it ends, fails, or `shutdown` resolves
    pub async fn run<F>(
        &mut self,
        source: &mut dyn PositionSource,
        shutdown: F,
    ) -> crate::error::Result<()>
    where
        F: Future<Output = ()>,
    {
        let session = Uuid::new_v4();
        let span = tracing::info_span!("tracking", %session, source = source.name());

        async {
            let (tx, mut rx) = mpsc::channel(POSITION_CHANNEL_CAPACITY);
            if source.is_running() {
                // It feeds some other channel; restart it into ours
                warn!("Position source already running, restarting it");
                source.stop();
            }
            self.start_tracking(source, tx)?;
            tokio::pin!(shutdown);

            loop {
                tokio::select! {
                    event = rx.recv() => match event {
                        Some(PositionEvent::Sample { latitude, longitude, timestamp_ms }) => {
                            debug!(timestamp_ms, "Position sample");
                            self.handle_sample(latitude, longitude);
                        }
                        Some(PositionEvent::Error { message }) => {
                            self.handle_source_error(source, &message);
                            break;
                        }
                        None => {
                            info!("Position source finished");
                            break;
                        }
                    },
                    _ = &mut shutdown => {
                        info!("Shutdown requested");
                        self.stop_tracking(source);
                        break;
                    }
                }
            }

            self.flush_relays().await;
            Ok::<(), crate::error::Error>(())
        }
        .instrument(span)
        .await
    }
}

/// Toast for a failed relay send
///
/// A reply with a status was rejected upstream; no status means it never
/// got through.
fn relay_failure_toast(err: &Error) -> Toast {
    let title = match err {
        Error::Relay { status: None, .. } => "Network Error",
        _ => "Telegram Error",
    };
    Toast::error(title, format!("Failed to send notification: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::geofence::{MembershipState, NotifiedState, TransitionKind};
    use crate::map::HeadlessMap;
    use crate::notify::RecordingToasts;
    use crate::position::replay::ReplaySource;
    use crate::relay::Ack;
    use std::future::pending;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Relay that records messages and optionally fails
    #[derive(Default)]
    struct FakeRelay {
        sent: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl RelaySink for FakeRelay {
        async fn send_text(&self, message: &str) -> Result<Ack> {
            self.sent.lock().unwrap().push(message.to_string());
            if self.fail {
                Err(Error::Relay {
                    status: Some(500),
                    message: "boom".to_string(),
                })
            } else {
                Ok(Ack {
                    status: 200,
                    body: None,
                })
            }
        }
    }

    fn monitor(toasts: Arc<RecordingToasts>) -> Monitor {
        let mut tracker = GeofenceTracker::new();
        tracker.set_target(0.0, 0.0);
        Monitor::new(tracker, toasts, Box::new(HeadlessMap))
    }

    fn sample(lat: f64) -> PositionEvent {
        PositionEvent::Sample {
            latitude: lat,
            longitude: 0.0,
            timestamp_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_run_announces_each_transition() {
        let toasts = Arc::new(RecordingToasts::new());
        let sent = Arc::new(Mutex::new(Vec::new()));
        let relay = FakeRelay {
            sent: sent.clone(),
            fail: false,
        };
        let mut monitor = monitor(toasts.clone()).with_relay(relay);

        // out, out, in, in, out
        let mut source = ReplaySource::from_events(
            vec![sample(0.02), sample(0.03), sample(0.0), sample(0.001), sample(0.05)],
            Duration::from_millis(1),
        );
        monitor.run(&mut source, pending()).await.unwrap();

        assert_eq!(
            toasts.titles(),
            vec!["Tracking Started", "Notice", "Welcome!", "Notice"]
        );
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert!(sent[0].contains("EXITED"));
        assert!(sent[1].contains("ENTERED"));
        assert!(sent[2].contains("EXITED"));
    }

    #[tokio::test]
    async fn test_source_error_stops_and_keeps_state() {
        let toasts = Arc::new(RecordingToasts::new());
        let mut monitor = monitor(toasts.clone());

        let mut source = ReplaySource::from_events(
            vec![
                sample(0.0),
                PositionEvent::error("User denied Geolocation"),
                sample(0.05),
            ],
            Duration::from_millis(1),
        );
        monitor.run(&mut source, pending()).await.unwrap();

        let all = toasts.toasts();
        let failure = all
            .iter()
            .find(|t| t.title == "Location Access Failed")
            .unwrap();
        assert_eq!(failure.body, "User denied Geolocation");
        assert!(!source.is_running());

        // The sample after the error is never applied
        assert_eq!(monitor.tracker().membership(), MembershipState::Inside);
        assert_eq!(monitor.last_position(), Some(Coordinates::new(0.0, 0.0)));
    }

    #[tokio::test]
    async fn test_relay_failure_is_reported_not_rolled_back() {
        let toasts = Arc::new(RecordingToasts::new());
        let relay = FakeRelay {
            sent: Arc::default(),
            fail: true,
        };
        let mut monitor = monitor(toasts.clone()).with_relay(relay);

        let fix = monitor.handle_sample(0.0, 0.0).unwrap();
        assert_eq!(fix.event.map(|e| e.kind), Some(TransitionKind::Entered));
        monitor.flush_relays().await;

        assert_eq!(toasts.titles(), vec!["Welcome!", "Telegram Error"]);
        assert!(toasts.toasts()[1].body.contains("boom"));
        assert_eq!(monitor.tracker().notified(), NotifiedState::NotifiedInside);
        assert_eq!(monitor.tracker().membership(), MembershipState::Inside);
    }

    #[test]
    fn test_radius_change_rechecks_last_position() {
        let toasts = Arc::new(RecordingToasts::new());
        let mut monitor = monitor(toasts.clone());

        // ~778 m north of the target
        let fix = monitor.handle_sample(0.007, 0.0).unwrap();
        assert_eq!(fix.event.map(|e| e.kind), Some(TransitionKind::Exited));

        let fix = monitor.set_radius(1000.0).unwrap();
        assert!(fix.inside);
        assert_eq!(fix.event.map(|e| e.kind), Some(TransitionKind::Entered));
        assert_eq!(toasts.titles(), vec!["Notice", "Welcome!"]);
    }

    #[test]
    fn test_radius_change_without_position_does_nothing() {
        let toasts = Arc::new(RecordingToasts::new());
        let mut monitor = monitor(toasts.clone());
        assert!(monitor.set_radius(10.0).is_none());
        assert!(toasts.toasts().is_empty());
    }

    #[test]
    fn test_target_change_rechecks_last_position() {
        let toasts = Arc::new(RecordingToasts::new());
        let mut monitor = monitor(toasts.clone());

        monitor.handle_sample(10.0, 10.0);
        let fix = monitor.set_target(10.0, 10.0).unwrap();
        assert_eq!(fix.event.map(|e| e.kind), Some(TransitionKind::Entered));
        assert_eq!(toasts.titles(), vec!["Notice", "Location Saved!", "Welcome!"]);
    }

    #[test]
    fn test_unset_target_is_silent() {
        let toasts = Arc::new(RecordingToasts::new());
        let mut monitor = Monitor::new(
            GeofenceTracker::new(),
            toasts.clone(),
            Box::new(HeadlessMap),
        );

        assert!(monitor.handle_sample(1.0, 1.0).is_none());
        assert!(toasts.toasts().is_empty());
        assert_eq!(monitor.tracker().membership(), MembershipState::Unknown);
    }

    #[test]
    fn test_clear_target_forgets_membership() {
        let toasts = Arc::new(RecordingToasts::new());
        let mut monitor = monitor(toasts);
        monitor.handle_sample(0.0, 0.0);
        monitor.clear_target();
        assert_eq!(monitor.tracker().target(), None);
        assert_eq!(monitor.tracker().membership(), MembershipState::Unknown);
    }

    #[tokio::test]
    async fn test_start_and_stop_are_idempotent() {
        let toasts = Arc::new(RecordingToasts::new());
        let mut monitor = monitor(toasts.clone());
        let (tx, _rx) = mpsc::channel(4);

        let mut source = ReplaySource::from_events(vec![sample(0.0); 10], Duration::from_secs(3600));
        monitor.start_tracking(&mut source, tx.clone()).unwrap();
        monitor.start_tracking(&mut source, tx).unwrap();
        monitor.stop_tracking(&mut source);
        monitor.stop_tracking(&mut source);

        assert_eq!(
            toasts.titles(),
            vec!["Tracking Started", "Already Tracking", "Tracking Stopped"]
        );
    }

    #[tokio::test]
    async fn test_run_takes_over_running_source() {
        let toasts = Arc::new(RecordingToasts::new());
        let mut monitor = monitor(toasts.clone());
        let (other_tx, _other_rx) = mpsc::channel(16);

        let mut source = ReplaySource::from_events(vec![sample(0.0); 5], Duration::from_millis(1));
        source.start(other_tx).unwrap();
        assert!(source.is_running());

        monitor.run(&mut source, pending()).await.unwrap();

        assert_eq!(toasts.titles(), vec!["Tracking Started", "Welcome!"]);
        assert_eq!(monitor.tracker().membership(), MembershipState::Inside);
        assert_eq!(monitor.last_position(), Some(Coordinates::new(0.0, 0.0)));
    }

    #[test]
    fn test_relay_failure_toast_titles() {
        let rejected = Error::Relay {
            status: Some(400),
            message: "chat not found".to_string(),
        };
        assert_eq!(relay_failure_toast(&rejected).title, "Telegram Error");
        assert_eq!(
            relay_failure_toast(&Error::relay("connection refused")).title,
            "Network Error"
        );
    }

    #[tokio::test]
    async fn test_shutdown_stops_source() {
        let toasts = Arc::new(RecordingToasts::new());
        let mut monitor = monitor(toasts.clone());
        let mut source = ReplaySource::from_events(vec![sample(0.0); 10], Duration::from_secs(3600));

        monitor.run(&mut source, async {}).await.unwrap();

        assert!(!source.is_running());
        assert_eq!(toasts.titles().last().map(String::as_str), Some("Tracking Stopped"));
    }
}
