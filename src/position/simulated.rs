//! Simulated walk
//!
//! Moves in a straight line (in lat/lng space) from a start to an end
//! coordinate in a fixed number of steps. Each fix can be blurred by random
//! jitter uniformly distributed within a circle, the way a real receiver
//! wanders around the true position.

use crate::constants::geo::METERS_PER_DEGREE_LAT;
use crate::error::Result;
use crate::geofence::Coordinates;
use crate::position::{now_ms, Emitter, PositionEvent, PositionSource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// A simulated walk between two points
#[derive(Debug)]
pub struct SimulatedSource {
    from: Coordinates,
    to: Coordinates,
    steps: usize,
    interval: Duration,
    jitter_meters: f64,
    seed: Option<u64>,
    failure: Option<(usize, String)>,
    emitter: Emitter,
}

impl SimulatedSource {
    /// Walk from `from` to `to` in `steps` steps (emitting `steps + 1` fixes)
    pub fn new(from: Coordinates, to: Coordinates, steps: usize, interval: Duration) -> Self {
        Self {
            from,
            to,
            steps,
            interval,
            jitter_meters: 0.0,
            seed: None,
            failure: None,
            emitter: Emitter::default(),
        }
    }

    /// Blur every fix by up to `meters`
    pub fn with_jitter(mut self, meters: f64) -> Self {
        self.jitter_meters = meters.max(0.0);
        self
    }

    /// Make the jitter reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the walk after `fixes` fixes with a single error event
    pub fn with_failure_after(mut self, fixes: usize, message: impl Into<String>) -> Self {
        self.failure = Some((fixes, message.into()));
        self
    }

    /// The positions this walk visits, jitter applied
    pub fn path(&self) -> Vec<Coordinates> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let steps = self.steps.max(1);
        (0..=steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                let exact = Coordinates::new(
                    self.from.lat + (self.to.lat - self.from.lat) * t,
                    self.from.lng + (self.to.lng - self.from.lng) * t,
                );
                jitter(exact, self.jitter_meters, &mut rng)
            })
            .collect()
    }

    fn events(&self) -> Vec<PositionEvent> {
        let start_ms = now_ms();
        let step_ms = self.interval.as_millis() as i64;

        let mut events: Vec<PositionEvent> = self
            .path()
            .into_iter()
            .enumerate()
            .map(|(i, p)| PositionEvent::Sample {
                latitude: p.lat,
                longitude: p.lng,
                timestamp_ms: start_ms + step_ms * i as i64,
            })
            .collect();

        if let Some((fixes, message)) = &self.failure {
            events.truncate(*fixes);
            events.push(PositionEvent::error(message.clone()));
        }
        events
    }
}

/// Offset a point by a random vector of length at most `radius_meters`
///
/// Uses sqrt() on the radius so offsets are uniform over the disk area.
fn jitter(center: Coordinates, radius_meters: f64, rng: &mut StdRng) -> Coordinates {
    if radius_meters <= 0.0 {
        return center;
    }

    let r = radius_meters * rng.gen::<f64>().sqrt();
    let theta = 2.0 * PI * rng.gen::<f64>();

    let meters_per_deg_lng = METERS_PER_DEGREE_LAT * center.lat.to_radians().cos();
    let delta_lat = (r * theta.cos()) / METERS_PER_DEGREE_LAT;
    let delta_lng = if meters_per_deg_lng.abs() > f64::EPSILON {
        (r * theta.sin()) / meters_per_deg_lng
    } else {
        0.0
    };

    Coordinates::new(center.lat + delta_lat, center.lng + delta_lng)
}

impl PositionSource for SimulatedSource {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn start(&mut self, tx: mpsc::Sender<PositionEvent>) -> Result<()> {
        let events = self.events();
        if self.emitter.start(events, self.interval, tx) {
            info!(
                from = %self.from,
                to = %self.to,
                steps = self.steps,
                "Simulated walk started"
            );
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
    use crate::geofence::haversine_distance;
    use approx::assert_relative_eq;

    #[test]
    fn test_path_endpoints() {
        let from = Coordinates::new(0.0, 0.0);
        let to = Coordinates::new(0.02, 0.01);
        let source = SimulatedSource::new(from, to, 4, Duration::ZERO);

        let path = source.path();
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], from);
        assert_relative_eq!(path[4].lat, to.lat, epsilon = 1e-12);
        assert_relative_eq!(path[4].lng, to.lng, epsilon = 1e-12);
        assert_relative_eq!(path[2].lat, 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_steps_still_reaches_end() {
        let source = SimulatedSource::new(
            Coordinates::new(1.0, 1.0),
            Coordinates::new(2.0, 2.0),
            0,
            Duration::ZERO,
        );
        assert_eq!(source.path().len(), 2);
    }

    #[test]
    fn test_jitter_stays_within_radius() {
        let center = Coordinates::new(40.7128, -74.0060);
        let source = SimulatedSource::new(center, center, 200, Duration::ZERO)
            .with_jitter(25.0)
            .with_seed(42);

        for p in source.path() {
            let d = haversine_distance(center, p);
            // Flat-earth offsets vs haversine: allow 1%
            assert!(d <= 25.0 * 1.01, "jittered point {} m away", d);
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let center = Coordinates::new(0.0, 0.0);
        let a = SimulatedSource::new(center, center, 10, Duration::ZERO)
            .with_jitter(50.0)
            .with_seed(7);
        let b = SimulatedSource::new(center, center, 10, Duration::ZERO)
            .with_jitter(50.0)
            .with_seed(7);
        assert_eq!(a.path(), b.path());
    }

    #[test]
    fn test_failure_replaces_tail() {
        let source = SimulatedSource::new(
            Coordinates::new(0.0, 0.0),
            Coordinates::new(1.0, 0.0),
            10,
            Duration::from_millis(100),
        )
        .with_failure_after(3, "Position unavailable");

        let events = source.events();
        assert_eq!(events.len(), 4);
        assert_eq!(events[3], PositionEvent::error("Position unavailable"));
        match (&events[0], &events[1]) {
            (
                PositionEvent::Sample { timestamp_ms: t0, .. },
                PositionEvent::Sample { timestamp_ms: t1, .. },
            ) => assert_eq!(t1 - t0, 100),
            other => panic!("expected samples, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_emits_every_fix() {
        let (tx, mut rx) = mpsc::channel(32);
        let mut source = SimulatedSource::new(
            Coordinates::new(0.0, 0.0),
            Coordinates::new(0.01, 0.0),
            5,
            Duration::from_millis(1),
        );
        source.start(tx).unwrap();

        let mut count = 0;
        while let Some(event) = rx.recv().await {
            assert!(matches!(event, PositionEvent::Sample { .. }));
            count += 1;
        }
        assert_eq!(count, 6);
    }
}
