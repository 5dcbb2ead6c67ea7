//! Geofence transition detection
//!
//! The tracker keeps two flags. `membership` is the ground truth of the last
//! evaluation and drives transition detection on later calls. `notified`
//! records what was last announced so that two evaluations in a row from the
//! `Unknown` state (right after a reset) cannot both announce the same side.

use crate::config::defaults::DEFAULT_RADIUS_METERS;
use crate::geofence::distance::distance_meters;
use crate::geofence::{
    Coordinates, Fix, MembershipState, NotifiedState, TransitionEvent, TransitionKind,
};
use tracing::debug;

/// Stateful geofence membership tracker
///
/// Owns the target, radius and transition flags. All mutation goes through
/// `&mut self`, so a single evaluation is never observed half-applied.
#[derive(Debug, Clone)]
pub struct GeofenceTracker {
    target: Option<Coordinates>,
    radius: f64,
    membership: MembershipState,
    notified: NotifiedState,
    previous_target: Option<Coordinates>,
}

impl GeofenceTracker {
    /// Create a tracker with no target and the default radius
    pub fn new() -> Self {
        Self::with_radius(DEFAULT_RADIUS_METERS)
    }

    /// Create a tracker with no target and the given radius in meters
    pub fn with_radius(radius: f64) -> Self {
        Self {
            target: None,
            radius,
            membership: MembershipState::Unknown,
            notified: NotifiedState::None,
            previous_target: None,
        }
    }

    pub fn target(&self) -> Option<Coordinates> {
        self.target
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn membership(&self) -> MembershipState {
        self.membership
    }

    pub fn notified(&self) -> NotifiedState {
        self.notified
    }

    /// Set the target center
    ///
    /// Setting the same coordinates again is a no-op and keeps the current
    /// membership and notification state. Coordinates are not validated;
    /// rejecting non-finite values is up to the host.
    pub fn set_target(&mut self, lat: f64, lng: f64) {
        let target = Coordinates::new(lat, lng);
        self.target = Some(target);
        self.sync_previous_target(target);
    }

    /// Remove the target; membership becomes unknown
    pub fn clear_target(&mut self) {
        self.target = None;
        self.reset();
    }

    /// Change the radius in meters
    ///
    /// Takes effect on the next check. Membership and notification state are
    /// left alone, so a radius change by itself never announces anything until
    /// the next position is evaluated.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
    }

    /// Evaluate a position and return the transition it causes, if any
    pub fn check_position(&mut self, lat: f64, lng: f64) -> Option<TransitionEvent> {
        self.evaluate(lat, lng).and_then(|fix| fix.event)
    }

    /// Evaluate a position against the target
    ///
    /// Returns `None` when no target is set. Otherwise returns the distances
    /// and side of the boundary, plus the transition event when one is due.
    pub fn evaluate(&mut self, lat: f64, lng: f64) -> Option<Fix> {
        let Some(target) = self.target else {
            self.reset();
            return None;
        };

        self.sync_previous_target(target);

        let distance = distance_meters(lat, lng, target.lat, target.lng);
        let distance_to_edge = distance - self.radius;
        let inside = distance <= self.radius;

        let kind = if inside {
            let due = self.membership == MembershipState::Outside
                || (self.membership == MembershipState::Unknown
                    && self.notified != NotifiedState::NotifiedInside);
            if due {
                self.notified = NotifiedState::NotifiedInside;
                Some(TransitionKind::Entered)
            } else {
                None
            }
        } else {
            let due = self.membership == MembershipState::Inside
                || (self.membership == MembershipState::Unknown
                    && self.notified != NotifiedState::NotifiedOutside);
            if due {
                self.notified = NotifiedState::NotifiedOutside;
                Some(TransitionKind::Exited)
            } else {
                None
            }
        };

        self.membership = if inside {
            MembershipState::Inside
        } else {
            MembershipState::Outside
        };

        let event = kind.map(|kind| {
            debug!(%kind, distance, radius = self.radius, "geofence transition");
            TransitionEvent {
                kind,
                distance_to_center: distance,
                distance_to_edge,
                latitude: lat,
                longitude: lng,
            }
        });

        Some(Fix {
            distance_to_center: distance,
            distance_to_edge,
            inside,
            event,
        })
    }

    /// Reset the flags if `target` differs from the last one seen
    fn sync_previous_target(&mut self, target: Coordinates) {
        if !self.previous_target.is_some_and(|prev| same_point(prev, target)) {
            self.reset();
            self.previous_target = Some(target);
        }
    }

    fn reset(&mut self) {
        self.membership = MembershipState::Unknown;
        self.notified = NotifiedState::None;
    }
}

/// Coordinate equality where a NaN matches an identical NaN
fn same_point(a: Coordinates, b: Coordinates) -> bool {
    let same = |x: f64, y: f64| x == y || x.to_bits() == y.to_bits();
    same(a.lat, b.lat) && same(a.lng, b.lng)
}

impl Default for GeofenceTracker {
    fn default() -> Self {
        Self::new()
    }
}
