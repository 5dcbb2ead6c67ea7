//! Geofence core
//!
//! This module handles:
//! - Great-circle distance between coordinates
//! - Tracking membership of a live position in a circular zone
//! - Deciding when an entered/exited transition is due

pub mod distance;
pub mod tracker;

use serde::{Deserialize, Serialize};

pub use distance::{distance_meters, haversine_distance};
pub use tracker::GeofenceTracker;

/// A geographic coordinate (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// Check a radius supplied by a user before handing it to the tracker
///
/// The tracker itself accepts any value; hosts reject the ones that make no sense.
pub fn validate_radius(radius: f64) -> crate::error::Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(crate::error::Error::InvalidRadius(format!(
            "Radius must be a positive number of meters, got {}",
            radius
        )));
    }
    Ok(())
}

/// Whether the most recent known position is inside the target circle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipState {
    #[default]
    Unknown,
    Inside,
    Outside,
}

/// Which transition was last announced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifiedState {
    #[default]
    None,
    NotifiedInside,
    NotifiedOutside,
}

/// Direction of a zone transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Entered,
    Exited,
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entered => write!(f, "entered"),
            Self::Exited => write!(f, "exited"),
        }
    }
}

/// A zone transition, with enough context for the host to render or relay it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub kind: TransitionKind,
    /// Meters from the position to the target center
    pub distance_to_center: f64,
    /// Meters past the boundary (negative when inside)
    pub distance_to_edge: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Outcome of one membership evaluation against a set target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub distance_to_center: f64,
    pub distance_to_edge: f64,
    pub inside: bool,
    /// Present only when this evaluation crossed (or first observed) the boundary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<TransitionEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_coordinates() {
        assert!(Coordinates::new(40.7128, -74.0060).validate().is_ok());
        assert!(Coordinates::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinates::new(91.0, 0.0).validate().is_err());
        assert!(Coordinates::new(0.0, -180.5).validate().is_err());
    }

    #[test]
    fn test_validate_radius() {
        assert!(validate_radius(500.0).is_ok());
        assert!(validate_radius(0.0).is_err());
        assert!(validate_radius(-1.0).is_err());
        assert!(validate_radius(f64::NAN).is_err());
        assert!(validate_radius(f64::INFINITY).is_err());
    }

    #[test]
    fn test_coordinates_display() {
        let c = Coordinates::new(-6.2, 106.816666);
        assert_eq!(c.to_string(), "-6.200000, 106.816666");
    }

    #[test]
    fn test_event_serialization() {
        let event = TransitionEvent {
            kind: TransitionKind::Entered,
            distance_to_center: 12.0,
            distance_to_edge: -488.0,
            latitude: 1.0,
            longitude: 2.0,
        };
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["kind"], "entered");
        assert_eq!(json["distance_to_edge"], -488.0);
    }
}
