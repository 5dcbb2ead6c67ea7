//! Great-circle distance
//!
//! Haversine formula on a spherical Earth. Inputs are degrees and are not
//! range-checked; out-of-range values produce a defined but meaningless result.

use crate::constants::geo::EARTH_RADIUS_METERS;
use crate::geofence::Coordinates;

/// Calculate the distance between two lat/lng pairs in meters (Haversine formula)
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding near antipodes, or nonsense input, can push `a` outside [0, 1]
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Distance between two coordinates in meters
pub fn haversine_distance(p1: Coordinates, p2: Coordinates) -> f64 {
    distance_meters(p1.lat, p1.lng, p2.lat, p2.lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(distance_meters(10.0, 10.0, 10.0, 10.0), 0.0);
    }

    #[test]
    fn test_one_degree_latitude() {
        // NYC to a point one degree north (~111 km)
        let distance = distance_meters(40.7128, -74.0060, 41.7128, -74.0060);
        assert!(
            (distance - 111_195.0).abs() < 10.0,
            "Distance {} should be approximately 111195",
            distance
        );
    }

    #[test]
    fn test_hundredth_degree_at_equator() {
        let distance = distance_meters(0.01, 0.0, 0.0, 0.0);
        assert_relative_eq!(distance, 1111.95, epsilon = 0.1);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [
            (40.7128, -74.0060, 51.5074, -0.1278),
            (-33.8688, 151.2093, 35.6762, 139.6503),
            (0.0, 179.9, 0.0, -179.9),
            (89.9, 0.0, -89.9, 180.0),
        ];
        for (a_lat, a_lng, b_lat, b_lng) in pairs {
            let ab = distance_meters(a_lat, a_lng, b_lat, b_lng);
            let ba = distance_meters(b_lat, b_lng, a_lat, a_lng);
            assert_relative_eq!(ab, ba, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_antimeridian_is_short() {
        // 0.2 degrees of longitude across the antimeridian, not 359.8
        let distance = distance_meters(0.0, 179.9, 0.0, -179.9);
        assert!(distance < 25_000.0, "got {}", distance);
    }

    #[test]
    fn test_out_of_range_does_not_panic() {
        let distance = distance_meters(200.0, 400.0, -300.0, 1000.0);
        assert!(distance.is_finite());
    }

    #[test]
    fn test_coordinates_wrapper() {
        let a = Coordinates::new(10.0, 10.0);
        let b = Coordinates::new(20.0, 20.0);
        assert_eq!(haversine_distance(a, b), distance_meters(10.0, 10.0, 20.0, 20.0));
    }
}
