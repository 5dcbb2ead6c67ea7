//! Geocoding
//!
//! Resolves place names to coordinates so a geofence can be set by name.

pub mod nominatim;

use crate::error::Result;
use crate::geofence::Coordinates;
use serde::{Deserialize, Serialize};

/// A geocoded place
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Place {
    pub coords: Coordinates,
    /// Display name (address or description)
    pub display_name: String,
}

/// Trait for geocoding backends
pub trait Geocoder: Send + Sync {
    /// Geocode a place name to coordinates
    ///
    /// Returns the best match for the query, or None if not found
    fn geocode(&self, query: &str) -> impl std::future::Future<Output = Result<Option<Place>>> + Send;
}

/// Get the default geocoding backend
pub fn get_geocoder() -> Result<nominatim::NominatimBackend> {
    nominatim::NominatimBackend::new()
}
