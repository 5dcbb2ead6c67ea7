//! Centralized constants for the geofence-watch crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in meters
    pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

    /// Meters per degree of latitude (approximate, varies slightly with latitude)
    pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;
}

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// Telegram Bot API base URL
    pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

    /// Path the relay server accepts messages on
    pub const RELAY_PATH: &str = "/api/geofence";
}

/// Relay server messages
pub mod relay {
    /// Returned when a relay request has no text
    pub const TEXT_REQUIRED: &str = "Text message is required in the request body.";

    /// Returned when the upstream chat API could not be reached
    pub const UPSTREAM_UNREACHABLE: &str =
        "Internal server error while sending Telegram message.";

    /// Returned on a successful relay
    pub const SENT: &str = "Notification sent!";

    /// Parse mode forwarded to Telegram
    pub const PARSE_MODE: &str = "Markdown";
}
