//! Error types for geofence-watch

use thiserror::Error;

/// Main error type for geofence-watch operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid radius: {0}")]
    InvalidRadius(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Position source error: {0}")]
    Position(String),

    /// The remote relay rejected or never received a message
    #[error("Relay error{}: {message}", status_suffix(.status))]
    Relay {
        status: Option<u16>,
        message: String,
    },
}

impl Error {
    /// Shorthand for a relay failure that has no HTTP status (transport errors)
    pub fn relay(message: impl Into<String>) -> Self {
        Self::Relay {
            status: None,
            message: message.into(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {})", code),
        None => String::new(),
    }
}

/// Result type alias for geofence-watch operations
pub type Result<T> = std::result::Result<T, Error>;
