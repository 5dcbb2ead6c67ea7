//! Map rendering sinks
//!
//! A map is purely presentational: it is told where the target circle and the
//! user are. Tracking works the same with or without one.

use crate::config::Config;
use crate::error::Result;
use tracing::info;

/// Something that draws the geofence and the user's position
pub trait MapSink: Send {
    /// Draw (or move) the target circle
    fn set_target(&mut self, lat: f64, lng: f64, radius_meters: f64);

    /// Draw (or move) the user marker
    fn set_user_position(&mut self, lat: f64, lng: f64);
}

/// No map at all
#[derive(Debug, Default)]
pub struct HeadlessMap;

impl MapSink for HeadlessMap {
    fn set_target(&mut self, _lat: f64, _lng: f64, _radius_meters: f64) {}

    fn set_user_position(&mut self, _lat: f64, _lng: f64) {}
}

/// Logs a map link for every update, using a configured URL provider
#[derive(Debug)]
pub struct LinkMap {
    config: Config,
    provider: Option<String>,
}

impl LinkMap {
    /// Create a link map; fails if the provider is not configured
    pub fn new(config: Config, provider: Option<String>) -> Result<Self> {
        // Surface an unknown provider now rather than on every update
        config.format_url(provider.as_deref(), 0.0, 0.0)?;
        Ok(Self { config, provider })
    }

    fn link(&self, lat: f64, lng: f64) -> Option<String> {
        self.config
            .format_url(self.provider.as_deref(), lat, lng)
            .ok()
    }
}

impl MapSink for LinkMap {
    fn set_target(&mut self, lat: f64, lng: f64, radius_meters: f64) {
        if let Some(url) = self.link(lat, lng) {
            info!(radius = radius_meters, "Geofence target: {}", url);
        }
    }

    fn set_user_position(&mut self, lat: f64, lng: f64) {
        if let Some(url) = self.link(lat, lng) {
            info!("Current position: {}", url);
        }
    }
}
