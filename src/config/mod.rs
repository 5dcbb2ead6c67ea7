//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/geofence-watch/config.toml

pub mod defaults;

use crate::constants::api::TELEGRAM_API_URL;
use crate::error::{Error, Result};
use crate::geofence::Coordinates;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Geofence target and radius
    #[serde(default)]
    pub geofence: GeofenceConfig,

    /// Position source settings
    #[serde(default)]
    pub tracking: TrackingConfig,

    /// Outgoing relay settings (client side)
    #[serde(default)]
    pub relay: RelayConfig,

    /// Telegram credentials used by the relay server
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Relay server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Map link settings
    #[serde(default)]
    pub url: UrlConfig,
}

/// Geofence target and radius
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeofenceConfig {
    /// Radius in meters
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Target latitude (unset when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_lat: Option<f64>,

    /// Target longitude (unset when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_lng: Option<f64>,
}

/// Position source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Delay between samples in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Random jitter applied to simulated samples, in meters
    #[serde(default = "default_jitter_meters")]
    pub jitter_meters: f64,

    /// Number of steps in a simulated walk
    #[serde(default = "default_steps")]
    pub steps: usize,
}

/// Outgoing relay settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Send transition messages to the relay endpoint
    #[serde(default = "default_relay_enabled")]
    pub enabled: bool,

    /// Relay endpoint accepting `{"text": ...}`
    #[serde(default = "default_relay_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_relay_timeout")]
    pub timeout_secs: u64,
}

/// Telegram Bot API settings for the relay server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,

    /// Bot token
    #[serde(default)]
    pub bot_token: String,

    /// Chat that receives the messages
    #[serde(default)]
    pub chat_id: String,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Map URL settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default URL provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

// Default value functions for serde
fn default_radius() -> f64 {
    DEFAULT_RADIUS_METERS
}
fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}
fn default_jitter_meters() -> f64 {
    DEFAULT_JITTER_METERS
}
fn default_steps() -> usize {
    DEFAULT_SIMULATION_STEPS
}
fn default_relay_enabled() -> bool {
    DEFAULT_RELAY_ENABLED
}
fn default_relay_url() -> String {
    DEFAULT_RELAY_URL.to_string()
}
fn default_relay_timeout() -> u64 {
    DEFAULT_RELAY_TIMEOUT_SECS
}
fn default_telegram_api_url() -> String {
    TELEGRAM_API_URL.to_string()
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/@{lat},{lng},15z".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/#map=18/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?ll={lat},{lng}".to_string(),
    );
    providers
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            target_lat: None,
            target_lng: None,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            jitter_meters: default_jitter_meters(),
            steps: default_steps(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            enabled: default_relay_enabled(),
            url: default_relay_url(),
            timeout_secs: default_relay_timeout(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: default_telegram_api_url(),
            bot_token: String::new(),
            chat_id: String::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Writes a default config there first if none exists
    pub fn load() -> Result<Self> {
        Self::load_or_init(&Self::config_path()?)
    }

    /// Load configuration from `path`, creating it with defaults if missing
    pub fn load_or_init(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse {}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let config = Config::default();
                config.save_to(path)?;
                Ok(config)
            }
            Err(e) => Err(Error::Config(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| {
                Error::Config(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write {}: {}", path.display(), e)))
    }

    /// The configured geofence target, if both halves are set
    pub fn target(&self) -> Option<Coordinates> {
        match (self.geofence.target_lat, self.geofence.target_lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        }
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geofence", "radius"] => Some(self.geofence.radius.to_string()),
            ["geofence", "target_lat"] => Some(optional_to_string(self.geofence.target_lat)),
            ["geofence", "target_lng"] => Some(optional_to_string(self.geofence.target_lng)),

            ["tracking", "interval_ms"] => Some(self.tracking.interval_ms.to_string()),
            ["tracking", "jitter_meters"] => Some(self.tracking.jitter_meters.to_string()),
            ["tracking", "steps"] => Some(self.tracking.steps.to_string()),

            ["relay", "enabled"] => Some(self.relay.enabled.to_string()),
            ["relay", "url"] => Some(self.relay.url.clone()),
            ["relay", "timeout_secs"] => Some(self.relay.timeout_secs.to_string()),

            ["telegram", "api_url"] => Some(self.telegram.api_url.clone()),
            ["telegram", "bot_token"] => Some(masked_secret(&self.telegram.bot_token)),
            ["telegram", "chat_id"] => Some(self.telegram.chat_id.clone()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["url", "default"] => Some(self.url.default.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["geofence", "radius"] => {
                let radius: f64 = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid radius value: {}", value))
                })?;
                crate::geofence::validate_radius(radius)
                    .map_err(|e| Error::Config(e.to_string()))?;
                self.geofence.radius = radius;
            }
            ["geofence", "target_lat"] => {
                self.geofence.target_lat = parse_optional(value, "latitude")?;
            }
            ["geofence", "target_lng"] => {
                self.geofence.target_lng = parse_optional(value, "longitude")?;
            }

            ["tracking", "interval_ms"] => {
                self.tracking.interval_ms = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid interval value: {}", value))
                })?;
            }
            ["tracking", "jitter_meters"] => {
                self.tracking.jitter_meters = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid jitter value: {}", value))
                })?;
            }
            ["tracking", "steps"] => {
                self.tracking.steps = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid steps value: {}", value))
                })?;
            }

            ["relay", "enabled"] => {
                self.relay.enabled = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid boolean value: {}", value))
                })?;
            }
            ["relay", "url"] => {
                self.relay.url = value.to_string();
            }
            ["relay", "timeout_secs"] => {
                self.relay.timeout_secs = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid timeout value: {}", value))
                })?;
            }

            ["telegram", "api_url"] => {
                self.telegram.api_url = value.to_string();
            }
            ["telegram", "bot_token"] => {
                self.telegram.bot_token = value.to_string();
            }
            ["telegram", "chat_id"] => {
                self.telegram.chat_id = value.to_string();
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value.parse().map_err(|_| {
                    Error::Config(format!("Invalid port value: {}", value))
                })?;
            }

            ["url", "default"] => {
                self.url.default = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "geofence.radius",
            "geofence.target_lat",
            "geofence.target_lng",
            "tracking.interval_ms",
            "tracking.jitter_meters",
            "tracking.steps",
            "relay.enabled",
            "relay.url",
            "relay.timeout_secs",
            "telegram.api_url",
            "telegram.bot_token",
            "telegram.chat_id",
            "server.host",
            "server.port",
            "url.default",
        ]
    }

    /// Format a map URL using the specified provider
    ///
    /// Replaces {lat} and {lng} placeholders with actual values
    pub fn format_url(&self, provider: Option<&str>, lat: f64, lng: f64) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self.url.providers.get(provider_name).ok_or_else(|| {
            Error::Config(format!("Unknown URL provider: {}", provider_name))
        })?;

        Ok(template
            .replace("{lat}", &lat.to_string())
            .replace("{lng}", &lng.to_string()))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Hide a secret, showing only whether it is set
pub fn masked_secret(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "***".to_string()
    }
}

fn optional_to_string(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Parse an optional float; empty string or "none" clears the value
fn parse_optional(value: &str, what: &str) -> Result<Option<f64>> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| Error::Config(format!("Invalid {} value: {}", what, value)))
}
