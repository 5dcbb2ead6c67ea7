//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default geofence radius in meters
pub const DEFAULT_RADIUS_METERS: f64 = 500.0;

/// Default delay between emitted position samples (replay and simulation)
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Default random jitter applied to simulated samples, in meters
pub const DEFAULT_JITTER_METERS: f64 = 0.0;

/// Default number of steps in a simulated walk
pub const DEFAULT_SIMULATION_STEPS: usize = 20;

/// Whether transitions are relayed to the chat endpoint by default
pub const DEFAULT_RELAY_ENABLED: bool = false;

/// Default relay endpoint (the bundled relay server)
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:7879/api/geofence";

/// Default relay request timeout in seconds
pub const DEFAULT_RELAY_TIMEOUT_SECS: u64 = 10;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7879;

/// Default map URL provider
pub const DEFAULT_URL_PROVIDER: &str = "google";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "geofence-watch";
