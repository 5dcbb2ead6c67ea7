//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod check;
pub mod config;
pub mod serve;
pub mod watch;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geo::{get_geocoder, Geocoder};
use crate::geofence::{validate_radius, Coordinates};
use clap::{Args, Parser, Subcommand};

/// Geofence transition detector
#[derive(Parser)]
#[command(name = "geofence-watch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Track a position source against a geofence
    Watch(watch::WatchArgs),

    /// Check a single position against a geofence
    Check(check::CheckArgs),

    /// Start the notification relay server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Where the geofence is and how big it is
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Target latitude
    #[arg(long, allow_negative_numbers = true, requires = "lng")]
    pub lat: Option<f64>,

    /// Target longitude
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lng: Option<f64>,

    /// Target place name (geocoded)
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    pub target_place: Option<String>,

    /// Geofence radius in meters
    #[arg(long, short = 'r')]
    pub radius: Option<f64>,
}

impl TargetArgs {
    /// Resolve the target center: flags first, then place name, then config
    pub async fn center(&self, config: &Config) -> Result<Coordinates> {
        let center = if let (Some(lat), Some(lng)) = (self.lat, self.lng) {
            Coordinates::new(lat, lng)
        } else if let Some(query) = &self.target_place {
            let geocoder = get_geocoder()?;
            match geocoder.geocode(query).await? {
                Some(place) => {
                    eprintln!("Geocoded to: {}", place.display_name);
                    place.coords
                }
                None => {
                    return Err(Error::Geocoding(format!("Could not geocode '{}'", query)));
                }
            }
        } else if let Some(target) = config.target() {
            target
        } else {
            return Err(Error::Config(
                "No geofence target: pass --lat/--lng or --target-place, \
                 or set geofence.target_lat and geofence.target_lng"
                    .to_string(),
            ));
        };

        center.validate()?;
        Ok(center)
    }

    /// The radius to use: flag, else config
    pub fn radius(&self, config: &Config) -> Result<f64> {
        let radius = self.radius.unwrap_or(config.geofence.radius);
        validate_radius(radius)?;
        Ok(radius)
    }
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch(args) => watch::run(args).await,
        Commands::Check(args) => check::run(args).await,
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}
