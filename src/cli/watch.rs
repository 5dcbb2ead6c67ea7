//! Watch command handler
//!
//! Feeds a position source through the geofence monitor until the source
//! ends, fails, or Ctrl-C is pressed.

use crate::cli::TargetArgs;
use crate::config::Config;
use crate::constants::geo::METERS_PER_DEGREE_LAT;
use crate::error::{Error, Result};
use crate::geofence::{Coordinates, GeofenceTracker};
use crate::map::{HeadlessMap, LinkMap, MapSink};
use crate::monitor::Monitor;
use crate::notify::TerminalToasts;
use crate::position::replay::ReplaySource;
use crate::position::simulated::SimulatedSource;
use crate::position::PositionSource;
use crate::relay::HttpRelay;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Watch command arguments
#[derive(Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Replay newline-delimited JSON position events from a file
    #[arg(long, conflicts_with = "simulate")]
    pub replay: Option<PathBuf>,

    /// Simulate a straight walk (defaults to crossing the geofence north to south)
    #[arg(long)]
    pub simulate: bool,

    /// Walk start latitude
    #[arg(long, requires_all = ["simulate", "from_lng"], allow_negative_numbers = true)]
    pub from_lat: Option<f64>,

    /// Walk start longitude
    #[arg(long, requires_all = ["simulate", "from_lat"], allow_negative_numbers = true)]
    pub from_lng: Option<f64>,

    /// Walk end latitude
    #[arg(long, requires_all = ["simulate", "to_lng"], allow_negative_numbers = true)]
    pub to_lat: Option<f64>,

    /// Walk end longitude
    #[arg(long, requires_all = ["simulate", "to_lat"], allow_negative_numbers = true)]
    pub to_lng: Option<f64>,

    /// Number of steps in the simulated walk
    #[arg(long, requires = "simulate")]
    pub steps: Option<usize>,

    /// Random position error in meters for the simulated walk
    #[arg(long, requires = "simulate")]
    pub jitter: Option<f64>,

    /// Seed for reproducible jitter
    #[arg(long, requires = "simulate")]
    pub seed: Option<u64>,

    /// Milliseconds between position fixes
    #[arg(long, short = 'i')]
    pub interval_ms: Option<u64>,

    /// Log map links for the target and each fix (optionally naming a URL provider)
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    pub map: Option<String>,

    /// Relay transitions to a chat through the relay endpoint
    #[arg(long)]
    pub relay: bool,

    /// Relay endpoint URL (overrides relay.url)
    #[arg(long)]
    pub relay_url: Option<String>,
}

/// Run the watch command
pub async fn run(args: WatchArgs) -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = Config::load()?;
    if let Some(url) = &args.relay_url {
        config.relay.url = url.clone();
    }

    let center = args.target.center(&config).await?;
    let radius = args.target.radius(&config)?;
    let interval =
        Duration::from_millis(args.interval_ms.unwrap_or(config.tracking.interval_ms));

    let mut source = build_source(&args, &config, center, radius, interval)?;
    let map = build_map(&args, &config)?;

    let mut monitor = Monitor::new(
        GeofenceTracker::with_radius(radius),
        Arc::new(TerminalToasts),
        map,
    );
    if args.relay || config.relay.enabled {
        let relay = HttpRelay::from_config(&config.relay)?;
        info!(url = relay.url(), "Relaying transitions");
        monitor = monitor.with_relay(relay);
    }
    monitor.set_target(center.lat, center.lng);

    info!(
        "Watching geofence at {} (radius {} m) using {} positions",
        center,
        radius,
        source.name()
    );

    monitor.run(source.as_mut(), shutdown_signal()).await
}

/// Pick the position source from the arguments
fn build_source(
    args: &WatchArgs,
    config: &Config,
    center: Coordinates,
    radius: f64,
    interval: Duration,
) -> Result<Box<dyn PositionSource>> {
    if let Some(path) = &args.replay {
        return Ok(Box::new(ReplaySource::from_path(path, interval)?));
    }

    if !args.simulate {
        return Err(Error::Config(
            "No position source: pass --replay <FILE> or --simulate".to_string(),
        ));
    }

    let (default_from, default_to) = crossing_walk(center, radius);
    let from = match (args.from_lat, args.from_lng) {
        (Some(lat), Some(lng)) => Coordinates::new(lat, lng),
        _ => default_from,
    };
    let to = match (args.to_lat, args.to_lng) {
        (Some(lat), Some(lng)) => Coordinates::new(lat, lng),
        _ => default_to,
    };
    from.validate()?;
    to.validate()?;

    let steps = args.steps.unwrap_or(config.tracking.steps);
    let jitter = args.jitter.unwrap_or(config.tracking.jitter_meters);

    let mut source = SimulatedSource::new(from, to, steps, interval).with_jitter(jitter);
    if let Some(seed) = args.seed {
        source = source.with_seed(seed);
    }
    Ok(Box::new(source))
}

/// A walk from two radii north of the center to two radii south of it
///
/// Latitudes are clamped so the walk stays on the map near the poles.
fn crossing_walk(center: Coordinates, radius: f64) -> (Coordinates, Coordinates) {
    let offset = 2.0 * radius / METERS_PER_DEGREE_LAT;
    (
        Coordinates::new((center.lat + offset).min(90.0), center.lng),
        Coordinates::new((center.lat - offset).max(-90.0), center.lng),
    )
}

fn build_map(args: &WatchArgs, config: &Config) -> Result<Box<dyn MapSink>> {
    match &args.map {
        None => Ok(Box::new(HeadlessMap)),
        Some(provider) => {
            let provider = (!provider.is_empty()).then(|| provider.clone());
            Ok(Box::new(LinkMap::new(config.clone(), provider)?))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler, track until the source ends
        warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
