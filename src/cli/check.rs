//! Check command handler
//!
//! Evaluates one position against a geofence and prints the result.

use crate::cli::TargetArgs;
use crate::config::Config;
use crate::error::Result;
use crate::geofence::{Coordinates, Fix, GeofenceTracker};
use crate::notify::relay_text;
use crate::relay::{HttpRelay, RelaySink};
use clap::Args;

/// Check command arguments
#[derive(Args)]
pub struct CheckArgs {
    /// Position latitude
    #[arg(allow_negative_numbers = true)]
    pub latitude: f64,

    /// Position longitude
    #[arg(allow_negative_numbers = true)]
    pub longitude: f64,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Also send the transition message through the relay endpoint
    #[arg(long)]
    pub notify: bool,
}

/// Run the check command
pub async fn run(args: CheckArgs) -> Result<()> {
    let config = Config::load()?;

    let center = args.target.center(&config).await?;
    let radius = args.target.radius(&config)?;
    let position = Coordinates::new(args.latitude, args.longitude);
    position.validate()?;

    let fix = evaluate(center, radius, position);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&fix)?);
    } else {
        print!("{}", render(&fix));
    }

    if args.notify {
        if let Some(event) = &fix.event {
            let relay = HttpRelay::from_config(&config.relay)?;
            let ack = relay.send_text(&relay_text(event)).await?;
            eprintln!("Relayed to {} (status {})", relay.url(), ack.status);
        }
    }

    Ok(())
}

/// Evaluate `position` with a fresh tracker
///
/// A fresh tracker has announced nothing yet, so the result always carries
/// the event the first fix at this position would produce.
fn evaluate(center: Coordinates, radius: f64, position: Coordinates) -> Fix {
    let mut tracker = GeofenceTracker::with_radius(radius);
    tracker.set_target(center.lat, center.lng);

    match tracker.evaluate(position.lat, position.lng) {
        Some(fix) => fix,
        // Unreachable with a target set; report as outside
        None => Fix {
            distance_to_center: f64::INFINITY,
            distance_to_edge: f64::INFINITY,
            inside: false,
            event: None,
        },
    }
}

fn render(fix: &Fix) -> String {
    let mut out = String::new();
    out.push_str(if fix.inside {
        "Inside Radius\n"
    } else {
        "Outside Radius\n"
    });
    out.push_str(&format!(
        "Distance to center: {}m. Distance to edge: {}m\n",
        fix.distance_to_center.round(),
        fix.distance_to_edge.round()
    ));
    if let Some(event) = &fix.event {
        out.push_str(&format!("Transition: {}\n", event.kind));
    }
    out
}
