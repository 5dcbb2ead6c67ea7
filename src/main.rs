//! geofence-watch CLI entry point
//!
//! Geofence transition detector - CLI + relay server

use geofence_watch::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
