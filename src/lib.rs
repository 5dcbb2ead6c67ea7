//! geofence-watch: Geofence Transition Detector
//!
//! A library and CLI tool that watches a stream of position fixes and
//! announces each time the user enters or leaves a circular zone.
//!
//! ## Features
//!
//! - Haversine distance with an inclusive circular boundary
//! - At-most-once notification per transition, reset when the zone moves
//! - Replayed and simulated position sources
//! - Terminal toasts, map links and a chat relay (HTTP + Telegram)
//! - HTTP relay server + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use geofence_watch::geofence::{GeofenceTracker, TransitionKind};
//!
//! let mut tracker = GeofenceTracker::with_radius(500.0);
//! tracker.set_target(-6.2000, 106.8166); // Jakarta
//!
//! // First fix inside the zone is announced once
//! let event = tracker.check_position(-6.2010, 106.8166).unwrap();
//! assert_eq!(event.kind, TransitionKind::Entered);
//! assert!(tracker.check_position(-6.2005, 106.8166).is_none());
//!
//! // Walking out is announced once too
//! let event = tracker.check_position(-6.2200, 106.8166).unwrap();
//! assert_eq!(event.kind, TransitionKind::Exited);
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod geo;
pub mod geofence;
pub mod map;
pub mod monitor;
pub mod notify;
pub mod position;
pub mod relay;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use geofence::{Coordinates, GeofenceTracker, TransitionEvent, TransitionKind};
pub use monitor::Monitor;
