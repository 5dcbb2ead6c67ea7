//! On-screen notifications
//!
//! A toast is a `{title, body, kind}` triple shown to the user and then
//! forgotten. The terminal sink prints it; the recording sink keeps it for
//! inspection.

use crate::geofence::{TransitionEvent, TransitionKind};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{error, info, warn};

/// Severity of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Info,
    Error,
    Warning,
}

impl std::fmt::Display for ToastKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Info => write!(f, "info"),
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A short user-facing notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    pub body: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn new(title: impl Into<String>, body: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            kind,
        }
    }

    pub fn success(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(title, body, ToastKind::Success)
    }

    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(title, body, ToastKind::Info)
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(title, body, ToastKind::Error)
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(title, body, ToastKind::Warning)
    }

    /// The toast announcing a zone transition
    pub fn for_transition(event: &TransitionEvent) -> Self {
        match event.kind {
            TransitionKind::Entered => {
                Self::success("Welcome!", "You have entered the designated area.")
            }
            TransitionKind::Exited => {
                Self::info("Notice", "You are outside the designated area.")
            }
        }
    }
}

/// Chat message relayed for a zone transition
pub fn relay_text(event: &TransitionEvent) -> String {
    let (icon, verb) = match event.kind {
        TransitionKind::Entered => ("🔔", "ENTERED"),
        TransitionKind::Exited => ("❗", "EXITED"),
    };
    format!(
        "{} Geofence: you have {} the designated area!\nLocation: {:.6}, {:.6}\nDistance to center: {}m",
        icon,
        verb,
        event.latitude,
        event.longitude,
        event.distance_to_center.round()
    )
}

/// Destination for toasts
///
/// Fire-and-forget: the caller never waits on or inspects the outcome.
pub trait ToastSink: Send + Sync {
    fn show(&self, toast: Toast);
}

/// Prints toasts to stdout and mirrors them into the log
#[derive(Debug, Default)]
pub struct TerminalToasts;

impl ToastSink for TerminalToasts {
    fn show(&self, toast: Toast) {
        match toast.kind {
            ToastKind::Error => error!(title = %toast.title, "{}", toast.body),
            ToastKind::Warning => warn!(title = %toast.title, "{}", toast.body),
            ToastKind::Success | ToastKind::Info => {
                info!(title = %toast.title, "{}", toast.body)
            }
        }
        println!("[{}] {}: {}", toast.kind, toast.title, toast.body);
    }
}

/// Keeps every toast it is shown, in order
#[derive(Debug, Default)]
pub struct RecordingToasts {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingToasts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything shown so far
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// Titles of everything shown so far
    pub fn titles(&self) -> Vec<String> {
        self.toasts().into_iter().map(|t| t.title).collect()
    }
}

impl ToastSink for RecordingToasts {
    fn show(&self, toast: Toast) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(toast);
        }
    }
}
