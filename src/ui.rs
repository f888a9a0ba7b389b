//! Interfaces to the rendering collaborators
//!
//! The client never touches a view directly. Toasts, the loading overlay, result grids and
//! bookmark buttons are reached through these traits, injected via [`crate::AppContext`].

use crate::{models::Suggestion, search::SearchResultsReady};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// Transient user-facing notifications (toasts)
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: &str);
}

/// Process-wide loading overlay
pub trait LoadingIndicator: Send + Sync {
    fn set_visible(&self, visible: bool);
}

/// A rendered watchlist toggle (bookmark) control
pub trait ToggleControl: Send + Sync {
    fn set_enabled(&self, enabled: bool);

    fn set_in_watchlist(&self, in_watchlist: bool);
}

/// Receives search output ready for rendering
pub trait ResultSink: Send + Sync {
    fn on_results(&self, ready: SearchResultsReady);

    fn clear_results(&self);

    /// An empty list means the dropdown should be hidden
    fn on_suggestions(&self, suggestions: Vec<Suggestion>);

    fn clear_suggestions(&self);
}

/// Notifier that writes toasts to the log
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Error => tracing::error!(toast = %message, "Notification"),
            NotificationLevel::Success | NotificationLevel::Info => {
                tracing::info!(toast = %message, "Notification")
            }
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct TracingLoadingIndicator;

impl LoadingIndicator for TracingLoadingIndicator {
    fn set_visible(&self, visible: bool) {
        tracing::trace!(visible, "Loading indicator");
    }
}
