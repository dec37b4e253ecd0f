//! # Client Events
//!
//! Signals the client raises for the rendering layer: navigation requests and
//! user-visible notifications.
//!
//! State that has a *current value* (auth state, visible page) is published
//! through `tokio::sync::watch` channels instead; see
//! [`crate::session::SessionManager::subscribe`] and
//! [`crate::inventory::InventoryView::subscribe`].

use railtrack_core::Route;
use serde::{Deserialize, Serialize};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A one-shot message for the user (toast or alert).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

// =============================================================================
// Event Emitter Trait
// =============================================================================

/// Receiver of client events (implemented by the UI integration).
pub trait ClientEventEmitter: Send + Sync {
    /// Asks the UI to show `route`.
    fn navigate(&self, route: &Route);

    /// Shows a message to the user.
    fn notify(&self, notification: &Notification);
}

/// Event emitter that drops everything.
pub struct NoOpEmitter;

impl ClientEventEmitter for NoOpEmitter {
    fn navigate(&self, _route: &Route) {}
    fn notify(&self, _notification: &Notification) {}
}

/// Emitter that records every event, for tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingEmitter {
    routes: std::sync::Mutex<Vec<Route>>,
    notifications: std::sync::Mutex<Vec<Notification>>,
}

#[cfg(test)]
impl RecordingEmitter {
    pub(crate) fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }

    pub(crate) fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl ClientEventEmitter for RecordingEmitter {
    fn navigate(&self, route: &Route) {
        self.routes.lock().unwrap().push(route.clone());
    }

    fn notify(&self, notification: &Notification) {
        self.notifications.lock().unwrap().push(notification.clone());
    }
}
