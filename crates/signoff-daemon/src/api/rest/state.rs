//! Application state for API handlers

use approval_directory::UserDirectory;
use approval_engine::WorkflowEngine;
use notify_dispatch::{NotificationDispatcher, NotificationService};
use notify_hub::NotificationHub;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Workflow engine
    pub engine: Arc<WorkflowEngine>,

    /// User directory
    pub directory: Arc<dyn UserDirectory>,

    /// Workflow event fan-out
    pub dispatcher: Arc<NotificationDispatcher>,

    /// Notification read-side service
    pub notifications: Arc<NotificationService>,

    /// Live connection hub
    pub hub: Arc<NotificationHub>,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        engine: Arc<WorkflowEngine>,
        directory: Arc<dyn UserDirectory>,
        dispatcher: Arc<NotificationDispatcher>,
        notifications: Arc<NotificationService>,
        hub: Arc<NotificationHub>,
    ) -> Self {
        Self {
            engine,
            directory,
            dispatcher,
            notifications,
            hub,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let duration = chrono::Utc::now() - self.started_at;
        let secs = duration.num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        }
    }
}
