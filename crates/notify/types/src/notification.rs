//! Persisted notifications.

use approval_types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Notification Identifier ──────────────────────────────────────────

/// Unique identifier for a notification
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(pub String);

impl NotificationId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Classification ───────────────────────────────────────────────────

/// Visual and semantic class of a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NotificationType {
    #[default]
    Info,
    Warning,
    Error,
    Success,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Success => "success",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Delivery urgency, mapped from report priority at dispatch time
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum NotificationPriority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

impl NotificationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

// ── Notification ─────────────────────────────────────────────────────

/// A notification addressed to one user.
///
/// Owned by the store once persisted; the hub only ever sees clones
/// inside [`HubEvent::ReceiveNotification`](crate::HubEvent) pushes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier
    pub id: NotificationId,
    /// The recipient
    pub user_id: UserId,
    /// Short headline
    pub title: String,
    /// Body text
    pub message: String,
    /// Semantic class
    pub notification_type: NotificationType,
    /// Delivery urgency
    pub priority: NotificationPriority,
    /// Whether the recipient has read it
    pub is_read: bool,
    /// When the notification was created
    pub created_at: DateTime<Utc>,
    /// Optional in-app link target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
}

impl Notification {
    /// Create an unread notification with normal priority.
    pub fn new(
        user_id: UserId,
        title: impl Into<String>,
        message: impl Into<String>,
        notification_type: NotificationType,
    ) -> Self {
        Self {
            id: NotificationId::generate(),
            user_id,
            title: title.into(),
            message: message.into(),
            notification_type,
            priority: NotificationPriority::default(),
            is_read: false,
            created_at: Utc::now(),
            action_url: None,
        }
    }

    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_action_url(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }
}
