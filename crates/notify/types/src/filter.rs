//! List filters for the notification inbox.

use crate::{Notification, NotificationPriority, NotificationType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}

/// Filter and paging parameters for listing a user's notifications.
///
/// Every criterion is optional; an empty filter matches everything.
/// Pages are 1-based.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_type: Option<NotificationType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<NotificationPriority>,
    /// Inclusive lower bound on creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<DateTime<Utc>>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for NotificationFilter {
    fn default() -> Self {
        Self {
            is_read: None,
            notification_type: None,
            priority: None,
            from_date: None,
            to_date: None,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl NotificationFilter {
    /// Filter down to unread notifications only.
    pub fn unread_only() -> Self {
        Self {
            is_read: Some(false),
            ..Self::default()
        }
    }

    pub fn with_page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    /// Whether `notification` satisfies every set criterion.
    pub fn matches(&self, notification: &Notification) -> bool {
        if let Some(is_read) = self.is_read {
            if notification.is_read != is_read {
                return false;
            }
        }
        if let Some(kind) = self.notification_type {
            if notification.notification_type != kind {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if notification.priority != priority {
                return false;
            }
        }
        if let Some(from) = self.from_date {
            if notification.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.to_date {
            if notification.created_at > to {
                return false;
            }
        }
        true
    }
}
