//! Events pushed to live connections.
//!
//! The hub forwards these over per-connection channels; the daemon
//! serializes them onto SSE streams using [`HubEvent::name`] as the
//! event name. The wire shape is internally tagged so clients can
//! switch on the `type` field.

use crate::{Notification, NotificationId};
use approval_types::{Department, ReportId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Report context carried on workflow broadcast events
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportEventMeta {
    pub report_id: ReportId,
    pub report_title: String,
    pub department: Department,
    pub actor_id: UserId,
    pub timestamp: DateTime<Utc>,
}

/// An event delivered over a live connection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HubEvent {
    /// A notification addressed to the receiving user
    ReceiveNotification { notification: Notification },
    /// A notification was marked read on another device
    NotificationRead { notification_id: NotificationId },
    /// A notification was deleted on another device
    NotificationDeleted { notification_id: NotificationId },
    /// A report in the receiver's scope was submitted
    ReportSubmitted { meta: ReportEventMeta },
    /// A report in the receiver's scope was approved
    ReportApproved { meta: ReportEventMeta },
    /// A report in the receiver's scope was rejected
    ReportRejected { meta: ReportEventMeta },
    /// Operator announcement to every connection
    SystemBroadcast { message: String },
    /// A user in the receiver's department came online
    UserConnected { user_id: UserId },
    /// A user in the receiver's department went offline
    UserDisconnected { user_id: UserId },
}

impl HubEvent {
    /// Stable event name, used as the SSE event field and in log output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReceiveNotification { .. } => "receive-notification",
            Self::NotificationRead { .. } => "notification-read",
            Self::NotificationDeleted { .. } => "notification-deleted",
            Self::ReportSubmitted { .. } => "report-submitted",
            Self::ReportApproved { .. } => "report-approved",
            Self::ReportRejected { .. } => "report-rejected",
            Self::SystemBroadcast { .. } => "system-broadcast",
            Self::UserConnected { .. } => "user-connected",
            Self::UserDisconnected { .. } => "user-disconnected",
        }
    }

    /// The notification id this event would deliver, for duplicate
    /// suppression. Only `ReceiveNotification` deliveries are deduped;
    /// read/delete echoes are idempotent on the client.
    pub fn notification_id(&self) -> Option<&NotificationId> {
        match self {
            Self::ReceiveNotification { notification } => Some(&notification.id),
            _ => None,
        }
    }
}
