//! Out-of-band delivery channels.
//!
//! Channel senders are fire-and-forget integrations behind one trait.
//! Failed sends retry on a fixed backoff schedule and are abandoned
//! after the last attempt; channel delivery never blocks or fails the
//! dispatch path.

use approval_types::{User, WorkflowEvent};
use async_trait::async_trait;
use notify_types::{Channel, Notification};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Retry schedule applied after a failed first attempt.
pub const DEFAULT_SEND_RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(5),
    Duration::from_secs(30),
];

pub type ChannelResult<T> = Result<T, ChannelError>;

/// Channel delivery errors.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("channel unavailable: {0}")]
    Unavailable(String),

    #[error("send rejected: {0}")]
    Rejected(String),
}

/// Rendered message handed to channel senders.
#[derive(Clone, Debug, Serialize)]
pub struct ChannelMessage {
    pub subject: String,
    pub body: String,
    /// Structured context for templating integrations
    pub data: serde_json::Value,
}

impl ChannelMessage {
    /// Render a notification for out-of-band delivery.
    pub fn render(notification: &Notification, event: &WorkflowEvent) -> Self {
        Self {
            subject: notification.title.clone(),
            body: notification.message.clone(),
            data: serde_json::json!({
                "report_id": event.report_id,
                "report_title": event.report_title,
                "event_type": event.event_type.as_str(),
                "department": event.department.key(),
                "priority": notification.priority.as_str(),
                "action_url": notification.action_url,
            }),
        }
    }
}

/// One out-of-band delivery integration.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// Which channel this sender delivers on.
    fn channel(&self) -> Channel;

    /// Deliver one message to one recipient.
    async fn send(&self, recipient: &User, message: &ChannelMessage) -> ChannelResult<()>;
}

/// Development sender that logs instead of delivering.
pub struct LoggingChannelSender {
    channel: Channel,
}

impl LoggingChannelSender {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl ChannelSender for LoggingChannelSender {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(&self, recipient: &User, message: &ChannelMessage) -> ChannelResult<()> {
        info!(
            channel = %self.channel,
            recipient = %recipient.id,
            subject = %message.subject,
            "channel send"
        );
        Ok(())
    }
}

/// Send with retries on the given backoff schedule. The first attempt is
/// immediate; each schedule entry delays one retry.
pub async fn send_with_retry(
    sender: &dyn ChannelSender,
    recipient: &User,
    message: &ChannelMessage,
    delays: &[Duration],
) -> ChannelResult<()> {
    let mut last_error = match sender.send(recipient, message).await {
        Ok(()) => return Ok(()),
        Err(error) => error,
    };

    for (retry, delay) in delays.iter().enumerate() {
        warn!(
            channel = %sender.channel(),
            recipient = %recipient.id,
            error = %last_error,
            retry_in = ?delay,
            "channel send failed, retrying"
        );
        tokio::time::sleep(*delay).await;
        match sender.send(recipient, message).await {
            Ok(()) => return Ok(()),
            Err(error) => last_error = error,
        }
        if retry + 1 == delays.len() {
            warn!(
                channel = %sender.channel(),
                recipient = %recipient.id,
                error = %last_error,
                "channel send failed, out of retries"
            );
        }
    }
    Err(last_error)
}
