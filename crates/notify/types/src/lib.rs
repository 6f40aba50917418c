//! Notification domain types.
//!
//! The vocabulary shared by the store, the hub, and the dispatcher:
//! persisted notifications with read state, list filters with paging,
//! per-user channel preferences, and the hub events pushed over live
//! connections.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod filter;
pub mod hub_event;
pub mod notification;
pub mod preferences;

pub use filter::NotificationFilter;
pub use hub_event::{HubEvent, ReportEventMeta};
pub use notification::{Notification, NotificationId, NotificationPriority, NotificationType};
pub use preferences::{Channel, ChannelPreferences};
