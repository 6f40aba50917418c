//! Real-time notification hub.
//!
//! Holds the live connection registry and fans [`HubEvent`]s out to
//! per-connection bounded queues, with user and department group
//! addressing, per-connection duplicate suppression, presence
//! announcements, and a reconnect supervisor for dropped clients.
//!
//! ```no_run
//! use approval_types::{Department, UserId};
//! use notify_hub::{ConnectionId, NotificationHub};
//! use notify_types::HubEvent;
//!
//! # async fn example() {
//! let hub = NotificationHub::new();
//! let mut events = hub
//!     .register(
//!         UserId::new("ana"),
//!         Department::Sales,
//!         ConnectionId::generate(),
//!     )
//!     .await;
//!
//! hub.broadcast(&HubEvent::SystemBroadcast {
//!     message: "maintenance at 22:00".to_string(),
//! })
//! .await;
//! let event = events.recv().await;
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod connection;
pub mod hub;
pub mod reconnect;

pub use connection::{ConnectionId, ConnectionState, Group};
pub use hub::{HubConfig, NotificationHub};
pub use reconnect::{
    ReconnectOutcome, ReconnectPolicy, ReconnectSupervisor, DEFAULT_RECONNECT_DELAYS,
};
