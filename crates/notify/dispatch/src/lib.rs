//! Workflow-to-notification dispatch.
//!
//! The bridge between the approval engine and the delivery surfaces:
//! [`NotificationDispatcher`] turns workflow events into stored
//! notifications, live hub pushes, and out-of-band channel sends, and
//! [`NotificationService`] keeps read-state mutations echoed back to
//! open connections.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod channels;
pub mod dispatcher;
pub mod error;
pub mod preferences;
pub mod recipients;
pub mod service;

pub use channels::{
    send_with_retry, ChannelError, ChannelMessage, ChannelResult, ChannelSender,
    LoggingChannelSender, DEFAULT_SEND_RETRY_DELAYS,
};
pub use dispatcher::{DispatchConfig, NotificationDispatcher, NotificationSendResult};
pub use error::{DispatchError, DispatchResult};
pub use preferences::{PreferenceError, PreferenceProvider, StaticPreferences};
pub use recipients::recipients_for;
pub use service::NotificationService;
