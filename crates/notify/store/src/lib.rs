//! Notification persistence.
//!
//! The store owns notification records and their read state. The trait
//! is the seam for a transactional backend; the in-memory adapter is
//! deterministic and test-friendly.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryNotificationStore;
pub use traits::{NotificationPage, NotificationStore};
