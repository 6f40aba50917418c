//! Live connection bookkeeping.
//!
//! Connections are ephemeral hub-owned records. They disappear on
//! unregister or when their receiver is dropped; nothing here survives
//! a restart.

use approval_types::{Department, UserId};
use notify_types::{HubEvent, NotificationId};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use tokio::sync::mpsc;

// ── Connection Identifier ────────────────────────────────────────────

/// Unique identifier for a live connection
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub String);

impl ConnectionId {
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

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Connection State ─────────────────────────────────────────────────

/// Lifecycle of one client connection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Initial handshake in progress
    Connecting,
    /// Registered with the hub and receiving events
    Connected,
    /// Lost; a reconnect schedule is running client-side
    Reconnecting,
    /// Gone for good
    Closed,
}

impl ConnectionState {
    /// Whether the connection can still receive events.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

// ── Groups ───────────────────────────────────────────────────────────

/// A fan-out address: every connection of one user, or every connection
/// of a department's members.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Group {
    User(UserId),
    Department(Department),
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(user_id) => write!(f, "user:{user_id}"),
            Self::Department(department) => write!(f, "department:{}", department.key()),
        }
    }
}

// ── Duplicate suppression ────────────────────────────────────────────

/// Bounded memory of recently delivered notification ids.
pub(crate) struct DedupRing {
    order: VecDeque<NotificationId>,
    seen: HashSet<NotificationId>,
    capacity: usize,
}

impl DedupRing {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Whether `id` was delivered recently. A zero capacity disables
    /// suppression.
    pub(crate) fn contains(&self, id: &NotificationId) -> bool {
        self.capacity > 0 && self.seen.contains(id)
    }

    /// Remember a delivery, evicting the oldest entry at capacity.
    pub(crate) fn record(&mut self, id: NotificationId) {
        if self.capacity == 0 || self.seen.contains(&id) {
            return;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.seen.insert(id.clone());
        self.order.push_back(id);
    }
}

// ── Connection ───────────────────────────────────────────────────────

/// One registered connection.
pub(crate) struct Connection {
    pub(crate) id: ConnectionId,
    pub(crate) user_id: UserId,
    pub(crate) department: Department,
    pub(crate) state: ConnectionState,
    pub(crate) groups: HashSet<Group>,
    pub(crate) sender: mpsc::Sender<HubEvent>,
    /// Recently delivered notification ids, per connection
    pub(crate) recent: Mutex<DedupRing>,
}
