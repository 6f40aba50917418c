//! The notification hub.
//!
//! Routes [`HubEvent`]s to live connections through per-connection
//! bounded queues. Registration joins the connection to its user group
//! and its department group; pushes fan out over those groups with
//! per-connection duplicate suppression for notification deliveries.
//! Slow consumers lose events rather than stalling the hub, and closed
//! connections are pruned on the next delivery that finds them.

use crate::connection::{Connection, ConnectionId, ConnectionState, DedupRing, Group};
use approval_types::{Department, UserId};
use notify_types::HubEvent;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

/// Hub tuning knobs.
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Per-connection event queue depth
    pub queue_capacity: usize,
    /// Per-connection duplicate suppression window, in notifications
    pub dedup_window: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            dedup_window: 128,
        }
    }
}

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, Connection>,
    user_index: HashMap<UserId, HashSet<ConnectionId>>,
    group_index: HashMap<Group, HashSet<ConnectionId>>,
}

enum Delivery {
    Delivered,
    Duplicate,
    Full,
    Closed,
}

/// Fan-out hub for live notification delivery.
pub struct NotificationHub {
    registry: RwLock<Registry>,
    config: HubConfig,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::with_config(HubConfig::default())
    }

    pub fn with_config(config: HubConfig) -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            config,
        }
    }

    // ── Registration ─────────────────────────────────────────────────

    /// Register a connection and get its event receiver.
    ///
    /// The connection joins the user's group and the department's group.
    /// Reusing a connection id replaces the previous registration and
    /// closes its receiver. The user's first live connection announces
    /// `UserConnected` to the department.
    pub async fn register(
        &self,
        user_id: UserId,
        department: Department,
        connection_id: ConnectionId,
    ) -> mpsc::Receiver<HubEvent> {
        let (sender, receiver) = mpsc::channel(self.config.queue_capacity.max(1));
        let mut registry = self.registry.write().await;
        let registry = &mut *registry;

        let mut same_user_rejoined = false;
        if let Some((old_user, old_department, last)) = remove_connection(registry, &connection_id)
        {
            debug!(connection_id = %connection_id, "replacing existing registration");
            if old_user == user_id {
                same_user_rejoined = last;
            } else if last {
                let event = HubEvent::UserDisconnected {
                    user_id: old_user.clone(),
                };
                fan_out_group(
                    registry,
                    &Group::Department(old_department),
                    &event,
                    Some(&old_user),
                );
            }
        }

        let came_online =
            !registry.user_index.contains_key(&user_id) && !same_user_rejoined;
        let groups: HashSet<Group> = [
            Group::User(user_id.clone()),
            Group::Department(department),
        ]
        .into();
        for group in &groups {
            registry
                .group_index
                .entry(group.clone())
                .or_default()
                .insert(connection_id.clone());
        }
        registry
            .user_index
            .entry(user_id.clone())
            .or_default()
            .insert(connection_id.clone());
        registry.connections.insert(
            connection_id.clone(),
            Connection {
                id: connection_id.clone(),
                user_id: user_id.clone(),
                department,
                state: ConnectionState::Connected,
                groups,
                sender,
                recent: Mutex::new(DedupRing::new(self.config.dedup_window)),
            },
        );

        if came_online {
            let event = HubEvent::UserConnected {
                user_id: user_id.clone(),
            };
            fan_out_group(registry, &Group::Department(department), &event, Some(&user_id));
        }

        debug!(connection_id = %connection_id, user = %user_id, "connection registered");
        receiver
    }

    /// Drop a connection. The user's last connection going away announces
    /// `UserDisconnected` to the department.
    pub async fn unregister(&self, connection_id: &ConnectionId) {
        let mut registry = self.registry.write().await;
        let registry = &mut *registry;

        let Some((user_id, department, last)) = remove_connection(registry, connection_id) else {
            return;
        };
        debug!(connection_id = %connection_id, user = %user_id, "connection unregistered");
        if last {
            let event = HubEvent::UserDisconnected {
                user_id: user_id.clone(),
            };
            fan_out_group(registry, &Group::Department(department), &event, Some(&user_id));
        }
    }

    /// Rejoin a connection to an extra group, typically after a reconnect.
    /// Idempotent; false when the connection is unknown.
    pub async fn join_group(&self, connection_id: &ConnectionId, group: Group) -> bool {
        let mut registry = self.registry.write().await;
        let registry = &mut *registry;

        let Some(connection) = registry.connections.get_mut(connection_id) else {
            return false;
        };
        connection.groups.insert(group.clone());
        registry
            .group_index
            .entry(group)
            .or_default()
            .insert(connection_id.clone());
        true
    }

    // ── Delivery ─────────────────────────────────────────────────────

    /// Push an event to every connection of one user. Returns how many
    /// connections accepted it.
    pub async fn push(&self, user_id: &UserId, event: &HubEvent) -> usize {
        self.push_to_group(&Group::User(user_id.clone()), event).await
    }

    /// Push an event to every member connection of a group.
    pub async fn push_to_group(&self, group: &Group, event: &HubEvent) -> usize {
        let registry = self.registry.read().await;
        let (delivered, closed) = fan_out_group(&registry, group, event, None);
        drop(registry);

        if !closed.is_empty() {
            let mut registry = self.registry.write().await;
            sweep_closed(&mut registry, closed);
        }
        delivered
    }

    /// Push an event to every connection.
    pub async fn broadcast(&self, event: &HubEvent) -> usize {
        let registry = self.registry.read().await;
        let mut delivered = 0;
        let mut closed = Vec::new();
        for connection in registry.connections.values() {
            match deliver(connection, event) {
                Delivery::Delivered => delivered += 1,
                Delivery::Duplicate | Delivery::Full => {}
                Delivery::Closed => closed.push(connection.id.clone()),
            }
        }
        drop(registry);

        if !closed.is_empty() {
            let mut registry = self.registry.write().await;
            sweep_closed(&mut registry, closed);
        }
        delivered
    }

    // ── Introspection ────────────────────────────────────────────────

    pub async fn connection_count(&self) -> usize {
        self.registry.read().await.connections.len()
    }

    pub async fn user_connection_count(&self, user_id: &UserId) -> usize {
        self.registry
            .read()
            .await
            .user_index
            .get(user_id)
            .map(HashSet::len)
            .unwrap_or(0)
    }

    pub async fn is_online(&self, user_id: &UserId) -> bool {
        self.user_connection_count(user_id).await > 0
    }

    pub async fn connection_state(&self, connection_id: &ConnectionId) -> Option<ConnectionState> {
        self.registry
            .read()
            .await
            .connections
            .get(connection_id)
            .map(|c| c.state)
    }

    /// Member connections of a group right now.
    pub async fn group_size(&self, group: &Group) -> usize {
        self.registry
            .read()
            .await
            .group_index
            .get(group)
            .map(HashSet::len)
            .unwrap_or(0)
    }
}

// ── Internal routing ─────────────────────────────────────────────────

fn deliver(connection: &Connection, event: &HubEvent) -> Delivery {
    if let Some(notification_id) = event.notification_id() {
        if let Ok(recent) = connection.recent.lock() {
            if recent.contains(notification_id) {
                debug!(
                    connection_id = %connection.id,
                    notification_id = %notification_id,
                    "duplicate delivery suppressed"
                );
                return Delivery::Duplicate;
            }
        }
    }
    match connection.sender.try_send(event.clone()) {
        Ok(()) => {
            if let Some(notification_id) = event.notification_id() {
                if let Ok(mut recent) = connection.recent.lock() {
                    recent.record(notification_id.clone());
                }
            }
            Delivery::Delivered
        }
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!(
                connection_id = %connection.id,
                event = event.name(),
                "connection queue full, dropping event"
            );
            Delivery::Full
        }
        Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
    }
}

fn fan_out_group(
    registry: &Registry,
    group: &Group,
    event: &HubEvent,
    exclude_user: Option<&UserId>,
) -> (usize, Vec<ConnectionId>) {
    let Some(members) = registry.group_index.get(group) else {
        return (0, Vec::new());
    };
    let mut delivered = 0;
    let mut closed = Vec::new();
    for id in members {
        let Some(connection) = registry.connections.get(id) else {
            continue;
        };
        if exclude_user == Some(&connection.user_id) {
            continue;
        }
        match deliver(connection, event) {
            Delivery::Delivered => delivered += 1,
            Delivery::Duplicate | Delivery::Full => {}
            Delivery::Closed => closed.push(id.clone()),
        }
    }
    (delivered, closed)
}

/// Remove a connection from every index. Returns its owner, department,
/// and whether it was the owner's last connection.
fn remove_connection(
    registry: &mut Registry,
    connection_id: &ConnectionId,
) -> Option<(UserId, Department, bool)> {
    let connection = registry.connections.remove(connection_id)?;
    for group in &connection.groups {
        if let Some(members) = registry.group_index.get_mut(group) {
            members.remove(connection_id);
            if members.is_empty() {
                registry.group_index.remove(group);
            }
        }
    }
    let mut last = false;
    if let Some(ids) = registry.user_index.get_mut(&connection.user_id) {
        ids.remove(connection_id);
        if ids.is_empty() {
            registry.user_index.remove(&connection.user_id);
            last = true;
        }
    }
    Some((connection.user_id, connection.department, last))
}

fn sweep_closed(registry: &mut Registry, closed: Vec<ConnectionId>) {
    for connection_id in closed {
        let Some((user_id, department, last)) = remove_connection(registry, &connection_id) else {
            continue;
        };
        debug!(connection_id = %connection_id, "closed connection pruned");
        if last {
            let event = HubEvent::UserDisconnected {
                user_id: user_id.clone(),
            };
            // Connections found closed during this announcement are
            // caught by the next delivery that touches them.
            let _ = fan_out_group(registry, &Group::Department(department), &event, Some(&user_id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify_types::{Notification, NotificationType};

    fn note_for(user: &str, seed: &str) -> HubEvent {
        let mut notification = Notification::new(
            UserId::new(user),
            format!("note {seed}"),
            "body",
            NotificationType::Info,
        );
        notification.id = notify_types::NotificationId::new(seed);
        HubEvent::ReceiveNotification { notification }
    }

    async fn connect(
        hub: &NotificationHub,
        user: &str,
        department: Department,
    ) -> (ConnectionId, mpsc::Receiver<HubEvent>) {
        let connection_id = ConnectionId::generate();
        let receiver = hub
            .register(UserId::new(user), department, connection_id.clone())
            .await;
        (connection_id, receiver)
    }

    #[tokio::test]
    async fn register_and_push() {
        let hub = NotificationHub::new();
        let (_id, mut rx) = connect(&hub, "u-1", Department::Sales).await;

        let delivered = hub.push(&UserId::new("u-1"), &note_for("u-1", "n-1")).await;
        assert_eq!(delivered, 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.name(), "receive-notification");
    }

    #[tokio::test]
    async fn push_reaches_every_connection_of_the_user() {
        let hub = NotificationHub::new();
        let (_a, mut rx_a) = connect(&hub, "u-1", Department::Sales).await;
        let (_b, mut rx_b) = connect(&hub, "u-1", Department::Sales).await;

        let delivered = hub.push(&UserId::new("u-1"), &note_for("u-1", "n-1")).await;
        assert_eq!(delivered, 2);
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[tokio::test]
    async fn duplicate_notification_suppressed_per_connection() {
        let hub = NotificationHub::new();
        let (_id, mut rx) = connect(&hub, "u-1", Department::Sales).await;
        let event = note_for("u-1", "n-1");

        assert_eq!(hub.push(&UserId::new("u-1"), &event).await, 1);
        assert_eq!(hub.push(&UserId::new("u-1"), &event).await, 0);

        // Exactly one copy arrived.
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());

        // A different notification still goes through.
        assert_eq!(
            hub.push(&UserId::new("u-1"), &note_for("u-1", "n-2")).await,
            1
        );
    }

    #[tokio::test]
    async fn non_notification_events_are_not_deduped() {
        let hub = NotificationHub::new();
        let (_id, mut rx) = connect(&hub, "u-1", Department::Sales).await;
        let event = HubEvent::SystemBroadcast {
            message: "ping".to_string(),
        };

        assert_eq!(hub.broadcast(&event).await, 1);
        assert_eq!(hub.broadcast(&event).await, 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn full_queue_drops_instead_of_blocking() {
        let hub = NotificationHub::with_config(HubConfig {
            queue_capacity: 1,
            dedup_window: 128,
        });
        let (_id, mut rx) = connect(&hub, "u-1", Department::Sales).await;

        assert_eq!(hub.push(&UserId::new("u-1"), &note_for("u-1", "n-1")).await, 1);
        // Queue is full; this one is dropped, not queued.
        assert_eq!(hub.push(&UserId::new("u-1"), &note_for("u-1", "n-2")).await, 0);

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());

        // Connection stays registered; drained queue accepts again.
        assert_eq!(hub.connection_count().await, 1);
        assert_eq!(hub.push(&UserId::new("u-1"), &note_for("u-1", "n-3")).await, 1);
    }

    #[tokio::test]
    async fn closed_connection_pruned_on_next_push() {
        let hub = NotificationHub::new();
        let (_id, rx) = connect(&hub, "u-1", Department::Sales).await;
        drop(rx);

        assert_eq!(hub.connection_count().await, 1);
        assert_eq!(hub.push(&UserId::new("u-1"), &note_for("u-1", "n-1")).await, 0);
        assert_eq!(hub.connection_count().await, 0);
        assert!(!hub.is_online(&UserId::new("u-1")).await);
    }

    #[tokio::test]
    async fn department_group_fan_out() {
        let hub = NotificationHub::new();
        let (_a, mut rx_sales_1) = connect(&hub, "u-1", Department::Sales).await;
        let (_b, mut rx_sales_2) = connect(&hub, "u-2", Department::Sales).await;
        let (_c, mut rx_ops) = connect(&hub, "u-3", Department::Operations).await;

        // Drain the presence event u-1 got when u-2 came online.
        assert!(rx_sales_1.try_recv().is_ok());

        let event = HubEvent::SystemBroadcast {
            message: "sales stand-up".to_string(),
        };
        let delivered = hub
            .push_to_group(&Group::Department(Department::Sales), &event)
            .await;
        assert_eq!(delivered, 2);
        assert!(rx_sales_1.try_recv().is_ok());
        assert!(rx_sales_2.try_recv().is_ok());
        assert!(rx_ops.try_recv().is_err());
    }

    #[tokio::test]
    async fn presence_announced_on_first_and_last_connection() {
        let hub = NotificationHub::new();
        let (_a, mut rx_observer) = connect(&hub, "u-1", Department::Sales).await;

        // First connection of u-2: observer hears it, u-2 does not hear itself.
        let (conn_b1, mut rx_b1) = connect(&hub, "u-2", Department::Sales).await;
        let event = rx_observer.try_recv().unwrap();
        assert_eq!(
            event,
            HubEvent::UserConnected {
                user_id: UserId::new("u-2")
            }
        );
        assert!(rx_b1.try_recv().is_err());

        // Second connection of the same user: no repeat announcement.
        let (conn_b2, _rx_b2) = connect(&hub, "u-2", Department::Sales).await;
        assert!(rx_observer.try_recv().is_err());

        // Dropping one of two connections: still online, no announcement.
        hub.unregister(&conn_b1).await;
        assert!(rx_observer.try_recv().is_err());
        assert!(hub.is_online(&UserId::new("u-2")).await);

        // Last connection gone: observer hears the disconnect.
        hub.unregister(&conn_b2).await;
        let event = rx_observer.try_recv().unwrap();
        assert_eq!(
            event,
            HubEvent::UserDisconnected {
                user_id: UserId::new("u-2")
            }
        );
    }

    #[tokio::test]
    async fn reused_connection_id_replaces_registration() {
        let hub = NotificationHub::new();
        let connection_id = ConnectionId::new("c-1");
        let mut rx_old = hub
            .register(UserId::new("u-1"), Department::Sales, connection_id.clone())
            .await;
        let mut rx_new = hub
            .register(UserId::new("u-1"), Department::Sales, connection_id.clone())
            .await;

        assert_eq!(hub.connection_count().await, 1);
        // The old receiver is closed, the new one is live.
        assert!(matches!(
            rx_old.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
        assert_eq!(hub.push(&UserId::new("u-1"), &note_for("u-1", "n-1")).await, 1);
        assert!(rx_new.try_recv().is_ok());
    }

    #[tokio::test]
    async fn rejoining_a_group_restores_membership() {
        let hub = NotificationHub::new();
        let (connection_id, mut rx) = connect(&hub, "u-1", Department::Operations).await;
        let sales = Group::Department(Department::Sales);

        assert_eq!(hub.group_size(&sales).await, 0);
        assert!(hub.join_group(&connection_id, sales.clone()).await);
        // Idempotent rejoin, still a single membership.
        assert!(hub.join_group(&connection_id, sales.clone()).await);
        assert_eq!(hub.group_size(&sales).await, 1);

        let event = HubEvent::SystemBroadcast {
            message: "sales news".to_string(),
        };
        assert_eq!(hub.push_to_group(&sales, &event).await, 1);
        assert!(rx.try_recv().is_ok());

        assert!(
            !hub.join_group(&ConnectionId::new("ghost"), sales.clone())
                .await
        );
    }

    #[tokio::test]
    async fn state_tracked_while_registered() {
        let hub = NotificationHub::new();
        let (connection_id, _rx) = connect(&hub, "u-1", Department::Sales).await;

        assert_eq!(
            hub.connection_state(&connection_id).await,
            Some(ConnectionState::Connected)
        );
        hub.unregister(&connection_id).await;
        assert_eq!(hub.connection_state(&connection_id).await, None);
    }

    #[tokio::test]
    async fn broadcast_reaches_everyone() {
        let hub = NotificationHub::new();
        let (_a, mut rx_a) = connect(&hub, "u-1", Department::Sales).await;
        let (_b, mut rx_b) = connect(&hub, "u-2", Department::Engineering).await;

        let event = HubEvent::SystemBroadcast {
            message: "maintenance at 22:00".to_string(),
        };
        assert_eq!(hub.broadcast(&event).await, 2);
        assert_eq!(rx_a.recv().await.unwrap(), event);
        assert_eq!(rx_b.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn push_to_unknown_user_delivers_nothing() {
        let hub = NotificationHub::new();
        assert_eq!(hub.push(&UserId::new("nobody"), &note_for("nobody", "n-1")).await, 0);
    }
}
