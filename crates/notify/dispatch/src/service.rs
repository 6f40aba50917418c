//! Notification read-side service.
//!
//! Wraps the store so every mutation echoes a hub event to the owner's
//! open connections, keeping badge counts and lists on other devices in
//! step with persisted read state.

use crate::DispatchResult;
use approval_types::UserId;
use notify_hub::NotificationHub;
use notify_store::{NotificationPage, NotificationStore};
use notify_types::{HubEvent, Notification, NotificationFilter, NotificationId};
use std::sync::Arc;

pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    hub: Arc<NotificationHub>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>, hub: Arc<NotificationHub>) -> Self {
        Self { store, hub }
    }

    /// Page through a user's notifications.
    pub async fn list(
        &self,
        user_id: &UserId,
        filter: &NotificationFilter,
    ) -> DispatchResult<NotificationPage> {
        Ok(self.store.list(user_id, filter).await?)
    }

    pub async fn unread_count(&self, user_id: &UserId) -> DispatchResult<usize> {
        Ok(self.store.unread_count(user_id).await?)
    }

    /// Mark one notification read and echo the change to the owner.
    pub async fn mark_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> DispatchResult<Notification> {
        let notification = self.store.mark_read(user_id, id).await?;
        self.echo_read(user_id, id).await;
        Ok(notification)
    }

    /// Mark a batch read, skipping ids the user does not own. Returns
    /// how many were marked.
    pub async fn mark_many_read(
        &self,
        user_id: &UserId,
        ids: &[NotificationId],
    ) -> DispatchResult<usize> {
        let marked = self.store.mark_many_read(user_id, ids).await?;
        for id in &marked {
            self.echo_read(user_id, id).await;
        }
        Ok(marked.len())
    }

    pub async fn delete(&self, user_id: &UserId, id: &NotificationId) -> DispatchResult<()> {
        self.store.delete(user_id, id).await?;
        self.echo_deleted(user_id, id).await;
        Ok(())
    }

    /// Delete everything the user has. Returns how many were removed.
    pub async fn clear_all(&self, user_id: &UserId) -> DispatchResult<usize> {
        let removed = self.store.clear_all(user_id).await?;
        for id in &removed {
            self.echo_deleted(user_id, id).await;
        }
        Ok(removed.len())
    }

    async fn echo_read(&self, user_id: &UserId, id: &NotificationId) {
        let event = HubEvent::NotificationRead {
            notification_id: id.clone(),
        };
        self.hub.push(user_id, &event).await;
    }

    async fn echo_deleted(&self, user_id: &UserId, id: &NotificationId) {
        let event = HubEvent::NotificationDeleted {
            notification_id: id.clone(),
        };
        self.hub.push(user_id, &event).await;
    }
}
