//! In-memory notification store.
//!
//! Deterministic and test-friendly. Production deployments should back
//! this trait with a transactional store.

use crate::traits::{NotificationPage, NotificationStore};
use crate::{StoreError, StoreResult};
use approval_types::UserId;
use async_trait::async_trait;
use notify_types::{Notification, NotificationFilter, NotificationId};
use std::collections::HashMap;
use std::sync::RwLock;

/// Largest page a single list call will return.
const MAX_PAGE_SIZE: u32 = 100;

/// In-memory notification store adapter.
#[derive(Default)]
pub struct InMemoryNotificationStore {
    notifications: RwLock<HashMap<NotificationId, Notification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications held across all users.
    pub fn len(&self) -> usize {
        self.notifications.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert(&self, notification: Notification) -> StoreResult<()> {
        let mut guard = self
            .notifications
            .write()
            .map_err(|_| StoreError::Backend("notifications lock poisoned".to_string()))?;
        guard.insert(notification.id.clone(), notification);
        Ok(())
    }

    async fn get(&self, id: &NotificationId) -> StoreResult<Option<Notification>> {
        let guard = self
            .notifications
            .read()
            .map_err(|_| StoreError::Backend("notifications lock poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    async fn list(
        &self,
        user_id: &UserId,
        filter: &NotificationFilter,
    ) -> StoreResult<NotificationPage> {
        let guard = self
            .notifications
            .read()
            .map_err(|_| StoreError::Backend("notifications lock poisoned".to_string()))?;

        let mut matching: Vec<Notification> = guard
            .values()
            .filter(|n| &n.user_id == user_id && filter.matches(n))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total_count = matching.len();
        let page = filter.page.max(1);
        let page_size = filter.page_size.clamp(1, MAX_PAGE_SIZE);
        let start = (page as usize - 1) * page_size as usize;
        let items = matching
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect();

        Ok(NotificationPage {
            items,
            total_count,
            page,
            page_size,
        })
    }

    async fn mark_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> StoreResult<Notification> {
        let mut guard = self
            .notifications
            .write()
            .map_err(|_| StoreError::Backend("notifications lock poisoned".to_string()))?;
        let notification = guard
            .get_mut(id)
            .filter(|n| &n.user_id == user_id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        notification.is_read = true;
        Ok(notification.clone())
    }

    async fn mark_many_read(
        &self,
        user_id: &UserId,
        ids: &[NotificationId],
    ) -> StoreResult<Vec<NotificationId>> {
        let mut guard = self
            .notifications
            .write()
            .map_err(|_| StoreError::Backend("notifications lock poisoned".to_string()))?;
        let mut marked = Vec::new();
        for id in ids {
            if let Some(notification) = guard.get_mut(id).filter(|n| &n.user_id == user_id) {
                notification.is_read = true;
                marked.push(id.clone());
            }
        }
        Ok(marked)
    }

    async fn delete(&self, user_id: &UserId, id: &NotificationId) -> StoreResult<()> {
        let mut guard = self
            .notifications
            .write()
            .map_err(|_| StoreError::Backend("notifications lock poisoned".to_string()))?;
        match guard.get(id) {
            Some(n) if &n.user_id == user_id => {
                guard.remove(id);
                Ok(())
            }
            _ => Err(StoreError::NotFound(id.clone())),
        }
    }

    async fn clear_all(&self, user_id: &UserId) -> StoreResult<Vec<NotificationId>> {
        let mut guard = self
            .notifications
            .write()
            .map_err(|_| StoreError::Backend("notifications lock poisoned".to_string()))?;

        let mut removed: Vec<(NotificationId, chrono::DateTime<chrono::Utc>)> = guard
            .values()
            .filter(|n| &n.user_id == user_id)
            .map(|n| (n.id.clone(), n.created_at))
            .collect();
        for (id, _) in &removed {
            guard.remove(id);
        }
        removed.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        Ok(removed.into_iter().map(|(id, _)| id).collect())
    }

    async fn unread_count(&self, user_id: &UserId) -> StoreResult<usize> {
        let guard = self
            .notifications
            .read()
            .map_err(|_| StoreError::Backend("notifications lock poisoned".to_string()))?;
        Ok(guard
            .values()
            .filter(|n| &n.user_id == user_id && !n.is_read)
            .count())
    }
}
