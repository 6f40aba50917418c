use crate::StoreResult;
use approval_types::UserId;
use async_trait::async_trait;
use notify_types::{Notification, NotificationFilter, NotificationId};
use serde::Serialize;

/// One page of a user's notification list.
#[derive(Clone, Debug, Serialize)]
pub struct NotificationPage {
    pub items: Vec<Notification>,
    /// Matching notifications across all pages
    pub total_count: usize,
    pub page: u32,
    pub page_size: u32,
}

impl NotificationPage {
    pub fn total_pages(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.page_size as usize) as u32
    }
}

/// Storage interface for per-user notifications.
///
/// All mutating methods are scoped to the owning user: ids belonging to
/// someone else read as not found.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist a new notification.
    async fn insert(&self, notification: Notification) -> StoreResult<()>;

    /// Get one notification by id.
    async fn get(&self, id: &NotificationId) -> StoreResult<Option<Notification>>;

    /// List a user's notifications newest-first, filtered and paged.
    async fn list(
        &self,
        user_id: &UserId,
        filter: &NotificationFilter,
    ) -> StoreResult<NotificationPage>;

    /// Mark one notification read. Idempotent: marking an already-read
    /// notification succeeds and returns it unchanged.
    async fn mark_read(
        &self,
        user_id: &UserId,
        id: &NotificationId,
    ) -> StoreResult<Notification>;

    /// Mark a batch read, skipping ids that do not resolve for this user.
    /// Returns the ids that were marked, in input order.
    async fn mark_many_read(
        &self,
        user_id: &UserId,
        ids: &[NotificationId],
    ) -> StoreResult<Vec<NotificationId>>;

    /// Delete one notification.
    async fn delete(&self, user_id: &UserId, id: &NotificationId) -> StoreResult<()>;

    /// Delete every notification of a user, returning the removed ids
    /// newest-first.
    async fn clear_all(&self, user_id: &UserId) -> StoreResult<Vec<NotificationId>>;

    /// Unread notifications for a user.
    async fn unread_count(&self, user_id: &UserId) -> StoreResult<usize>;
}
