use notify_types::NotificationId;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-layer errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("notification not found: {0}")]
    NotFound(NotificationId),

    #[error("backend error: {0}")]
    Backend(String),
}
