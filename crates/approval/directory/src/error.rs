use thiserror::Error;

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Directory-layer errors.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("backend error: {0}")]
    Backend(String),
}
