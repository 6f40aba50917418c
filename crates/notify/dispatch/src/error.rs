use approval_directory::DirectoryError;
use approval_engine::WorkflowError;
use notify_store::StoreError;
use thiserror::Error;

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Dispatch-layer errors.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
