use approval_types::{Action, ReportId, ReportStatus, UserId};
use thiserror::Error;

/// Result type for engine operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Engine-layer errors. Every rejection names the report, the actor, or
/// the offending input so callers can surface an actionable message.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("report not found: {0}")]
    NotFound(ReportId),

    #[error("actor {0} is not known to the directory")]
    UnknownActor(UserId),

    #[error("actor {actor} is not authorized to {action} this report")]
    Unauthorized { actor: UserId, action: Action },

    #[error("cannot {action} a report in status {from}")]
    InvalidTransition { from: ReportStatus, action: Action },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("directory error: {0}")]
    Directory(#[from] approval_directory::DirectoryError),

    #[error("internal error: {0}")]
    Internal(String),
}
