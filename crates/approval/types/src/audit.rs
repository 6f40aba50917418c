//! Audit entries recorded for every successful workflow operation.

use crate::{Action, ReportId, ReportStatus, Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry in the engine's append-only trail. A single operation that
/// routes through intermediate stages still produces a single entry,
/// from the status before the call to the status after it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Position in the engine-wide append-only trail
    pub sequence: u64,
    /// The report that transitioned
    pub report_id: ReportId,
    /// Who caused the transition
    pub actor_id: UserId,
    /// Role of the actor at transition time
    pub actor_role: Role,
    /// Which operation was performed
    pub action: Action,
    /// Status before the operation
    pub from: ReportStatus,
    /// Status after the operation
    pub to: ReportStatus,
    /// When the operation was applied
    pub timestamp: DateTime<Utc>,
    /// Reviewer comment or rejection reason, when one was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl AuditEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        report_id: ReportId,
        actor_id: UserId,
        actor_role: Role,
        action: Action,
        from: ReportStatus,
        to: ReportStatus,
    ) -> Self {
        Self {
            sequence,
            report_id,
            actor_id,
            actor_role,
            action,
            from,
            to,
            timestamp: Utc::now(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
