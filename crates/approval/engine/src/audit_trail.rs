//! Append-only audit trail.

use crate::{WorkflowError, WorkflowResult};
use approval_types::{Action, AuditEntry, ReportId, ReportStatus, Role, UserId};
use std::sync::RwLock;

/// Engine-wide append-only trail of applied operations. Sequence numbers
/// are assigned under the append lock and never reused.
#[derive(Default)]
pub struct AuditTrail {
    entries: RwLock<Vec<AuditEntry>>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry for a successful operation and return it.
    #[allow(clippy::too_many_arguments)]
    pub fn append(
        &self,
        report_id: ReportId,
        actor_id: UserId,
        actor_role: Role,
        action: Action,
        from: ReportStatus,
        to: ReportStatus,
        note: Option<String>,
    ) -> WorkflowResult<AuditEntry> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| WorkflowError::Internal("audit lock poisoned".to_string()))?;
        let mut entry = AuditEntry::new(
            entries.len() as u64,
            report_id,
            actor_id,
            actor_role,
            action,
            from,
            to,
        );
        if let Some(note) = note {
            entry = entry.with_note(note);
        }
        entries.push(entry.clone());
        Ok(entry)
    }

    /// All entries for one report, in append order.
    pub fn for_report(&self, report_id: &ReportId) -> Vec<AuditEntry> {
        match self.entries.read() {
            Ok(entries) => entries
                .iter()
                .filter(|e| &e.report_id == report_id)
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Total entries appended.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
