//! Workflow events emitted by the engine after each successful operation.
//!
//! One event per engine call. The event is the only handoff between the
//! workflow side and the notification side: the dispatcher reads it, the
//! engine never talks to channels or the hub directly.

use crate::{Department, Report, ReportId, Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const META_STAGE: &str = "stage";
const META_FINAL: &str = "final";
const META_COMMENT: &str = "comment";
const META_REASON: &str = "reason";
const META_DUE_DATE: &str = "due_date";
const META_DAYS_OVERDUE: &str = "days_overdue";

// ── Event Identifier ─────────────────────────────────────────────────

/// Unique identifier for a workflow event
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowEventId(pub String);

impl WorkflowEventId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for WorkflowEventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Event Type ───────────────────────────────────────────────────────

/// What kind of workflow step the event records
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowEventType {
    /// A report was submitted for review
    Submission,
    /// A review stage approved the report
    Approved,
    /// A review stage rejected the report
    Rejected,
    /// A report is approaching its due date
    DueDate,
    /// A report is overdue and needs management attention
    Escalation,
}

impl WorkflowEventType {
    /// Stable key used for channel template lookup and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submission => "submission",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::DueDate => "due-date",
            Self::Escalation => "escalation",
        }
    }
}

impl std::fmt::Display for WorkflowEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── Approval Stage ───────────────────────────────────────────────────

/// Which review stage produced an Approved or Rejected event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalStage {
    Manager,
    Executive,
}

impl ApprovalStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "manager",
            Self::Executive => "executive",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "manager" => Some(Self::Manager),
            "executive" => Some(Self::Executive),
            _ => None,
        }
    }
}

impl std::fmt::Display for ApprovalStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── Workflow Event ───────────────────────────────────────────────────

/// Record of one successful workflow operation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowEvent {
    /// Unique event identifier
    pub id: WorkflowEventId,
    /// What happened
    pub event_type: WorkflowEventType,
    /// The report the event is about
    pub report_id: ReportId,
    /// Report title snapshot for notification rendering
    pub report_title: String,
    /// Who triggered the operation
    pub actor_id: UserId,
    /// Role of the actor at the time of the operation
    pub actor_role: Role,
    /// Department of the report
    pub department: Department,
    /// When the operation completed
    pub timestamp: DateTime<Utc>,
    /// Stage qualifiers and free-form context
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl WorkflowEvent {
    /// Build an event for `report`, snapshotting the fields notifications need
    pub fn for_report(
        event_type: WorkflowEventType,
        report: &Report,
        actor_id: UserId,
        actor_role: Role,
    ) -> Self {
        Self {
            id: WorkflowEventId::generate(),
            event_type,
            report_id: report.id.clone(),
            report_title: report.title.clone(),
            actor_id,
            actor_role,
            department: report.department,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Tag the event with the review stage that acted and whether that
    /// stage finished the workflow.
    pub fn with_stage(mut self, stage: ApprovalStage, is_final: bool) -> Self {
        self.metadata
            .insert(META_STAGE.to_string(), stage.as_str().to_string());
        self.metadata
            .insert(META_FINAL.to_string(), is_final.to_string());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.metadata.insert(META_COMMENT.to_string(), comment.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.metadata.insert(META_REASON.to_string(), reason.into());
        self
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.metadata
            .insert(META_DUE_DATE.to_string(), due_date.to_rfc3339());
        self
    }

    pub fn with_days_overdue(mut self, days: i64) -> Self {
        self.metadata
            .insert(META_DAYS_OVERDUE.to_string(), days.to_string());
        self
    }

    /// Review stage qualifier, present on Approved and Rejected events
    pub fn stage(&self) -> Option<ApprovalStage> {
        self.metadata
            .get(META_STAGE)
            .and_then(|v| ApprovalStage::parse(v))
    }

    /// Whether this event finished the workflow for its report
    pub fn is_final(&self) -> bool {
        self.metadata.get(META_FINAL).map(String::as_str) == Some("true")
    }

    /// Reviewer comment attached to an approval
    pub fn comment(&self) -> Option<&str> {
        self.metadata.get(META_COMMENT).map(String::as_str)
    }

    /// Reason attached to a rejection
    pub fn reason(&self) -> Option<&str> {
        self.metadata.get(META_REASON).map(String::as_str)
    }

    /// Days overdue attached to an escalation
    pub fn days_overdue(&self) -> Option<i64> {
        self.metadata.get(META_DAYS_OVERDUE)?.parse().ok()
    }
}
