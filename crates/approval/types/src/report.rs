//! Report records and their status vocabulary.
//!
//! A Report is the unit routed through sign-off. Stage timestamps are
//! write-once: once a report has passed a stage, the timestamp for that
//! stage never changes, and rejection states are terminal.

use crate::{Department, Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Report Identifier ────────────────────────────────────────────────

/// Unique identifier for a report
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportId(pub String);

impl ReportId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Report Status ────────────────────────────────────────────────────

/// Lifecycle status of a report
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReportStatus {
    /// Being drafted, visible to the creator only
    #[default]
    Draft,
    /// Submitted and waiting for the first review stage
    Submitted,
    /// Under review by a department line manager
    ManagerReview,
    /// Passed manager review, waiting for executive review
    ManagerApproved,
    /// Under executive review
    ExecutiveReview,
    /// Fully approved
    Completed,
    /// Rejected at the manager stage
    ManagerRejected,
    /// Rejected at the executive stage
    ExecutiveRejected,
    /// Stage-unspecific rejection, present on historical records only.
    /// No transition produces or leaves this status.
    Rejected,
}

impl ReportStatus {
    /// Check if this is a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::ManagerRejected | Self::ExecutiveRejected | Self::Rejected
        )
    }

    /// Check if this is any rejection status
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::ManagerRejected | Self::ExecutiveRejected | Self::Rejected
        )
    }

    /// Canonical display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::ManagerReview => "Manager Review",
            Self::ManagerApproved => "Manager Approved",
            Self::ExecutiveReview => "Executive Review",
            Self::Completed => "Completed",
            Self::ManagerRejected => "Rejected by Manager",
            Self::ExecutiveRejected => "Rejected by Executive",
            Self::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ── Report Priority ──────────────────────────────────────────────────

/// Business priority of a report
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReportPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl ReportPriority {
    /// Canonical display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for ReportPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ── Report ───────────────────────────────────────────────────────────

/// A business report routed through multi-party sign-off
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Report {
    /// Unique report identifier
    pub id: ReportId,
    /// Report title
    pub title: String,
    /// Owning department
    pub department: Department,
    /// Who created the report
    pub creator_id: UserId,
    /// Creator role snapshot taken at creation, drives bypass routing
    pub creator_role: Role,
    /// Current lifecycle status
    pub status: ReportStatus,
    /// Business priority
    pub priority: ReportPriority,
    /// When the report was created
    pub created_at: DateTime<Utc>,
    /// When the report was last updated
    pub updated_at: DateTime<Utc>,
    /// When the report was submitted for review
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    /// When manager review approved the report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager_approved_at: Option<DateTime<Utc>>,
    /// When executive review approved the report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executive_approved_at: Option<DateTime<Utc>>,
    /// When the report reached Completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// When the report was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    /// Reason supplied by the rejecting reviewer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Optional completion deadline driving due-date reminders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl Report {
    /// Create a new report in Draft
    pub fn new(
        title: impl Into<String>,
        department: Department,
        creator_id: UserId,
        creator_role: Role,
        priority: ReportPriority,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ReportId::generate(),
            title: title.into(),
            department,
            creator_id,
            creator_role,
            status: ReportStatus::Draft,
            priority,
            created_at: now,
            updated_at: now,
            submitted_at: None,
            manager_approved_at: None,
            executive_approved_at: None,
            completed_at: None,
            rejected_at: None,
            rejection_reason: None,
            due_date: None,
        }
    }

    pub fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Reports created at manager level skip the manager review stage
    pub fn is_bypass(&self) -> bool {
        self.creator_role.is_manager_level()
    }

    /// Check if the report is in a terminal status
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move the report to `next`, stamping the stage timestamp for that
    /// status if it has not been stamped before.
    pub fn advance(&mut self, next: ReportStatus, now: DateTime<Utc>) {
        self.status = next;
        self.updated_at = now;
        match next {
            ReportStatus::Submitted => {
                self.submitted_at.get_or_insert(now);
            }
            ReportStatus::ManagerApproved => {
                self.manager_approved_at.get_or_insert(now);
            }
            ReportStatus::Completed => {
                self.executive_approved_at.get_or_insert(now);
                self.completed_at.get_or_insert(now);
            }
            status if status.is_rejection() => {
                self.rejected_at.get_or_insert(now);
            }
            _ => {}
        }
    }

    /// Record the reviewer-supplied rejection reason
    pub fn record_rejection_reason(&mut self, reason: impl Into<String>) {
        self.rejection_reason = Some(reason.into());
    }
}
