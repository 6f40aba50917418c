//! Domain types for the approval workflow layer.
//!
//! Everything that crosses a component boundary lives here: report records
//! with their status machine vocabulary, user roles and departments, the
//! workflow events handed to the notification dispatcher, and the audit
//! entries the engine appends per transition.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod action;
mod audit;
mod event;
mod report;
mod user;

pub use action::Action;
pub use audit::AuditEntry;
pub use event::{ApprovalStage, WorkflowEvent, WorkflowEventId, WorkflowEventType};
pub use report::{Report, ReportId, ReportPriority, ReportStatus};
pub use user::{Department, Role, User, UserId};
