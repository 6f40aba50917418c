//! Approval workflow engine.
//!
//! Drives business reports through multi-party sign-off: draft intake,
//! submission, department manager review, and executive review, with a
//! per-report serialized transition path, an append-only audit trail,
//! and due-date sweeps. Each successful transition hands back a single
//! [`WorkflowEvent`](approval_types::WorkflowEvent) for notification
//! fan-out; the engine itself never touches delivery.
//!
//! # Example
//!
//! ```no_run
//! use approval_directory::InMemoryDirectory;
//! use approval_engine::{CreateReport, WorkflowEngine};
//! use approval_types::{Department, ReportPriority, Role, User, UserId};
//! use std::sync::Arc;
//!
//! # async fn example() -> approval_engine::WorkflowResult<()> {
//! let directory = Arc::new(InMemoryDirectory::with_users([
//!     User::new("ana", "Ana", Role::GeneralStaff, Department::Sales),
//!     User::new("caro", "Caro", Role::LineManager, Department::Sales),
//! ]));
//! let engine = WorkflowEngine::new(directory);
//!
//! let report = engine
//!     .create_report(CreateReport {
//!         title: "Q3 pipeline review".to_string(),
//!         creator_id: UserId::new("ana"),
//!         priority: ReportPriority::High,
//!         due_date: None,
//!     })
//!     .await?;
//! let submitted = engine.submit(&report.id, &UserId::new("ana")).await?;
//! let approved = engine
//!     .approve(&report.id, &UserId::new("caro"), None)
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod audit_trail;
pub mod engine;
pub mod error;
pub mod store;

pub use audit_trail::AuditTrail;
pub use engine::{CreateReport, EngineConfig, WorkflowEngine};
pub use error::{WorkflowError, WorkflowResult};
pub use store::ReportStore;
