//! Authorization table for the approval workflow.
//!
//! Every rule about who may move a report where lives in this crate, as
//! pure functions over `(actor, report)`. The engine validates transitions
//! here, and the notification dispatcher derives "who must act next" from
//! the same functions. A status/action pair not explicitly enumerated is
//! denied.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

use approval_types::{Action, Report, ReportStatus, Role, User};
use std::collections::BTreeSet;

// ── Transition table ─────────────────────────────────────────────────

/// Check whether `actor` may move `report` from its current status to
/// `target` in a single step. Fail closed: unlisted pairs deny.
pub fn can_transition(actor: &User, report: &Report, target: ReportStatus) -> bool {
    use ReportStatus::*;

    let bypass = report.is_bypass();
    match (report.status, target) {
        // Submission is reserved for the creator.
        (Draft, Submitted) => actor.id == report.creator_id,

        // Manager review stage, skipped entirely for bypass reports.
        (Submitted, ManagerReview) => !bypass && is_department_manager(actor, report),
        (ManagerReview, ManagerApproved) => is_department_manager(actor, report),
        (ManagerReview, ManagerRejected) => is_department_manager(actor, report),

        // Executive review stage.
        (Submitted, ExecutiveReview) => bypass && actor.role == Role::Gm,
        (ManagerApproved, ExecutiveReview) => actor.role == Role::Gm,
        (ExecutiveReview, Completed) => actor.role == Role::Gm,
        (ExecutiveReview, ExecutiveRejected) => actor.role == Role::Gm,

        _ => false,
    }
}

fn is_department_manager(actor: &User, report: &Report) -> bool {
    actor.role == Role::LineManager && actor.department == report.department
}

// ── Routing chains ───────────────────────────────────────────────────

/// The status chain a single `approve` call by `actor` would walk, ending
/// on the status the report rests in afterwards. `None` when no approval
/// is possible for this actor from the current status.
pub fn approval_hops(actor: &User, report: &Report) -> Option<Vec<ReportStatus>> {
    use ReportStatus::*;

    let chain: &[ReportStatus] = match (report.status, report.is_bypass()) {
        (Submitted, false) => &[ManagerReview, ManagerApproved],
        (Submitted, true) => &[ExecutiveReview, Completed],
        (ManagerReview, _) => &[ManagerApproved],
        (ManagerApproved, _) => &[ExecutiveReview, Completed],
        (ExecutiveReview, _) => &[Completed],
        _ => return None,
    };
    walk(actor, report, chain)
}

/// The status chain a single `reject` call by `actor` would walk. Mirrors
/// [`approval_hops`]: the rejecting reviewer must hold the same stage.
pub fn rejection_hops(actor: &User, report: &Report) -> Option<Vec<ReportStatus>> {
    use ReportStatus::*;

    let chain: &[ReportStatus] = match (report.status, report.is_bypass()) {
        (Submitted, false) => &[ManagerReview, ManagerRejected],
        (Submitted, true) => &[ExecutiveReview, ExecutiveRejected],
        (ManagerReview, _) => &[ManagerRejected],
        (ManagerApproved, _) => &[ExecutiveReview, ExecutiveRejected],
        (ExecutiveReview, _) => &[ExecutiveRejected],
        _ => return None,
    };
    walk(actor, report, chain)
}

/// Validate every hop of `chain` against the transition table, advancing a
/// probe copy of the report between hops.
fn walk(actor: &User, report: &Report, chain: &[ReportStatus]) -> Option<Vec<ReportStatus>> {
    let mut probe = report.clone();
    for &next in chain {
        if !can_transition(actor, &probe, next) {
            return None;
        }
        probe.status = next;
    }
    Some(chain.to_vec())
}

// ── Action queries ───────────────────────────────────────────────────

/// Check whether `actor` may see `report` at all.
pub fn can_view(actor: &User, report: &Report) -> bool {
    actor.id == report.creator_id
        || (actor.role == Role::LineManager && actor.department == report.department)
        || actor.role == Role::Gm
}

/// Check whether `actor` may edit `report` content. Never after terminal
/// states.
pub fn can_edit(actor: &User, report: &Report) -> bool {
    use ReportStatus::*;

    if actor.id != report.creator_id {
        return false;
    }
    match report.status {
        Draft | Submitted => true,
        // Administrative correction window for executive-authored records.
        ManagerApproved => report.creator_role == Role::Gm,
        _ => false,
    }
}

/// The complete set of actions `actor` may take on `report` right now.
pub fn available_actions(actor: &User, report: &Report) -> BTreeSet<Action> {
    let mut actions = BTreeSet::new();
    if can_view(actor, report) {
        actions.insert(Action::View);
    }
    if can_edit(actor, report) {
        actions.insert(Action::Edit);
    }
    if can_transition(actor, report, ReportStatus::Submitted) {
        actions.insert(Action::Submit);
    }
    if approval_hops(actor, report).is_some() {
        actions.insert(Action::Approve);
    }
    if rejection_hops(actor, report).is_some() {
        actions.insert(Action::Reject);
    }
    actions
}
