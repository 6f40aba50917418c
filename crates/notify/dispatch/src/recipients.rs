//! Recipient computation.
//!
//! Who hears about a workflow event. Reviewer audiences are derived
//! from the authorization table: "whoever may approve this report right
//! now", never a hardcoded role list, so routing changes in one place.

use crate::DispatchResult;
use approval_directory::UserDirectory;
use approval_types::{
    Action, Department, Report, Role, User, UserId, WorkflowEvent, WorkflowEventType,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;

/// Resolve the users a workflow event addresses, in notification order
/// and with duplicates removed.
pub async fn recipients_for(
    event: &WorkflowEvent,
    report: &Report,
    directory: &Arc<dyn UserDirectory>,
    stakeholders: &HashMap<Department, Vec<UserId>>,
) -> DispatchResult<Vec<User>> {
    let mut recipients = Vec::new();
    match event.event_type {
        WorkflowEventType::Submission => {
            push_creator(&mut recipients, report, directory).await?;
            recipients.extend(pending_reviewers(report, directory).await?);
        }
        WorkflowEventType::Approved if event.is_final() => {
            push_creator(&mut recipients, report, directory).await?;
            recipients
                .extend(resolve_stakeholders(report.department, stakeholders, directory).await?);
        }
        WorkflowEventType::Approved => {
            push_creator(&mut recipients, report, directory).await?;
            recipients.extend(pending_reviewers(report, directory).await?);
        }
        WorkflowEventType::Rejected | WorkflowEventType::DueDate => {
            push_creator(&mut recipients, report, directory).await?;
        }
        WorkflowEventType::Escalation => {
            recipients.extend(management(report, directory).await?);
        }
    }
    Ok(dedup(recipients))
}

async fn push_creator(
    recipients: &mut Vec<User>,
    report: &Report,
    directory: &Arc<dyn UserDirectory>,
) -> DispatchResult<()> {
    match directory.get_user(&report.creator_id).await? {
        Some(user) => recipients.push(user),
        None => warn!(
            report_id = %report.id,
            creator = %report.creator_id,
            "report creator missing from directory"
        ),
    }
    Ok(())
}

/// Users who may approve the report in its current status.
async fn pending_reviewers(
    report: &Report,
    directory: &Arc<dyn UserDirectory>,
) -> DispatchResult<Vec<User>> {
    let mut candidates = directory
        .users_in_department(report.department, Role::LineManager)
        .await?;
    candidates.extend(directory.users_with_role(Role::Gm).await?);
    candidates.retain(|c| approval_authz::available_actions(c, report).contains(&Action::Approve));
    Ok(candidates)
}

/// Department line managers plus every general manager.
async fn management(
    report: &Report,
    directory: &Arc<dyn UserDirectory>,
) -> DispatchResult<Vec<User>> {
    let mut users = directory
        .users_in_department(report.department, Role::LineManager)
        .await?;
    users.extend(directory.users_with_role(Role::Gm).await?);
    Ok(users)
}

async fn resolve_stakeholders(
    department: Department,
    stakeholders: &HashMap<Department, Vec<UserId>>,
    directory: &Arc<dyn UserDirectory>,
) -> DispatchResult<Vec<User>> {
    let Some(ids) = stakeholders.get(&department) else {
        return Ok(Vec::new());
    };
    let mut users = Vec::with_capacity(ids.len());
    for id in ids {
        match directory.get_user(id).await? {
            Some(user) => users.push(user),
            None => warn!(user = %id, "configured stakeholder missing from directory"),
        }
    }
    Ok(users)
}

fn dedup(users: Vec<User>) -> Vec<User> {
    let mut seen = HashSet::new();
    users
        .into_iter()
        .filter(|u| seen.insert(u.id.clone()))
        .collect()
}
