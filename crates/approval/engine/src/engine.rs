//! The workflow engine: the single writer for report status.
//!
//! Every operation follows the same shape: resolve the actor through the
//! directory (fail closed on unknown ids), take the report's transition
//! lock, validate against the authorization table, apply the status hops,
//! append one audit entry, and hand back one `WorkflowEvent` for the
//! caller to dispatch. The engine does no notification I/O itself.

use crate::audit_trail::AuditTrail;
use crate::store::ReportStore;
use crate::{WorkflowError, WorkflowResult};
use approval_directory::UserDirectory;
use approval_types::{
    Action, ApprovalStage, AuditEntry, Report, ReportId, ReportPriority, ReportStatus, User,
    UserId, WorkflowEvent, WorkflowEventType,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;

// ── Configuration ────────────────────────────────────────────────────

/// Engine tuning knobs.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// How far ahead of a due date the sweep raises a reminder.
    pub due_soon_window_hours: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            due_soon_window_hours: 24,
        }
    }
}

/// Report intake request.
#[derive(Clone, Debug)]
pub struct CreateReport {
    pub title: String,
    pub creator_id: UserId,
    pub priority: ReportPriority,
    pub due_date: Option<DateTime<Utc>>,
}

/// Which due-date notices have already gone out for a report.
#[derive(Default)]
struct DueNotice {
    warned: bool,
    escalated: bool,
}

// ── Engine ───────────────────────────────────────────────────────────

/// The approval workflow engine.
pub struct WorkflowEngine {
    directory: Arc<dyn UserDirectory>,
    store: ReportStore,
    audit: AuditTrail,
    due_notices: DashMap<ReportId, DueNotice>,
    config: EngineConfig,
}

impl WorkflowEngine {
    /// Create an engine over the given user directory.
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self::with_config(directory, EngineConfig::default())
    }

    pub fn with_config(directory: Arc<dyn UserDirectory>, config: EngineConfig) -> Self {
        Self {
            directory,
            store: ReportStore::new(),
            audit: AuditTrail::new(),
            due_notices: DashMap::new(),
            config,
        }
    }

    // ── Intake ───────────────────────────────────────────────────────

    /// Create a draft report. The department and role snapshot come from
    /// the creator's directory record, never from the request. Drafts emit
    /// no workflow event.
    pub async fn create_report(&self, request: CreateReport) -> WorkflowResult<Report> {
        if request.title.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "report title must not be empty".to_string(),
            ));
        }
        let creator = self.require_actor(&request.creator_id).await?;

        let mut report = Report::new(
            request.title,
            creator.department,
            creator.id.clone(),
            creator.role,
            request.priority,
        );
        if let Some(due_date) = request.due_date {
            report = report.with_due_date(due_date);
        }
        self.store.insert(report.clone());

        tracing::info!(report_id = %report.id, creator = %creator.id, "report created");
        Ok(report)
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Submit a draft for review.
    pub async fn submit(
        &self,
        report_id: &ReportId,
        actor_id: &UserId,
    ) -> WorkflowResult<WorkflowEvent> {
        let actor = self.require_actor(actor_id).await?;
        let lock = self.store.transition_lock(report_id);
        let _guard = lock.lock().await;

        let mut report = self
            .store
            .get(report_id)
            .ok_or_else(|| WorkflowError::NotFound(report_id.clone()))?;
        if !approval_authz::can_transition(&actor, &report, ReportStatus::Submitted) {
            return Err(denial(&actor, &report, Action::Submit));
        }

        let from = report.status;
        report.advance(ReportStatus::Submitted, Utc::now());
        self.store.insert(report.clone());
        self.audit.append(
            report.id.clone(),
            actor.id.clone(),
            actor.role,
            Action::Submit,
            from,
            report.status,
            None,
        )?;

        tracing::info!(report_id = %report.id, actor = %actor.id, "report submitted");
        Ok(WorkflowEvent::for_report(
            WorkflowEventType::Submission,
            &report,
            actor.id,
            actor.role,
        ))
    }

    /// Approve a report at its current stage. A single call walks every
    /// hop the authorization table allows for this actor, so a manager
    /// approving a freshly submitted report routes it through review and
    /// out the other side in one serialized operation.
    pub async fn approve(
        &self,
        report_id: &ReportId,
        actor_id: &UserId,
        comment: Option<String>,
    ) -> WorkflowResult<WorkflowEvent> {
        let actor = self.require_actor(actor_id).await?;
        let lock = self.store.transition_lock(report_id);
        let _guard = lock.lock().await;

        let mut report = self
            .store
            .get(report_id)
            .ok_or_else(|| WorkflowError::NotFound(report_id.clone()))?;
        let hops = approval_authz::approval_hops(&actor, &report)
            .ok_or_else(|| denial(&actor, &report, Action::Approve))?;

        let from = report.status;
        let now = Utc::now();
        for &next in &hops {
            report.advance(next, now);
        }
        self.store.insert(report.clone());
        self.audit.append(
            report.id.clone(),
            actor.id.clone(),
            actor.role,
            Action::Approve,
            from,
            report.status,
            comment.clone(),
        )?;

        let is_final = report.status == ReportStatus::Completed;
        let stage = if is_final {
            ApprovalStage::Executive
        } else {
            ApprovalStage::Manager
        };
        tracing::info!(
            report_id = %report.id,
            actor = %actor.id,
            from = %from,
            to = %report.status,
            "report approved"
        );

        let mut event =
            WorkflowEvent::for_report(WorkflowEventType::Approved, &report, actor.id, actor.role)
                .with_stage(stage, is_final);
        if let Some(comment) = comment {
            event = event.with_comment(comment);
        }
        Ok(event)
    }

    /// Reject a report at its current stage. The reason is mandatory and
    /// is validated before anything else, so a bad call leaves the report
    /// untouched.
    pub async fn reject(
        &self,
        report_id: &ReportId,
        actor_id: &UserId,
        reason: &str,
    ) -> WorkflowResult<WorkflowEvent> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(WorkflowError::Validation(
                "rejection reason must not be empty".to_string(),
            ));
        }

        let actor = self.require_actor(actor_id).await?;
        let lock = self.store.transition_lock(report_id);
        let _guard = lock.lock().await;

        let mut report = self
            .store
            .get(report_id)
            .ok_or_else(|| WorkflowError::NotFound(report_id.clone()))?;
        let hops = approval_authz::rejection_hops(&actor, &report)
            .ok_or_else(|| denial(&actor, &report, Action::Reject))?;

        let from = report.status;
        let now = Utc::now();
        for &next in &hops {
            report.advance(next, now);
        }
        report.record_rejection_reason(reason);
        self.store.insert(report.clone());
        self.audit.append(
            report.id.clone(),
            actor.id.clone(),
            actor.role,
            Action::Reject,
            from,
            report.status,
            Some(reason.to_string()),
        )?;

        let stage = if report.status == ReportStatus::ExecutiveRejected {
            ApprovalStage::Executive
        } else {
            ApprovalStage::Manager
        };
        tracing::info!(
            report_id = %report.id,
            actor = %actor.id,
            from = %from,
            to = %report.status,
            "report rejected"
        );

        Ok(
            WorkflowEvent::for_report(WorkflowEventType::Rejected, &report, actor.id, actor.role)
                .with_stage(stage, true)
                .with_reason(reason),
        )
    }

    // ── Due-date sweep ───────────────────────────────────────────────

    /// Scan in-flight reports against their due dates. Returns one
    /// `DueDate` event per report entering the warning window and one
    /// `Escalation` per report past due; each fires at most once per
    /// report. Pure detection, the caller dispatches.
    pub fn check_due_dates(&self, now: DateTime<Utc>) -> Vec<WorkflowEvent> {
        let window = Duration::hours(self.config.due_soon_window_hours);
        let mut events = Vec::new();

        for report in self.store.all() {
            if report.is_terminal() || report.status == ReportStatus::Draft {
                continue;
            }
            let Some(due_date) = report.due_date else {
                continue;
            };
            let mut notice = self.due_notices.entry(report.id.clone()).or_default();

            if now >= due_date {
                if !notice.escalated {
                    notice.escalated = true;
                    let days_overdue = (now - due_date).num_days().max(0);
                    tracing::warn!(
                        report_id = %report.id,
                        days_overdue,
                        "report overdue, escalating"
                    );
                    events.push(
                        WorkflowEvent::for_report(
                            WorkflowEventType::Escalation,
                            &report,
                            report.creator_id.clone(),
                            report.creator_role,
                        )
                        .with_due_date(due_date)
                        .with_days_overdue(days_overdue),
                    );
                }
            } else if due_date - now <= window && !notice.warned {
                notice.warned = true;
                events.push(
                    WorkflowEvent::for_report(
                        WorkflowEventType::DueDate,
                        &report,
                        report.creator_id.clone(),
                        report.creator_role,
                    )
                    .with_due_date(due_date),
                );
            }
        }

        events.sort_by(|a, b| a.report_id.cmp(&b.report_id));
        events
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Fetch a report without a visibility check. For trusted internal
    /// callers such as the dispatcher; user-facing paths go through
    /// [`WorkflowEngine::report_for`].
    pub fn report(&self, report_id: &ReportId) -> WorkflowResult<Report> {
        self.store
            .get(report_id)
            .ok_or_else(|| WorkflowError::NotFound(report_id.clone()))
    }

    /// Fetch a report on behalf of an actor, enforcing view rules.
    pub async fn report_for(
        &self,
        actor_id: &UserId,
        report_id: &ReportId,
    ) -> WorkflowResult<Report> {
        let actor = self.require_actor(actor_id).await?;
        let report = self
            .store
            .get(report_id)
            .ok_or_else(|| WorkflowError::NotFound(report_id.clone()))?;
        if !approval_authz::can_view(&actor, &report) {
            return Err(WorkflowError::Unauthorized {
                actor: actor.id,
                action: Action::View,
            });
        }
        Ok(report)
    }

    /// Every report the actor may see, most recently updated first.
    pub async fn visible_reports(&self, actor_id: &UserId) -> WorkflowResult<Vec<Report>> {
        let actor = self.require_actor(actor_id).await?;
        let mut reports: Vec<Report> = self
            .store
            .all()
            .into_iter()
            .filter(|r| approval_authz::can_view(&actor, r))
            .collect();
        reports.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(reports)
    }

    /// The actions an actor may take on a report right now.
    pub async fn available_actions(
        &self,
        actor_id: &UserId,
        report_id: &ReportId,
    ) -> WorkflowResult<BTreeSet<Action>> {
        let actor = self.require_actor(actor_id).await?;
        let report = self
            .store
            .get(report_id)
            .ok_or_else(|| WorkflowError::NotFound(report_id.clone()))?;
        Ok(approval_authz::available_actions(&actor, &report))
    }

    /// Audit entries for one report, in append order.
    pub fn audit_for(&self, report_id: &ReportId) -> Vec<AuditEntry> {
        self.audit.for_report(report_id)
    }

    /// Total reports known to the engine.
    pub fn report_count(&self) -> usize {
        self.store.len()
    }

    // ── Internal ─────────────────────────────────────────────────────

    async fn require_actor(&self, id: &UserId) -> WorkflowResult<User> {
        self.directory
            .get_user(id)
            .await?
            .ok_or_else(|| WorkflowError::UnknownActor(id.clone()))
    }
}

/// Pick the right refusal: a status that admits the action for somebody
/// is an authorization failure for this actor; a status that admits it
/// for nobody is an invalid transition.
fn denial(actor: &User, report: &Report, action: Action) -> WorkflowError {
    use ReportStatus::*;

    let status_eligible = match action {
        Action::Submit => report.status == Draft,
        Action::Approve | Action::Reject => matches!(
            report.status,
            Submitted | ManagerReview | ManagerApproved | ExecutiveReview
        ),
        Action::View | Action::Edit => true,
    };
    if status_eligible {
        tracing::warn!(
            report_id = %report.id,
            actor = %actor.id,
            action = %action,
            "operation denied"
        );
        WorkflowError::Unauthorized {
            actor: actor.id.clone(),
            action,
        }
    } else {
        WorkflowError::InvalidTransition {
            from: report.status,
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approval_directory::InMemoryDirectory;
    use approval_types::{Department, Role};

    fn make_directory() -> Arc<InMemoryDirectory> {
        Arc::new(InMemoryDirectory::with_users([
            User::new("staff-1", "Ana", Role::GeneralStaff, Department::Sales),
            User::new("staff-2", "Ben", Role::GeneralStaff, Department::Sales),
            User::new("mgr-sales", "Caro", Role::LineManager, Department::Sales),
            User::new("mgr-ops", "Dee", Role::LineManager, Department::Operations),
            User::new("gm-1", "Eli", Role::Gm, Department::Operations),
        ]))
    }

    fn make_engine() -> WorkflowEngine {
        WorkflowEngine::new(make_directory())
    }

    fn intake(creator: &str) -> CreateReport {
        CreateReport {
            title: "Quarterly summary".to_string(),
            creator_id: UserId::new(creator),
            priority: ReportPriority::Medium,
            due_date: None,
        }
    }

    async fn submitted_report(engine: &WorkflowEngine, creator: &str) -> Report {
        let report = engine.create_report(intake(creator)).await.unwrap();
        engine
            .submit(&report.id, &UserId::new(creator))
            .await
            .unwrap();
        engine.report(&report.id).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_submit() {
        let engine = make_engine();
        let report = engine.create_report(intake("staff-1")).await.unwrap();
        assert_eq!(report.status, ReportStatus::Draft);
        assert_eq!(report.department, Department::Sales);

        let event = engine
            .submit(&report.id, &UserId::new("staff-1"))
            .await
            .unwrap();
        assert_eq!(event.event_type, WorkflowEventType::Submission);

        let stored = engine.report(&report.id).unwrap();
        assert_eq!(stored.status, ReportStatus::Submitted);
        assert!(stored.submitted_at.is_some());

        let audit = engine.audit_for(&report.id);
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, Action::Submit);
        assert_eq!(audit[0].from, ReportStatus::Draft);
        assert_eq!(audit[0].to, ReportStatus::Submitted);
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let engine = make_engine();
        let mut request = intake("staff-1");
        request.title = "   ".to_string();
        let result = engine.create_report(request).await;
        assert!(matches!(result, Err(WorkflowError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_actor_fails_closed() {
        let engine = make_engine();
        let result = engine.create_report(intake("ghost")).await;
        assert!(matches!(result, Err(WorkflowError::UnknownActor(_))));

        let report = engine.create_report(intake("staff-1")).await.unwrap();
        let result = engine.submit(&report.id, &UserId::new("ghost")).await;
        assert!(matches!(result, Err(WorkflowError::UnknownActor(_))));
    }

    #[tokio::test]
    async fn test_only_creator_submits() {
        let engine = make_engine();
        let report = engine.create_report(intake("staff-1")).await.unwrap();

        let result = engine.submit(&report.id, &UserId::new("staff-2")).await;
        assert!(matches!(result, Err(WorkflowError::Unauthorized { .. })));

        // Status unchanged, nothing audited.
        assert_eq!(
            engine.report(&report.id).unwrap().status,
            ReportStatus::Draft
        );
        assert!(engine.audit_for(&report.id).is_empty());
    }

    #[tokio::test]
    async fn test_double_submit_is_invalid_transition() {
        let engine = make_engine();
        let report = submitted_report(&engine, "staff-1").await;
        let result = engine.submit(&report.id, &UserId::new("staff-1")).await;
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition {
                from: ReportStatus::Submitted,
                action: Action::Submit,
            })
        ));
    }

    #[tokio::test]
    async fn test_manager_approve_routes_through_review() {
        let engine = make_engine();
        let report = submitted_report(&engine, "staff-1").await;

        let event = engine
            .approve(
                &report.id,
                &UserId::new("mgr-sales"),
                Some("looks good".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(event.event_type, WorkflowEventType::Approved);
        assert_eq!(event.stage(), Some(ApprovalStage::Manager));
        assert!(!event.is_final());
        assert_eq!(event.comment(), Some("looks good"));

        let stored = engine.report(&report.id).unwrap();
        assert_eq!(stored.status, ReportStatus::ManagerApproved);
        assert!(stored.manager_approved_at.is_some());

        // One call, one audit entry spanning the whole route.
        let audit = engine.audit_for(&report.id);
        assert_eq!(audit.len(), 2);
        assert_eq!(audit[1].action, Action::Approve);
        assert_eq!(audit[1].from, ReportStatus::Submitted);
        assert_eq!(audit[1].to, ReportStatus::ManagerApproved);
        assert_eq!(audit[1].note.as_deref(), Some("looks good"));
    }

    #[tokio::test]
    async fn test_wrong_department_manager_is_unauthorized() {
        let engine = make_engine();
        let report = submitted_report(&engine, "staff-1").await;
        let result = engine
            .approve(&report.id, &UserId::new("mgr-ops"), None)
            .await;
        assert!(matches!(result, Err(WorkflowError::Unauthorized { .. })));
    }

    #[tokio::test]
    async fn test_executive_approval_completes() {
        let engine = make_engine();
        let report = submitted_report(&engine, "staff-1").await;
        engine
            .approve(&report.id, &UserId::new("mgr-sales"), None)
            .await
            .unwrap();

        let event = engine
            .approve(&report.id, &UserId::new("gm-1"), None)
            .await
            .unwrap();
        assert_eq!(event.stage(), Some(ApprovalStage::Executive));
        assert!(event.is_final());

        let stored = engine.report(&report.id).unwrap();
        assert_eq!(stored.status, ReportStatus::Completed);
        assert!(stored.executive_approved_at.is_some());
        assert!(stored.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_bypass_report_skips_manager_stage() {
        let engine = make_engine();
        let report = submitted_report(&engine, "mgr-sales").await;
        assert!(report.is_bypass());

        // The department manager path is closed on a bypass report.
        let result = engine
            .approve(&report.id, &UserId::new("mgr-sales"), None)
            .await;
        assert!(matches!(result, Err(WorkflowError::Unauthorized { .. })));

        let event = engine
            .approve(&report.id, &UserId::new("gm-1"), None)
            .await
            .unwrap();
        assert!(event.is_final());

        let stored = engine.report(&report.id).unwrap();
        assert_eq!(stored.status, ReportStatus::Completed);
        assert!(stored.manager_approved_at.is_none());

        for entry in engine.audit_for(&report.id) {
            assert_ne!(entry.to, ReportStatus::ManagerReview);
            assert_ne!(entry.to, ReportStatus::ManagerApproved);
        }
    }

    #[tokio::test]
    async fn test_reject_requires_reason() {
        let engine = make_engine();
        let report = submitted_report(&engine, "staff-1").await;

        for bad in ["", "   ", "\t\n"] {
            let result = engine
                .reject(&report.id, &UserId::new("mgr-sales"), bad)
                .await;
            assert!(matches!(result, Err(WorkflowError::Validation(_))));
        }
        // Status untouched by the failed calls.
        assert_eq!(
            engine.report(&report.id).unwrap().status,
            ReportStatus::Submitted
        );
    }

    #[tokio::test]
    async fn test_manager_rejection_from_submitted() {
        let engine = make_engine();
        let report = submitted_report(&engine, "staff-1").await;

        let event = engine
            .reject(&report.id, &UserId::new("mgr-sales"), "incomplete")
            .await
            .unwrap();
        assert_eq!(event.event_type, WorkflowEventType::Rejected);
        assert_eq!(event.stage(), Some(ApprovalStage::Manager));
        assert_eq!(event.reason(), Some("incomplete"));

        let stored = engine.report(&report.id).unwrap();
        assert_eq!(stored.status, ReportStatus::ManagerRejected);
        assert_eq!(stored.rejection_reason.as_deref(), Some("incomplete"));
        assert!(stored.rejected_at.is_some());
    }

    #[tokio::test]
    async fn test_executive_rejection() {
        let engine = make_engine();
        let report = submitted_report(&engine, "staff-1").await;
        engine
            .approve(&report.id, &UserId::new("mgr-sales"), None)
            .await
            .unwrap();

        let event = engine
            .reject(&report.id, &UserId::new("gm-1"), "budget frozen")
            .await
            .unwrap();
        assert_eq!(event.stage(), Some(ApprovalStage::Executive));

        let stored = engine.report(&report.id).unwrap();
        assert_eq!(stored.status, ReportStatus::ExecutiveRejected);
    }

    #[tokio::test]
    async fn test_terminal_states_absorb() {
        let engine = make_engine();
        let report = submitted_report(&engine, "mgr-sales").await;
        engine
            .approve(&report.id, &UserId::new("gm-1"), None)
            .await
            .unwrap();

        let result = engine.approve(&report.id, &UserId::new("gm-1"), None).await;
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition {
                from: ReportStatus::Completed,
                action: Action::Approve,
            })
        ));
        let result = engine
            .reject(&report.id, &UserId::new("gm-1"), "too late")
            .await;
        assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_unknown_report() {
        let engine = make_engine();
        let missing = ReportId::new("missing");
        let result = engine.submit(&missing, &UserId::new("staff-1")).await;
        assert!(matches!(result, Err(WorkflowError::NotFound(_))));
        let result = engine.report(&missing);
        assert!(matches!(result, Err(WorkflowError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_visibility_rules() {
        let engine = make_engine();
        let report = submitted_report(&engine, "staff-1").await;

        // Creator, department manager, and GM see it.
        for viewer in ["staff-1", "mgr-sales", "gm-1"] {
            let visible = engine.visible_reports(&UserId::new(viewer)).await.unwrap();
            assert_eq!(visible.len(), 1, "{viewer} should see the report");
        }
        // Unrelated staff and other-department managers do not.
        for viewer in ["staff-2", "mgr-ops"] {
            let visible = engine.visible_reports(&UserId::new(viewer)).await.unwrap();
            assert!(visible.is_empty(), "{viewer} should not see the report");
            let result = engine.report_for(&UserId::new(viewer), &report.id).await;
            assert!(matches!(result, Err(WorkflowError::Unauthorized { .. })));
        }
    }

    #[tokio::test]
    async fn test_available_actions_surface() {
        let engine = make_engine();
        let report = submitted_report(&engine, "staff-1").await;

        let actions = engine
            .available_actions(&UserId::new("mgr-sales"), &report.id)
            .await
            .unwrap();
        assert!(actions.contains(&Action::Approve));
        assert!(actions.contains(&Action::Reject));

        let actions = engine
            .available_actions(&UserId::new("staff-1"), &report.id)
            .await
            .unwrap();
        assert!(!actions.contains(&Action::Approve));
        assert!(actions.contains(&Action::View));
    }

    #[tokio::test]
    async fn test_due_sweep_warns_once_then_escalates_once() {
        let engine = make_engine();
        let now = Utc::now();
        let mut request = intake("staff-1");
        request.due_date = Some(now + Duration::hours(2));
        let report = engine.create_report(request).await.unwrap();
        engine
            .submit(&report.id, &UserId::new("staff-1"))
            .await
            .unwrap();

        // Inside the 24h warning window.
        let events = engine.check_due_dates(now);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, WorkflowEventType::DueDate);

        // Warning already sent.
        assert!(engine.check_due_dates(now).is_empty());

        // Past due: a single escalation.
        let later = now + Duration::hours(3);
        let events = engine.check_due_dates(later);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, WorkflowEventType::Escalation);
        assert!(engine.check_due_dates(later).is_empty());
    }

    #[tokio::test]
    async fn test_due_sweep_skips_drafts_and_terminal() {
        let engine = make_engine();
        let now = Utc::now();

        // Overdue draft: no event until submitted.
        let mut request = intake("staff-1");
        request.due_date = Some(now - Duration::hours(1));
        let draft = engine.create_report(request).await.unwrap();
        assert!(engine.check_due_dates(now).is_empty());

        // Rejected report with a due date: terminal, no event.
        engine
            .submit(&draft.id, &UserId::new("staff-1"))
            .await
            .unwrap();
        engine
            .reject(&draft.id, &UserId::new("mgr-sales"), "stale")
            .await
            .unwrap();
        assert!(engine.check_due_dates(now).is_empty());
    }
}
