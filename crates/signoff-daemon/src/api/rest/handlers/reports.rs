//! Report workflow handlers

use super::actor_id;
use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use approval_engine::CreateReport;
use approval_types::{Action, AuditEntry, Report, ReportId, ReportPriority, WorkflowEvent};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// Create report request body
#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub title: String,
    #[serde(default)]
    pub priority: ReportPriority,
    pub due_date: Option<DateTime<Utc>>,
}

/// Approve request body
#[derive(Debug, Default, Deserialize)]
pub struct ApproveRequest {
    pub comment: Option<String>,
}

/// Reject request body
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
}

/// Response for workflow transitions
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub report: Report,
    pub event: WorkflowEvent,
}

/// Create a draft report
pub async fn create_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateReportRequest>,
) -> ApiResult<Json<Report>> {
    let actor = actor_id(&headers)?;
    let report = state
        .engine
        .create_report(CreateReport {
            title: body.title,
            creator_id: actor,
            priority: body.priority,
            due_date: body.due_date,
        })
        .await?;
    Ok(Json(report))
}

/// List reports visible to the caller
pub async fn list_reports(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Report>>> {
    let actor = actor_id(&headers)?;
    Ok(Json(state.engine.visible_reports(&actor).await?))
}

/// Get one report
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Report>> {
    let actor = actor_id(&headers)?;
    let report = state.engine.report_for(&actor, &ReportId::new(id)).await?;
    Ok(Json(report))
}

/// Submit a draft for review
pub async fn submit_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<TransitionResponse>> {
    let actor = actor_id(&headers)?;
    let event = state.engine.submit(&ReportId::new(id), &actor).await?;
    finish_transition(&state, event).await
}

/// Approve at the caller's review stage
pub async fn approve_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Option<Json<ApproveRequest>>,
) -> ApiResult<Json<TransitionResponse>> {
    let actor = actor_id(&headers)?;
    let comment = body.and_then(|Json(b)| b.comment);
    let event = state
        .engine
        .approve(&ReportId::new(id), &actor, comment)
        .await?;
    finish_transition(&state, event).await
}

/// Reject at the caller's review stage
pub async fn reject_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<RejectRequest>,
) -> ApiResult<Json<TransitionResponse>> {
    let actor = actor_id(&headers)?;
    let event = state
        .engine
        .reject(&ReportId::new(id), &actor, &body.reason)
        .await?;
    finish_transition(&state, event).await
}

/// Audit entries for one report, visibility-gated
pub async fn report_audit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<AuditEntry>>> {
    let actor = actor_id(&headers)?;
    let report_id = ReportId::new(id);
    state.engine.report_for(&actor, &report_id).await?;
    Ok(Json(state.engine.audit_for(&report_id)))
}

/// Actions the caller may take on one report right now
pub async fn report_actions(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<BTreeSet<Action>>> {
    let actor = actor_id(&headers)?;
    let actions = state
        .engine
        .available_actions(&actor, &ReportId::new(id))
        .await?;
    Ok(Json(actions))
}

/// The transition itself already succeeded; notification fan-out is
/// best effort and never rolls it back.
async fn finish_transition(
    state: &AppState,
    event: WorkflowEvent,
) -> ApiResult<Json<TransitionResponse>> {
    if let Err(error) = state.dispatcher.handle(&event).await {
        warn!(report_id = %event.report_id, %error, "notification dispatch failed");
    }
    let report = state.engine.report(&event.report_id)?;
    Ok(Json(TransitionResponse { report, event }))
}
