//! Notification inbox handlers

use super::actor_id;
use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use notify_store::NotificationPage;
use notify_types::{Notification, NotificationFilter, NotificationId};
use serde::{Deserialize, Serialize};

/// Unread count response
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: usize,
}

/// Batch mark-read request body
#[derive(Debug, Deserialize)]
pub struct MarkManyReadRequest {
    pub ids: Vec<NotificationId>,
}

/// Batch mark-read response
#[derive(Debug, Serialize)]
pub struct MarkedResponse {
    pub marked: usize,
}

/// Clear-all response
#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub cleared: usize,
}

/// List the caller's notifications, filtered and paged
pub async fn list_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<NotificationFilter>,
) -> ApiResult<Json<NotificationPage>> {
    let actor = actor_id(&headers)?;
    Ok(Json(state.notifications.list(&actor, &filter).await?))
}

/// Unread notification count
pub async fn unread_count(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<UnreadCountResponse>> {
    let actor = actor_id(&headers)?;
    let count = state.notifications.unread_count(&actor).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// Mark one notification read
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<Notification>> {
    let actor = actor_id(&headers)?;
    let notification = state
        .notifications
        .mark_read(&actor, &NotificationId::new(id))
        .await?;
    Ok(Json(notification))
}

/// Mark a batch of notifications read
pub async fn mark_many_read(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<MarkManyReadRequest>,
) -> ApiResult<Json<MarkedResponse>> {
    let actor = actor_id(&headers)?;
    let marked = state.notifications.mark_many_read(&actor, &body.ids).await?;
    Ok(Json(MarkedResponse { marked }))
}

/// Delete one notification
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let actor = actor_id(&headers)?;
    state
        .notifications
        .delete(&actor, &NotificationId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete every notification the caller has
pub async fn clear_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ClearedResponse>> {
    let actor = actor_id(&headers)?;
    let cleared = state.notifications.clear_all(&actor).await?;
    Ok(Json(ClearedResponse { cleared }))
}
