//! Live notification stream via SSE

use super::actor_id;
use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use approval_engine::WorkflowError;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream::{self, Stream};
use notify_hub::{ConnectionId, NotificationHub};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

/// Stream query params
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    /// Client-chosen connection id; reconnecting with the same id
    /// replaces the previous registration instead of stacking a second
    /// one.
    pub connection_id: Option<String>,
}

/// Subscribe the caller to their live notification feed
pub async fn stream_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StreamQuery>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let actor = actor_id(&headers)?;
    let user = state
        .directory
        .get_user(&actor)
        .await
        .map_err(WorkflowError::from)?
        .ok_or(WorkflowError::UnknownActor(actor))?;

    let connection_id = match query.connection_id {
        Some(id) => ConnectionId::new(id),
        None => ConnectionId::generate(),
    };

    let receiver = state
        .hub
        .register(user.id.clone(), user.department, connection_id.clone())
        .await;
    let guard = StreamGuard {
        hub: Arc::clone(&state.hub),
        connection_id,
    };

    let stream = stream::unfold((receiver, guard), |(mut receiver, guard)| async move {
        match receiver.recv().await {
            Some(event) => {
                let data = serde_json::to_string(&event).unwrap_or_default();
                let sse_event = Event::default().event(event.name()).data(data);
                Some((Ok(sse_event), (receiver, guard)))
            }
            // The hub dropped the sender side, typically because a new
            // connection with the same id replaced this one.
            None => None,
        }
    });

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    ))
}

/// Unregisters the connection when the client goes away.
struct StreamGuard {
    hub: Arc<NotificationHub>,
    connection_id: ConnectionId,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        let hub = Arc::clone(&self.hub);
        let connection_id = self.connection_id.clone();
        tokio::spawn(async move {
            hub.unregister(&connection_id).await;
        });
    }
}
