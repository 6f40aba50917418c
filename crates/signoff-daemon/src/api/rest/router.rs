//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState, enable_cors: bool) -> Router {
    let api_routes = Router::new()
        // Status
        .route("/status", get(handlers::daemon_status))
        // Reports
        .route("/reports", get(handlers::list_reports))
        .route("/reports", post(handlers::create_report))
        .route("/reports/:id", get(handlers::get_report))
        .route("/reports/:id/submit", post(handlers::submit_report))
        .route("/reports/:id/approve", post(handlers::approve_report))
        .route("/reports/:id/reject", post(handlers::reject_report))
        .route("/reports/:id/audit", get(handlers::report_audit))
        .route("/reports/:id/actions", get(handlers::report_actions))
        // Notifications
        .route("/notifications", get(handlers::list_notifications))
        .route("/notifications", delete(handlers::clear_notifications))
        .route("/notifications/unread-count", get(handlers::unread_count))
        .route("/notifications/read", post(handlers::mark_many_read))
        .route("/notifications/:id/read", post(handlers::mark_read))
        .route("/notifications/:id", delete(handlers::delete_notification))
        // Live stream
        .route("/stream", get(handlers::stream_events));

    let mut app = Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    app.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approval_directory::{InMemoryDirectory, UserDirectory};
    use approval_engine::WorkflowEngine;
    use approval_types::{Department, Role, User};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use notify_dispatch::{NotificationDispatcher, NotificationService};
    use notify_hub::NotificationHub;
    use notify_store::{InMemoryNotificationStore, NotificationStore};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> Router {
        let directory: Arc<dyn UserDirectory> = Arc::new(InMemoryDirectory::with_users([
            User::new("alice", "Alice Nguyen", Role::GeneralStaff, Department::Sales),
            User::new("carol", "Carol Diaz", Role::LineManager, Department::Sales),
            User::new("erin", "Erin Sato", Role::Gm, Department::Operations),
        ]));
        let engine = Arc::new(WorkflowEngine::new(Arc::clone(&directory)));
        let store: Arc<dyn NotificationStore> = Arc::new(InMemoryNotificationStore::new());
        let hub = Arc::new(NotificationHub::new());
        let dispatcher = Arc::new(NotificationDispatcher::new(
            Arc::clone(&engine),
            Arc::clone(&directory),
            Arc::clone(&store),
            Arc::clone(&hub),
        ));
        let notifications = Arc::new(NotificationService::new(
            Arc::clone(&store),
            Arc::clone(&hub),
        ));
        let state = AppState::new(engine, directory, dispatcher, notifications, hub);
        create_router(state, true)
    }

    fn request(method: &str, uri: &str, actor: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder.header("x-actor-id", actor);
        }
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_submitted(app: &Router, creator: &str) -> String {
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/reports",
                Some(creator),
                Some(json!({"title": "Quarterly figures"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response).await;
        let id = report["id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/reports/{id}/submit"),
                Some(creator),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        id
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let app = app();
        let response = app
            .oneshot(request("GET", "/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn report_lifecycle_over_http() {
        let app = app();
        let id = create_submitted(&app, "alice").await;

        // The department manager sees and approves it.
        let response = app
            .clone()
            .oneshot(request(
                "GET",
                &format!("/api/reports/{id}"),
                Some("carol"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/reports/{id}/approve"),
                Some("carol"),
                Some(json!({"comment": "numbers check out"})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["report"]["status"], "ManagerApproved");

        let response = app
            .clone()
            .oneshot(request(
                "GET",
                &format!("/api/reports/{id}/audit"),
                Some("alice"),
                None,
            ))
            .await
            .unwrap();
        let audit = body_json(response).await;
        assert_eq!(audit.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_actor_header_is_unauthorized() {
        let app = app();
        let response = app
            .oneshot(request("GET", "/api/reports", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_actor_is_forbidden() {
        let app = app();
        let response = app
            .oneshot(request("GET", "/api/reports", Some("ghost"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn rejection_requires_a_reason() {
        let app = app();
        let id = create_submitted(&app, "alice").await;

        let response = app
            .oneshot(request(
                "POST",
                &format!("/api/reports/{id}/reject"),
                Some("carol"),
                Some(json!({"reason": "   "})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn double_submit_conflicts() {
        let app = app();
        let id = create_submitted(&app, "alice").await;

        let response = app
            .oneshot(request(
                "POST",
                &format!("/api/reports/{id}/submit"),
                Some("alice"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn submission_lands_in_the_reviewer_inbox() {
        let app = app();
        create_submitted(&app, "alice").await;

        let response = app
            .clone()
            .oneshot(request(
                "GET",
                "/api/notifications/unread-count",
                Some("carol"),
                None,
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["count"], 1);

        let response = app
            .clone()
            .oneshot(request("GET", "/api/notifications", Some("carol"), None))
            .await
            .unwrap();
        let page = body_json(response).await;
        let items = page["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        let notification_id = items[0]["id"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                &format!("/api/notifications/{notification_id}/read"),
                Some("carol"),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(request(
                "GET",
                "/api/notifications/unread-count",
                Some("carol"),
                None,
            ))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn clearing_the_inbox_reports_how_many() {
        let app = app();
        create_submitted(&app, "alice").await;
        create_submitted(&app, "alice").await;

        let response = app
            .clone()
            .oneshot(request("DELETE", "/api/notifications", Some("carol"), None))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["cleared"], 2);

        let response = app
            .oneshot(request("GET", "/api/notifications", Some("carol"), None))
            .await
            .unwrap();
        let page = body_json(response).await;
        assert!(page["items"].as_array().unwrap().is_empty());
    }
}
