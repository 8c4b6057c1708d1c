//! Route definitions for the ComplaintDesk HTTP API.
//!
//! REST routes are mounted under `/api`; the realtime upgrade lives at `/ws`.

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::handlers;
use crate::state::AppState;

/// Build the Axum router with every route and the shared state attached.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(complaint_routes())
        .merge(admin_routes());

    Router::new()
        .route("/", get(handlers::health::root))
        .route("/ws", get(handlers::ws::ws_handler))
        .nest("/api", api_routes)
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}

/// Register, login, profile
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/profile", get(handlers::auth::profile))
}

fn complaint_routes() -> Router<AppState> {
    use handlers::complaint;

    Router::new()
        .route(
            "/complaints",
            post(complaint::create_complaint).get(complaint::list_complaints),
        )
        .route("/complaints/my", get(complaint::my_complaints))
        .route(
            "/complaints/{id}",
            get(complaint::get_complaint)
                .put(complaint::update_complaint)
                .delete(complaint::delete_complaint),
        )
        .route("/complaints/{id}/message", post(complaint::add_message))
}

/// Admin endpoints. Handlers enforce the Admin role.
fn admin_routes() -> Router<AppState> {
    use handlers::admin::{complaints, stats, users};

    Router::new()
        .route("/admin/users", get(users::list_users))
        .route(
            "/admin/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/admin/stats", get(stats::dashboard_stats))
        .route("/admin/chart-data", get(stats::chart_data))
        .route("/admin/complaints", get(complaints::list_all_complaints))
        .route("/admin/complaints/{id}/status", put(complaints::update_status))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::Value;
    use tower::ServiceExt;

    use complaintdesk_core::config::AppConfig;

    use crate::app::{build_app, build_state};

    const TEST_CONFIG: &str = r#"
        [database]
        url = "postgres://localhost:5432/complaintdesk_test"

        [auth]
        jwt_secret = "router-test-secret"
    "#;

    fn test_app() -> axum::Router {
        let config = AppConfig::from_toml_str(TEST_CONFIG).unwrap();
        let pool = sqlx::PgPool::connect_lazy(&config.database.url).unwrap();
        build_app(build_state(config, pool).unwrap())
    }

    async fn send(request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_root_banner() {
        let (status, body) = send(get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"Complaint Management System API is running");
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let (status, body) = send(get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_profile_without_token_is_unauthorized() {
        let (status, body) = send(get("/api/auth/profile")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "UNAUTHORIZED");
        assert_eq!(json["message"], "Not authorized, no token");
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected_before_lookup() {
        let request = Request::builder()
            .uri("/api/complaints/my")
            .header(header::AUTHORIZATION, "Bearer not.a.jwt")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Not authorized, token failed");
    }

    #[tokio::test]
    async fn test_admin_routes_require_token() {
        let (status, _) = send(get("/api/admin/stats")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_validates_before_touching_database() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"name":"Ana","email":"nope","password":"secret123"}"#,
            ))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_plain_get_on_ws_is_not_an_upgrade() {
        let (status, _) = send(get("/ws?userId=u1")).await;
        assert!(status.is_client_error());
        assert_ne!(status, StatusCode::UNAUTHORIZED);
    }
}
