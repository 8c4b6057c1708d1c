//! Health check handlers.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use complaintdesk_realtime::metrics::MetricsSnapshot;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /
pub async fn root() -> &'static str {
    "Complaint Management System API is running"
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Database reachability and realtime counters.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedHealthResponse {
    /// "ok" or "degraded".
    pub status: String,
    /// "connected" or "unreachable".
    pub database: String,
    /// Open WebSocket connections.
    pub ws_connections: usize,
    /// Users currently in the presence list.
    pub online_users: usize,
    /// Realtime counters since start.
    pub realtime: MetricsSnapshot,
    /// Crate version.
    pub version: String,
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let db_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db_pool)
        .await
        .is_ok();

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: if db_ok { "ok" } else { "degraded" }.to_string(),
        database: if db_ok { "connected" } else { "unreachable" }.to_string(),
        ws_connections: state.realtime.connection_count(),
        online_users: state.realtime.online_user_ids().await.len(),
        realtime: state.realtime.metrics(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
