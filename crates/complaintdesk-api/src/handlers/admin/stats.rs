//! Dashboard handlers.

use axum::Json;
use axum::extract::{Query, State};

use complaintdesk_core::error::AppError;
use complaintdesk_database::repositories::stats::DailyCount;
use complaintdesk_service::admin::DashboardStats;

use crate::dto::request::ChartQuery;
use crate::dto::response::ApiResponse;
use crate::extractors::AuthUser;
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// GET /api/admin/stats
pub async fn dashboard_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    require_admin(&auth)?;
    let stats = state.dashboard_service.stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// GET /api/admin/chart-data
pub async fn chart_data(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ApiResponse<Vec<DailyCount>>>, AppError> {
    require_admin(&auth)?;
    let points = state.dashboard_service.chart_data(query.days).await?;
    Ok(Json(ApiResponse::ok(points)))
}
