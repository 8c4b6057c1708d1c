//! Admin complaint handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use complaintdesk_core::error::AppError;
use complaintdesk_entity::complaint::{ComplaintDetail, ComplaintFilter};

use crate::dto::request::StatusUpdateRequest;
use crate::dto::response::ApiResponse;
use crate::extractors::AuthUser;
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// GET /api/admin/complaints
pub async fn list_all_complaints(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<ComplaintFilter>,
) -> Result<Json<ApiResponse<Vec<ComplaintDetail>>>, AppError> {
    require_admin(&auth)?;
    let complaints = state.complaint_service.list_all(filter).await?;
    Ok(Json(ApiResponse::ok(complaints)))
}

/// PUT /api/admin/complaints/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<ApiResponse<ComplaintDetail>>, AppError> {
    require_admin(&auth)?;
    let complaint = state
        .complaint_service
        .update_status(&auth, id, req.status)
        .await?;
    Ok(Json(ApiResponse::ok(complaint)))
}
