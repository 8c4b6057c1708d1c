//! Complaint handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use complaintdesk_core::error::AppError;
use complaintdesk_core::types::pagination::PageResponse;
use complaintdesk_entity::complaint::{Complaint, ComplaintDetail, ComplaintFilter, MessageView};

use crate::dto::request::{
    CreateComplaintRequest, MessageRequest, UpdateComplaintRequest, validate_request,
};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::extractors::{AuthUser, PaginationParams};
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// POST /api/complaints
pub async fn create_complaint(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateComplaintRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Complaint>>), AppError> {
    validate_request(&req)?;
    let complaint = state.complaint_service.create(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(complaint))))
}

/// GET /api/complaints (admin)
pub async fn list_complaints(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(filter): Query<ComplaintFilter>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<ComplaintDetail>>>, AppError> {
    require_admin(&auth)?;
    let page = state
        .complaint_service
        .list(filter, pagination.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/complaints/my
pub async fn my_complaints(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<ComplaintDetail>>>, AppError> {
    let complaints = state.complaint_service.list_mine(&auth).await?;
    Ok(Json(ApiResponse::ok(complaints)))
}

/// GET /api/complaints/{id}
pub async fn get_complaint(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ComplaintDetail>>, AppError> {
    let complaint = state.complaint_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(complaint)))
}

/// PUT /api/complaints/{id} (admin)
pub async fn update_complaint(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateComplaintRequest>,
) -> Result<Json<ApiResponse<ComplaintDetail>>, AppError> {
    require_admin(&auth)?;
    validate_request(&req)?;
    let complaint = state.complaint_service.update(&auth, id, req.into()).await?;
    Ok(Json(ApiResponse::ok(complaint)))
}

/// DELETE /api/complaints/{id} (admin)
pub async fn delete_complaint(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    require_admin(&auth)?;
    state.complaint_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Complaint deleted successfully",
    ))))
}

/// POST /api/complaints/{id}/message
pub async fn add_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<MessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MessageView>>), AppError> {
    let message = state
        .complaint_service
        .add_message(&auth, id, &req.message)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message))))
}
