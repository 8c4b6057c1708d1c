//! Admin user management handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use complaintdesk_core::error::AppError;
use complaintdesk_core::types::pagination::PageResponse;
use complaintdesk_database::repositories::user::UserFilter;
use complaintdesk_entity::user::User;

use crate::dto::request::{AdminUpdateUserRequest, UserQuery, validate_request};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::extractors::{AuthUser, PaginationParams};
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<UserQuery>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<User>>>, AppError> {
    require_admin(&auth)?;
    let filter = UserFilter::from(query);
    let page = state
        .admin_user_service
        .list_users(&filter, pagination.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    require_admin(&auth)?;
    let user = state.admin_user_service.get_user(id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// PUT /api/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AdminUpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    require_admin(&auth)?;
    validate_request(&req)?;
    let user = state
        .admin_user_service
        .update_user(&auth, id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    require_admin(&auth)?;
    state.admin_user_service.delete_user(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "User deleted successfully",
    ))))
}
