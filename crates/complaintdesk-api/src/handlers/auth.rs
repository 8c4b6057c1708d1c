//! Auth handlers: register, login, profile.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use complaintdesk_core::error::AppError;
use complaintdesk_entity::user::User;

use crate::dto::request::{LoginRequest, RegisterRequest, validate_request};
use crate::dto::response::{ApiResponse, SessionResponse};
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SessionResponse>>), AppError> {
    validate_request(&req)?;
    let session = state.auth_service.register(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(session.into())),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionResponse>>, AppError> {
    validate_request(&req)?;
    let session = state.auth_service.login(req.into()).await?;
    Ok(Json(ApiResponse::ok(session.into())))
}

/// GET /api/auth/profile
pub async fn profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<User>>, AppError> {
    let user = state.auth_service.profile(&auth).await?;
    Ok(Json(ApiResponse::ok(user)))
}
