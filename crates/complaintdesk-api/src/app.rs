//! Application builder: wires repositories, auth, services, and realtime
//! into an `AppState`, then router and middleware into an Axum app.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use sqlx::PgPool;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use complaintdesk_auth::{IdentityStore, JwtDecoder, JwtEncoder, PasswordHasher, TokenVerifier};
use complaintdesk_core::config::AppConfig;
use complaintdesk_core::error::AppError;
use complaintdesk_database::repositories::{
    ComplaintRepository, MessageRepository, StatsRepository, UserRepository,
};
use complaintdesk_realtime::RealtimeCoordinator;
use complaintdesk_service::{
    AdminUserService, AuthService, CloudinaryUploader, ComplaintService, DashboardService,
    DisabledUploader, MediaUploader,
};

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the shared application state from configuration and a database pool.
pub fn build_state(config: AppConfig, db_pool: PgPool) -> Result<AppState, AppError> {
    // ── Step 1: Repositories ─────────────────────────────────────
    let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
    let complaint_repo = Arc::new(ComplaintRepository::new(db_pool.clone()));
    let message_repo = Arc::new(MessageRepository::new(db_pool.clone()));
    let stats_repo = Arc::new(StatsRepository::new(db_pool.clone()));

    // ── Step 2: Auth ─────────────────────────────────────────────
    let password_hasher = Arc::new(PasswordHasher::new(config.auth.password_min_length));
    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
    let identity_store: Arc<dyn IdentityStore> = user_repo.clone();
    let verifier = Arc::new(TokenVerifier::new(
        JwtDecoder::new(&config.auth),
        identity_store,
    ));

    // ── Step 3: Media host ───────────────────────────────────────
    let media: Arc<dyn MediaUploader> = if config.media.enabled {
        info!(folder = %config.media.folder, "Attachment uploads enabled");
        Arc::new(CloudinaryUploader::new(config.media.clone())?)
    } else {
        warn!("Attachment uploads disabled");
        Arc::new(DisabledUploader)
    };

    // ── Step 4: Services ─────────────────────────────────────────
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&user_repo),
        Arc::clone(&password_hasher),
        jwt_encoder,
    ));
    let complaint_service = Arc::new(ComplaintService::new(
        complaint_repo,
        message_repo,
        media,
    ));
    let admin_user_service = Arc::new(AdminUserService::new(
        Arc::clone(&user_repo),
        Arc::clone(&password_hasher),
    ));
    let dashboard_service = Arc::new(DashboardService::new(stats_repo));

    // ── Step 5: Realtime ─────────────────────────────────────────
    let realtime = Arc::new(RealtimeCoordinator::new(
        config.realtime.clone(),
        TokenVerifier::clone(&verifier),
    ));

    Ok(AppState {
        config: Arc::new(config),
        db_pool,
        verifier,
        realtime,
        auth_service,
        complaint_service,
        admin_user_service,
        dashboard_service,
    })
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let server = &state.config.server;
    let cors = build_cors_layer(&server.cors);
    let body_limit = server.max_body_bytes;

    build_router(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(request_logging))
}
