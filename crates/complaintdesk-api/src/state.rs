//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use complaintdesk_auth::TokenVerifier;
use complaintdesk_core::config::AppConfig;
use complaintdesk_realtime::RealtimeCoordinator;
use complaintdesk_service::{AdminUserService, AuthService, ComplaintService, DashboardService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool
    pub db_pool: PgPool,

    // ── Auth & Realtime ──────────────────────────────────────
    /// Token verifier shared by HTTP auth and the WebSocket handshake
    pub verifier: Arc<TokenVerifier>,
    /// Presence and room coordinator
    pub realtime: Arc<RealtimeCoordinator>,

    // ── Services ─────────────────────────────────────────────
    /// Registration, login, profile
    pub auth_service: Arc<AuthService>,
    /// Complaint use cases
    pub complaint_service: Arc<ComplaintService>,
    /// Admin user management
    pub admin_user_service: Arc<AdminUserService>,
    /// Dashboard aggregates
    pub dashboard_service: Arc<DashboardService>,
}
