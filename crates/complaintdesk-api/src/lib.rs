//! # complaintdesk-api
//!
//! HTTP API layer for ComplaintDesk built on Axum.
//!
//! Provides the REST endpoints, the realtime WebSocket upgrade, middleware
//! (CORS, request logging, admin guard), extractors, and DTOs.

pub mod app;
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use state::AppState;
