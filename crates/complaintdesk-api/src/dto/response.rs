//! Response DTOs.

use serde::{Deserialize, Serialize};

use complaintdesk_entity::user::User;
use complaintdesk_service::auth::AuthSession;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Token plus the account it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    /// Bearer token.
    pub token: String,
    /// Account.
    pub user: User,
}

impl From<AuthSession> for SessionResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            user: session.user,
        }
    }
}

/// Plain message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

impl MessageResponse {
    /// Wraps a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Liveness check body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" when the process is serving.
    pub status: String,
}
