//! Maps `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiErrorResponse {
    /// Creates a body without details.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }
}

/// HTTP status and error code for an error kind.
pub fn status_for(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ErrorKind::Authentication => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        ErrorKind::Authorization => (StatusCode::FORBIDDEN, "FORBIDDEN"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
        ErrorKind::ExternalService => (StatusCode::BAD_GATEWAY, "EXTERNAL_SERVICE_ERROR"),
        ErrorKind::Internal
        | ErrorKind::Database
        | ErrorKind::Serialization
        | ErrorKind::Configuration => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code) = status_for(self.kind);

        let message = if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            tracing::error!(
                kind = %self.kind,
                error = %self.message,
                source = ?self.source,
                "Internal server error"
            );
            "Internal server error".to_string()
        } else {
            self.message
        };

        (status, Json(ApiErrorResponse::new(error_code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, ApiErrorResponse) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::Validation).0, StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::Authentication).0, StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(ErrorKind::Authorization).0, StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::Conflict).0, StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Database).1, "INTERNAL_ERROR");
    }

    #[tokio::test]
    async fn test_client_errors_keep_their_message() {
        let (status, body) = body_of(AppError::conflict("User already exists")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body.error, "CONFLICT");
        assert_eq!(body.message, "User already exists");
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) =
            body_of(AppError::database("relation \"users\" does not exist")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "INTERNAL_ERROR");
        assert_eq!(body.message, "Internal server error");
    }
}
