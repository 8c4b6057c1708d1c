//! `AuthUser` extractor: pulls the bearer token, verifies it, and injects context.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use complaintdesk_auth::VerifyError;
use complaintdesk_core::error::AppError;
use complaintdesk_service::context::RequestContext;

use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The token from an `Authorization: Bearer <token>` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::authentication("Not authorized, no token"))?;

        match state.verifier.verify(Some(token)).await {
            Ok(identity) => Ok(AuthUser(RequestContext::new(identity))),
            Err(VerifyError::Lookup(e)) => Err(e),
            Err(e) => {
                debug!(reason = %e, "Rejected bearer token");
                Err(AppError::authentication("Not authorized, token failed"))
            }
        }
    }
}
