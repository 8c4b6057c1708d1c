//! Token verification errors.

use thiserror::Error;
use uuid::Uuid;

use complaintdesk_core::error::AppError;

/// Why a token was rejected before any identity lookup happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No token was presented.
    #[error("Authentication token missing")]
    MissingToken,
    /// The token is not a well-formed JWT.
    #[error("Malformed token")]
    Malformed,
    /// The token's `exp` is in the past.
    #[error("Token has expired")]
    Expired,
    /// The token was signed with a key this server does not recognize.
    #[error("Invalid token signature")]
    InvalidSignature,
    /// Any other validation failure.
    #[error("Token validation failed: {0}")]
    Invalid(String),
}

/// Failure of [`TokenVerifier::verify`](crate::TokenVerifier::verify).
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The token itself was rejected.
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// The token is valid but its subject no longer exists.
    #[error("User {0} not found")]
    NotFound(Uuid),
    /// The identity store could not be queried.
    #[error("Identity lookup failed: {0}")]
    Lookup(#[source] AppError),
}

impl VerifyError {
    /// Whether the failure lies with the presented credentials rather than the server.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Lookup(_))
    }
}

impl From<VerifyError> for AppError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Auth(e) => AppError::authentication(e.to_string()),
            VerifyError::NotFound(_) => AppError::not_found("User not found"),
            VerifyError::Lookup(e) => e,
        }
    }
}
