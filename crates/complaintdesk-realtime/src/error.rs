//! Realtime error taxonomy.

use thiserror::Error;

use complaintdesk_auth::VerifyError;

use crate::connection::ConnectionId;

/// Errors raised while establishing or serving a realtime connection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RealtimeError {
    /// Token missing, invalid, or expired. The handshake is refused.
    #[error("{0}")]
    Auth(String),
    /// The token subject does not exist. The handshake is refused.
    #[error("{0}")]
    NotFound(String),
    /// An outbound event could not be queued. The event is dropped.
    #[error("Failed to deliver to connection {connection}: {reason}")]
    Transport {
        /// Target connection.
        connection: ConnectionId,
        /// Why delivery failed.
        reason: String,
    },
    /// An inbound frame could not be decoded. The frame is dropped.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),
}

impl RealtimeError {
    /// Short machine-readable tag sent to clients on refusal.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Auth(_) => "AUTH_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::MalformedEvent(_) => "MALFORMED_EVENT",
        }
    }

    /// Whether this error means the handshake must be refused.
    pub fn refuses_handshake(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::NotFound(_))
    }
}

impl From<VerifyError> for RealtimeError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::Auth(e) => Self::Auth(e.to_string()),
            VerifyError::NotFound(_) => Self::NotFound("User not found".to_string()),
            // The caller cannot be authenticated either way; the cause is logged upstream.
            VerifyError::Lookup(_) => Self::Auth("Authentication error".to_string()),
        }
    }
}
