//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-connection outbound queue capacity. Messages beyond it are dropped.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// When set, the `userId` handshake parameter only registers presence
    /// if it matches the identity resolved from the token.
    #[serde(default)]
    pub presence_requires_verified_identity: bool,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_buffer_size: default_outbound_buffer(),
            presence_requires_verified_identity: false,
        }
    }
}

fn default_outbound_buffer() -> usize {
    256
}
