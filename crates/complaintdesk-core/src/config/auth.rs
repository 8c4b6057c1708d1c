//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Token TTL in hours.
    #[serde(default = "default_ttl")]
    pub jwt_ttl_hours: u64,
    /// Allowed clock skew when validating `exp`, in seconds.
    #[serde(default = "default_leeway")]
    pub jwt_leeway_seconds: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_ttl_hours: default_ttl(),
            jwt_leeway_seconds: default_leeway(),
            password_min_length: default_password_min(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_ttl() -> u64 {
    24 * 30
}

fn default_leeway() -> u64 {
    5
}

fn default_password_min() -> usize {
    6
}
