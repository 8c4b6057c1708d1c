//! Attachment media host configuration.

use serde::{Deserialize, Serialize};

/// Settings for the hosted media service that stores complaint attachments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Whether attachment uploads are accepted.
    #[serde(default)]
    pub enabled: bool,
    /// Base URL of the upload API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Cloud (account) name.
    #[serde(default)]
    pub cloud_name: String,
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// API secret used to sign upload requests.
    #[serde(default)]
    pub api_secret: String,
    /// Remote folder attachments are stored in.
    #[serde(default = "default_folder")]
    pub folder: String,
    /// Maximum decoded attachment size in bytes.
    #[serde(default = "default_max_attachment")]
    pub max_attachment_bytes: usize,
    /// Upload request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: default_api_base(),
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: default_folder(),
            max_attachment_bytes: default_max_attachment(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.cloudinary.com/v1_1".to_string()
}

fn default_folder() -> String {
    "complaints_attachments".to_string()
}

fn default_max_attachment() -> usize {
    10 * 1024 * 1024
}

fn default_timeout() -> u64 {
    30
}
