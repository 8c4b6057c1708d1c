//! Signed uploads to a Cloudinary-style media API.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{error, info};

use complaintdesk_core::config::MediaConfig;
use complaintdesk_core::error::{AppError, ErrorKind};

use super::MediaUploader;
use super::data_uri::DataUri;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// Uploads attachments with an API-secret signature.
#[derive(Clone)]
pub struct CloudinaryUploader {
    client: reqwest::Client,
    config: MediaConfig,
}

impl std::fmt::Debug for CloudinaryUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryUploader")
            .field("cloud_name", &self.config.cloud_name)
            .field("folder", &self.config.folder)
            .finish()
    }
}

impl CloudinaryUploader {
    /// Build an uploader; fails if the HTTP client cannot be constructed.
    pub fn new(config: MediaConfig) -> Result<Self, AppError> {
        if config.cloud_name.is_empty() || config.api_key.is_empty() || config.api_secret.is_empty()
        {
            return Err(AppError::configuration(
                "media.cloud_name, media.api_key and media.api_secret are required when media is enabled",
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;
        Ok(Self { client, config })
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/auto/upload",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload(&self, attachment: &DataUri) -> Result<String, AppError> {
        let timestamp = Utc::now().timestamp().to_string();
        let mut params = BTreeMap::new();
        params.insert("folder", self.config.folder.as_str());
        params.insert("timestamp", timestamp.as_str());
        let signature = sign_params(&params, &self.config.api_secret);

        let mut body = serde_json::Map::new();
        for (key, value) in &params {
            body.insert((*key).to_string(), (*value).into());
        }
        body.insert("file".into(), attachment.as_str().into());
        body.insert("api_key".into(), self.config.api_key.as_str().into());
        body.insert("signature".into(), signature.into());
        body.insert("signature_algorithm".into(), "sha256".into());

        let response = self
            .client
            .post(self.upload_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Attachment upload failed", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!(status = %status, detail = %detail, "Media host rejected upload");
            return Err(AppError::external_service(format!(
                "Attachment upload failed with status {status}"
            )));
        }

        let uploaded: UploadResponse = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::ExternalService,
                "Unexpected response from media host",
                e,
            )
        })?;
        info!(mime = %attachment.mime, size = attachment.size, "Attachment uploaded");
        Ok(uploaded.secure_url)
    }

    fn max_bytes(&self) -> usize {
        self.config.max_attachment_bytes
    }
}

/// Hex SHA-256 over `k1=v1&k2=v2...` (keys sorted) followed by the secret.
pub fn sign_params(params: &BTreeMap<&str, &str>, secret: &str) -> String {
    let joined = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_order_independent_and_secret_bound() {
        let mut a = BTreeMap::new();
        a.insert("timestamp", "1700000000");
        a.insert("folder", "complaints_attachments");
        let mut b = BTreeMap::new();
        b.insert("folder", "complaints_attachments");
        b.insert("timestamp", "1700000000");

        let sig = sign_params(&a, "secret");
        assert_eq!(sig.len(), 64);
        assert_eq!(sig, sign_params(&b, "secret"));
        assert_ne!(sig, sign_params(&a, "other"));
    }

    #[test]
    fn test_signature_matches_known_digest() {
        let params = BTreeMap::from([("a", "1")]);
        assert_eq!(
            sign_params(&params, "abc"),
            "47a926eb501cb4f1740e7bbd2a13a22390ee84f8d5190fc66b85f92285549d6c"
        );

        let params = BTreeMap::from([
            ("timestamp", "1700000000"),
            ("folder", "complaints_attachments"),
        ]);
        assert_eq!(
            sign_params(&params, "secret"),
            "323c89c6a8bed01813897220111dcdd4596498222b8abdde20e2cc53bb9b0e65"
        );
    }

    #[test]
    fn test_requires_credentials() {
        let err = CloudinaryUploader::new(MediaConfig::default()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
