//! Attachment upload to an external media host.

pub mod cloudinary;
pub mod data_uri;

use async_trait::async_trait;

use complaintdesk_core::error::AppError;

pub use cloudinary::CloudinaryUploader;
pub use data_uri::DataUri;

/// Stores an attachment and returns its public URL.
#[async_trait]
pub trait MediaUploader: Send + Sync + 'static {
    /// Upload a validated attachment.
    async fn upload(&self, attachment: &DataUri) -> Result<String, AppError>;

    /// Largest decoded attachment accepted, in bytes.
    fn max_bytes(&self) -> usize;
}

/// Uploader used when no media host is configured. Rejects every attachment.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledUploader;

#[async_trait]
impl MediaUploader for DisabledUploader {
    async fn upload(&self, _attachment: &DataUri) -> Result<String, AppError> {
        Err(AppError::validation("Attachments are not enabled"))
    }

    fn max_bytes(&self) -> usize {
        0
    }
}
