//! Complaint use cases.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use complaintdesk_core::error::AppError;
use complaintdesk_core::types::pagination::{PageRequest, PageResponse};
use complaintdesk_database::repositories::{ComplaintRepository, MessageRepository};
use complaintdesk_entity::complaint::{
    Complaint, ComplaintCategory, ComplaintDetail, ComplaintFilter, ComplaintMessage,
    ComplaintPriority, ComplaintStatus, CreateComplaint, MessageView, UpdateComplaint,
};

use crate::context::RequestContext;
use crate::media::{DataUri, MediaUploader};

/// A complaint as submitted by its author.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewComplaint {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Category, `Other` when absent.
    pub category: Option<ComplaintCategory>,
    /// Priority, `Medium` when absent.
    pub priority: Option<ComplaintPriority>,
    /// Attachment as a base64 data URI.
    pub attachment: Option<String>,
}

/// Orchestrates complaint persistence, access checks, and attachment upload.
#[derive(Clone)]
pub struct ComplaintService {
    complaints: Arc<ComplaintRepository>,
    messages: Arc<MessageRepository>,
    media: Arc<dyn MediaUploader>,
}

impl std::fmt::Debug for ComplaintService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplaintService").finish_non_exhaustive()
    }
}

impl ComplaintService {
    /// Creates a new complaint service.
    pub fn new(
        complaints: Arc<ComplaintRepository>,
        messages: Arc<MessageRepository>,
        media: Arc<dyn MediaUploader>,
    ) -> Self {
        Self {
            complaints,
            messages,
            media,
        }
    }

    /// Files a complaint for the caller, uploading any attachment first.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: NewComplaint,
    ) -> Result<Complaint, AppError> {
        let title = input.title.trim();
        let description = input.description.trim();
        if title.is_empty() || description.is_empty() {
            return Err(AppError::validation("Title and description are required"));
        }

        let attachment = match input.attachment.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                let uri = DataUri::parse(raw, self.media.max_bytes())?;
                Some(self.media.upload(&uri).await?)
            }
            _ => None,
        };

        let complaint = self
            .complaints
            .create(&CreateComplaint {
                user_id: ctx.user_id,
                title: title.to_string(),
                description: description.to_string(),
                category: input.category.unwrap_or_default(),
                priority: input.priority.unwrap_or_default(),
                attachment,
            })
            .await?;

        info!(
            complaint_id = %complaint.id,
            code = %complaint.complaint_code,
            user_id = %ctx.user_id,
            "Complaint filed"
        );
        Ok(complaint)
    }

    /// Lists complaints one page at a time, newest first.
    pub async fn list(
        &self,
        filter: ComplaintFilter,
        page: PageRequest,
    ) -> Result<PageResponse<ComplaintDetail>, AppError> {
        self.complaints.find_page(filter, page).await
    }

    /// Lists every complaint matching `filter`, newest first.
    pub async fn list_all(&self, filter: ComplaintFilter) -> Result<Vec<ComplaintDetail>, AppError> {
        self.complaints.find_all(filter).await
    }

    /// The caller's own complaints, newest first.
    pub async fn list_mine(&self, ctx: &RequestContext) -> Result<Vec<ComplaintDetail>, AppError> {
        self.complaints.find_by_user(ctx.user_id).await
    }

    /// A complaint with its thread. Visible to its owner and to admins.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<ComplaintDetail, AppError> {
        let mut detail = self.load_detail(id).await?;
        ctx.require_owner_or_admin(detail.complaint.user_id)?;
        detail.messages = self.messages.find_by_complaint(id).await?;
        Ok(detail)
    }

    /// Applies an administrative update and returns the refreshed complaint.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        update: UpdateComplaint,
    ) -> Result<ComplaintDetail, AppError> {
        if !update.is_empty() {
            self.complaints
                .update(id, &update)
                .await?
                .ok_or_else(complaint_not_found)?;
            info!(
                complaint_id = %id,
                admin_id = %ctx.user_id,
                status = ?update.status,
                "Complaint updated"
            );
        }
        self.load_detail(id).await
    }

    /// Changes only the status of a complaint.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        status: ComplaintStatus,
    ) -> Result<ComplaintDetail, AppError> {
        self.update(
            ctx,
            id,
            UpdateComplaint {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Deletes a complaint and its thread.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<(), AppError> {
        if !self.complaints.delete(id).await? {
            return Err(complaint_not_found());
        }
        info!(complaint_id = %id, admin_id = %ctx.user_id, "Complaint deleted");
        Ok(())
    }

    /// Appends a message to a complaint thread.
    pub async fn add_message(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        text: &str,
    ) -> Result<MessageView, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::validation("Message is required"));
        }

        let complaint = self
            .complaints
            .find_by_id(id)
            .await?
            .ok_or_else(complaint_not_found)?;
        ctx.require_owner_or_admin(complaint.user_id)?;

        let message: ComplaintMessage = self.messages.create(id, ctx.user_id, text).await?;
        Ok(MessageView {
            message,
            sender_name: ctx.display_name.clone(),
        })
    }

    async fn load_detail(&self, id: Uuid) -> Result<ComplaintDetail, AppError> {
        self.complaints
            .find_detail(id)
            .await?
            .ok_or_else(complaint_not_found)
    }
}

fn complaint_not_found() -> AppError {
    AppError::not_found("Complaint not found")
}
