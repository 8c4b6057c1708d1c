//! Complaint thread message repository.

use sqlx::PgPool;
use uuid::Uuid;

use complaintdesk_core::error::{AppError, ErrorKind};
use complaintdesk_core::result::AppResult;
use complaintdesk_entity::complaint::{ComplaintMessage, MessageView};

/// Repository for complaint thread messages.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a message to a complaint thread.
    pub async fn create(
        &self,
        complaint_id: Uuid,
        sender_id: Uuid,
        text: &str,
    ) -> AppResult<ComplaintMessage> {
        sqlx::query_as::<_, ComplaintMessage>(
            "INSERT INTO complaint_messages (complaint_id, sender_id, text) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(complaint_id)
        .bind(sender_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to save message", e))
    }

    /// Load a thread, oldest first, with sender names.
    pub async fn find_by_complaint(&self, complaint_id: Uuid) -> AppResult<Vec<MessageView>> {
        sqlx::query_as::<_, MessageView>(
            "SELECT m.*, u.name AS sender_name \
             FROM complaint_messages m \
             JOIN users u ON u.id = m.sender_id \
             WHERE m.complaint_id = $1 \
             ORDER BY m.created_at ASC",
        )
        .bind(complaint_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load messages", e))
    }
}
