//! Messages posted on a complaint thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted thread message.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ComplaintMessage {
    /// Message identifier.
    pub id: Uuid,
    /// Complaint the message belongs to.
    pub complaint_id: Uuid,
    /// Author.
    pub sender_id: Uuid,
    /// Message text.
    pub text: String,
    /// When the message was posted.
    pub created_at: DateTime<Utc>,
}

/// A thread message with its author's display name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessageView {
    /// The message row.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub message: ComplaintMessage,
    /// Author display name.
    pub sender_name: String,
}
