//! Complaint entity model.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::category::ComplaintCategory;
use super::message::MessageView;
use super::priority::ComplaintPriority;
use super::status::ComplaintStatus;

/// Alphabet for public complaint codes (URL-safe).
const CODE_ALPHABET: &[u8; 64] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_-";
/// Length of a public complaint code.
pub const CODE_LENGTH: usize = 10;

/// A complaint filed by a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Complaint {
    /// Unique complaint identifier (also the realtime room key).
    pub id: Uuid,
    /// The complainant.
    pub user_id: Uuid,
    /// Short public reference code.
    pub complaint_code: String,
    /// Title.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Category.
    pub category: ComplaintCategory,
    /// Priority.
    pub priority: ComplaintPriority,
    /// Workflow status.
    pub status: ComplaintStatus,
    /// Hosted attachment URL.
    pub attachment: Option<String>,
    /// Administrator handling the complaint.
    pub assigned_to: Option<Uuid>,
    /// Set when the status becomes Resolved.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Administrator remarks.
    pub remarks: String,
    /// When the complaint was filed.
    pub created_at: DateTime<Utc>,
    /// When the complaint was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    /// Whether `user_id` filed this complaint.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// A complaint joined with its owner and assignee, as returned by list and detail queries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ComplaintDetail {
    /// The complaint row.
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub complaint: Complaint,
    /// Owner display name.
    pub owner_name: String,
    /// Owner email.
    pub owner_email: String,
    /// Owner department.
    pub owner_department: Option<String>,
    /// Assignee display name.
    pub assignee_name: Option<String>,
    /// Assignee email.
    pub assignee_email: Option<String>,
    /// Message thread, oldest first. Only populated by detail lookups.
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<MessageView>,
}

/// Data required to file a complaint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComplaint {
    /// The complainant.
    pub user_id: Uuid,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Category.
    pub category: ComplaintCategory,
    /// Priority.
    pub priority: ComplaintPriority,
    /// Hosted attachment URL.
    pub attachment: Option<String>,
}

/// Administrative update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateComplaint {
    /// New status.
    pub status: Option<ComplaintStatus>,
    /// New assignee.
    pub assigned_to: Option<Uuid>,
    /// New remarks.
    pub remarks: Option<String>,
}

impl UpdateComplaint {
    /// Whether the update carries no changes.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.assigned_to.is_none() && self.remarks.is_none()
    }

    /// Whether applying this update resolves the complaint.
    pub fn resolves(&self) -> bool {
        self.status == Some(ComplaintStatus::Resolved)
    }
}

/// Optional equality filters for complaint listings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ComplaintFilter {
    /// Restrict to a status.
    pub status: Option<ComplaintStatus>,
    /// Restrict to a category.
    pub category: Option<ComplaintCategory>,
    /// Restrict to a priority.
    pub priority: Option<ComplaintPriority>,
}

/// Generate a short public complaint code.
pub fn generate_complaint_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complaint_code_shape() {
        let code = generate_complaint_code();
        assert_eq!(code.len(), CODE_LENGTH);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        assert_ne!(code, generate_complaint_code());
    }

    #[test]
    fn test_every_position_spans_the_alphabet() {
        let codes: Vec<Vec<u8>> = (0..2000)
            .map(|_| generate_complaint_code().into_bytes())
            .collect();
        for position in 0..CODE_LENGTH {
            let distinct: std::collections::HashSet<u8> =
                codes.iter().map(|c| c[position]).collect();
            assert!(
                distinct.len() > 48,
                "position {position} only produced {} symbols",
                distinct.len()
            );
        }
    }

    #[test]
    fn test_update_resolves() {
        let update = UpdateComplaint {
            status: Some(ComplaintStatus::Resolved),
            ..Default::default()
        };
        assert!(update.resolves());
        assert!(!update.is_empty());
        assert!(UpdateComplaint::default().is_empty());
    }
}
