//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use complaintdesk_core::error::AppError;
use complaintdesk_database::repositories::user::UserFilter;
use complaintdesk_entity::complaint::{
    ComplaintCategory, ComplaintPriority, ComplaintStatus, UpdateComplaint,
};
use complaintdesk_entity::user::UserRole;
use complaintdesk_service::admin::AdminUserUpdate;
use complaintdesk_service::auth::service::{LoginInput, RegisterInput};
use complaintdesk_service::complaint::service::NewComplaint;

/// Runs `validator` rules and folds failures into a single validation error.
pub fn validate_request<T: Validate>(req: &T) -> Result<(), AppError> {
    req.validate()
        .map_err(|errors| AppError::validation(describe(&errors)))
}

fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("Invalid value for {field}"),
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    /// Email address.
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// Plain-text password; length policy is enforced by the hasher.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Department.
    pub department: Option<String>,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            department: req.department,
        }
    }
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl From<LoginRequest> for LoginInput {
    fn from(req: LoginRequest) -> Self {
        Self {
            email: req.email,
            password: req.password,
        }
    }
}

/// File a complaint.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateComplaintRequest {
    /// Short title.
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    /// Full description.
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    /// Category; defaults to Other.
    pub category: Option<ComplaintCategory>,
    /// Priority; defaults to Medium.
    pub priority: Option<ComplaintPriority>,
    /// Base64 data URI.
    pub attachment: Option<String>,
}

impl From<CreateComplaintRequest> for NewComplaint {
    fn from(req: CreateComplaintRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            category: req.category,
            priority: req.priority,
            attachment: req.attachment.filter(|a| !a.trim().is_empty()),
        }
    }
}

/// Administrative complaint update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateComplaintRequest {
    /// New status.
    pub status: Option<ComplaintStatus>,
    /// New assignee.
    pub assigned_to: Option<Uuid>,
    /// Admin remarks.
    #[validate(length(max = 2000, message = "Remarks are too long"))]
    pub remarks: Option<String>,
}

impl From<UpdateComplaintRequest> for UpdateComplaint {
    fn from(req: UpdateComplaintRequest) -> Self {
        Self {
            status: req.status,
            assigned_to: req.assigned_to,
            remarks: req.remarks,
        }
    }
}

/// Status-only update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    /// New status.
    pub status: ComplaintStatus,
}

/// Complaint thread message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRequest {
    /// Message text. Blank text is rejected by the service.
    #[serde(default)]
    pub message: String,
}

/// Admin user update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdminUpdateUserRequest {
    /// Display name.
    #[validate(length(max = 100, message = "Name is too long"))]
    pub name: Option<String>,
    /// Email address.
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
    /// Role.
    pub role: Option<UserRole>,
    /// Department.
    pub department: Option<String>,
    /// New password.
    pub password: Option<String>,
}

impl From<AdminUpdateUserRequest> for AdminUserUpdate {
    fn from(req: AdminUpdateUserRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            role: req.role,
            department: req.department,
            password: req.password.filter(|p| !p.is_empty()),
        }
    }
}

/// Query filters for the admin user list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserQuery {
    /// Restrict to a role.
    pub role: Option<UserRole>,
    /// Restrict to a department.
    pub department: Option<String>,
}

impl From<UserQuery> for UserFilter {
    fn from(q: UserQuery) -> Self {
        Self {
            role: q.role,
            department: q.department.filter(|d| !d.trim().is_empty()),
        }
    }
}

/// Query for the daily chart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartQuery {
    /// Number of trailing days.
    pub days: Option<u32>,
}

/// WebSocket handshake query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WsQuery {
    /// Bearer token.
    pub token: Option<String>,
    /// User id to register in presence.
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_rejects_bad_email() {
        let req = RegisterRequest {
            name: "Ana".into(),
            email: "not-an-email".into(),
            password: "secret123".into(),
            department: None,
        };
        let err = validate_request(&req).unwrap_err();
        assert_eq!(err.message, "A valid email is required");
    }

    #[test]
    fn test_messages_are_ordered_by_field() {
        let req = CreateComplaintRequest {
            title: String::new(),
            description: String::new(),
            category: None,
            priority: None,
            attachment: None,
        };
        let err = validate_request(&req).unwrap_err();
        assert_eq!(err.message, "Description is required; Title is required");
    }

    #[test]
    fn test_complaint_body_uses_display_labels() {
        let req: UpdateComplaintRequest =
            serde_json::from_str(r#"{"status":"In Progress","remarks":"on it"}"#).unwrap();
        let update: UpdateComplaint = req.into();
        assert_eq!(update.status, Some(ComplaintStatus::InProgress));
        assert!(update.assigned_to.is_none());
    }

    #[test]
    fn test_blank_attachment_is_dropped() {
        let req = CreateComplaintRequest {
            title: "Printer".into(),
            description: "Jammed".into(),
            category: Some(ComplaintCategory::Hardware),
            priority: None,
            attachment: Some("  ".into()),
        };
        let input: NewComplaint = req.into();
        assert!(input.attachment.is_none());
    }
}
