//! Request context carrying the authenticated user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use complaintdesk_auth::Identity;
use complaintdesk_core::error::AppError;
use complaintdesk_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Built by the auth extractor from the verified identity and passed into
/// service methods so that every operation knows who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The user's display name.
    pub display_name: String,
    /// The user's current role.
    pub role: UserRole,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for a verified identity.
    pub fn new(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
            display_name: identity.display_name,
            role: identity.role,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Allows the owner of a resource or any admin.
    pub fn require_owner_or_admin(&self, owner_id: Uuid) -> Result<(), AppError> {
        if self.is_admin() || self.user_id == owner_id {
            Ok(())
        } else {
            Err(AppError::authorization("Access denied"))
        }
    }
}

impl From<Identity> for RequestContext {
    fn from(identity: Identity) -> Self {
        Self::new(identity)
    }
}
