//! Identity resolution for verified token subjects.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use complaintdesk_core::result::AppResult;
use complaintdesk_database::repositories::UserRepository;
use complaintdesk_entity::user::{User, UserRole};

/// The authenticated principal behind a request or realtime connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User identifier.
    pub user_id: Uuid,
    /// Display name.
    pub display_name: String,
    /// Role at lookup time.
    pub role: UserRole,
}

impl Identity {
    /// Whether this identity carries admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            display_name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Looks up the current state of a user by id.
#[async_trait]
pub trait IdentityStore: Send + Sync + 'static {
    /// Return the identity for `user_id`, or `None` if the user does not exist.
    async fn find_identity(&self, user_id: Uuid) -> AppResult<Option<Identity>>;
}

#[async_trait]
impl IdentityStore for UserRepository {
    async fn find_identity(&self, user_id: Uuid) -> AppResult<Option<Identity>> {
        Ok(self.find_by_id(user_id).await?.as_ref().map(Identity::from))
    }
}
