//! Admin user management.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use complaintdesk_auth::PasswordHasher;
use complaintdesk_core::error::AppError;
use complaintdesk_core::types::pagination::{PageRequest, PageResponse};
use complaintdesk_database::repositories::UserRepository;
use complaintdesk_database::repositories::user::UserFilter;
use complaintdesk_entity::user::model::UpdateUser;
use complaintdesk_entity::user::{User, UserRole};

use crate::auth::service::is_plausible_email;
use crate::context::RequestContext;

/// Fields an administrator may change on an account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUserUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// New department.
    pub department: Option<String>,
    /// New plaintext password, re-hashed before storage.
    pub password: Option<String>,
}

/// Handles administrative user management operations.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    user_repo: Arc<UserRepository>,
    hasher: Arc<PasswordHasher>,
}

impl AdminUserService {
    /// Creates a new admin user service.
    pub fn new(user_repo: Arc<UserRepository>, hasher: Arc<PasswordHasher>) -> Self {
        Self { user_repo, hasher }
    }

    /// Lists users, newest first.
    pub async fn list_users(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<PageResponse<User>, AppError> {
        self.user_repo.find_all(filter, page).await
    }

    /// Gets a single user by ID.
    pub async fn get_user(&self, user_id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Updates a user. The password is only touched when one is supplied.
    pub async fn update_user(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        req: AdminUserUpdate,
    ) -> Result<User, AppError> {
        let name = match req.name.map(|n| n.trim().to_string()) {
            Some(n) if n.is_empty() => return Err(AppError::validation("Name cannot be empty")),
            other => other,
        };
        let email = match req.email.map(|e| e.trim().to_lowercase()) {
            Some(e) if !is_plausible_email(&e) => {
                return Err(AppError::validation("A valid email is required"));
            }
            other => other,
        };
        let password_hash = match req.password.filter(|p| !p.is_empty()) {
            Some(password) => {
                self.hasher.check_policy(&password)?;
                Some(self.hasher.hash(&password)?)
            }
            None => None,
        };

        let user = self
            .user_repo
            .update(
                user_id,
                &UpdateUser {
                    name,
                    email,
                    role: req.role,
                    department: req.department.map(|d| d.trim().to_string()),
                    password_hash,
                },
            )
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        info!(user_id = %user_id, admin_id = %ctx.user_id, "User updated by admin");
        Ok(user)
    }

    /// Deletes a user. Admins cannot delete themselves.
    pub async fn delete_user(&self, ctx: &RequestContext, user_id: Uuid) -> Result<(), AppError> {
        if ctx.user_id == user_id {
            return Err(AppError::validation("Cannot delete your own account"));
        }
        if !self.user_repo.delete(user_id).await? {
            return Err(AppError::not_found("User not found"));
        }
        info!(user_id = %user_id, admin_id = %ctx.user_id, "User deleted by admin");
        Ok(())
    }
}
