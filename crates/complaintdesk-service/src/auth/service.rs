//! Account registration and credential checks.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use complaintdesk_auth::{JwtEncoder, PasswordHasher};
use complaintdesk_core::error::AppError;
use complaintdesk_database::repositories::UserRepository;
use complaintdesk_entity::user::model::CreateUser;
use complaintdesk_entity::user::{User, UserRole};

use crate::context::RequestContext;

/// Message returned for any failed login, whether the email or password was wrong.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Self-registration data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterInput {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Department.
    pub department: Option<String>,
}

/// Login credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    /// Login email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// A signed token together with the account it was issued for.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    /// Bearer token.
    pub token: String,
    /// The authenticated user.
    pub user: User,
}

/// Handles registration, login, and profile lookup.
#[derive(Debug, Clone)]
pub struct AuthService {
    user_repo: Arc<UserRepository>,
    hasher: Arc<PasswordHasher>,
    encoder: Arc<JwtEncoder>,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        user_repo: Arc<UserRepository>,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            encoder,
        }
    }

    /// Creates a `user`-role account and signs a token for it.
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AppError> {
        let name = input.name.trim();
        let email = input.email.trim().to_lowercase();
        if name.is_empty() {
            return Err(AppError::validation("Name is required"));
        }
        if !is_plausible_email(&email) {
            return Err(AppError::validation("A valid email is required"));
        }
        self.hasher.check_policy(&input.password)?;

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User already exists"));
        }

        let user = self
            .user_repo
            .create(&CreateUser {
                name: name.to_string(),
                email,
                password_hash: self.hasher.hash(&input.password)?,
                role: UserRole::User,
                department: input
                    .department
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        self.session_for(user)
    }

    /// Checks credentials and signs a token.
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AppError> {
        let user = self
            .user_repo
            .find_by_email(input.email.trim())
            .await?
            .ok_or_else(|| AppError::authentication(INVALID_CREDENTIALS))?;

        if !self.hasher.verify(&input.password, &user.password_hash)? {
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        info!(user_id = %user.id, "User logged in");
        self.session_for(user)
    }

    /// Returns the caller's account.
    pub async fn profile(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    fn session_for(&self, user: User) -> Result<AuthSession, AppError> {
        let issued = self.encoder.issue(&user)?;
        Ok(AuthSession {
            token: issued.token,
            user,
        })
    }
}

/// Cheap shape check; the database enforces uniqueness.
pub(crate) fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(is_plausible_email("asha@example.com"));
        assert!(!is_plausible_email("asha"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("asha@localhost"));
        assert!(!is_plausible_email("asha@example."));
    }
}
