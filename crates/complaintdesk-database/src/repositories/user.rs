//! User repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use complaintdesk_core::error::{AppError, ErrorKind};
use complaintdesk_core::result::AppResult;
use complaintdesk_core::types::pagination::{PageRequest, PageResponse};
use complaintdesk_entity::user::model::{CreateUser, UpdateUser};
use complaintdesk_entity::user::{User, UserRole};

use super::is_unique_violation;

/// Optional filters for the administrative user listing.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Restrict to a role.
    pub role: Option<UserRole>,
    /// Restrict to a department (exact match).
    pub department: Option<String>,
}

/// Repository for user CRUD and query operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    /// List users, newest first, with optional role and department filters.
    pub async fn find_all(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<User>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users \
             WHERE ($1::user_role IS NULL OR role = $1) \
               AND ($2::text IS NULL OR department = $2)",
        )
        .bind(filter.role)
        .bind(filter.department.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users \
             WHERE ($1::user_role IS NULL OR role = $1) \
               AND ($2::text IS NULL OR department = $2) \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4",
        )
        .bind(filter.role)
        .bind(filter.department.as_deref())
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))?;

        Ok(PageResponse::new(users, page, total as u64))
    }

    /// Insert a new user. The email is stored lowercase.
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash, role, department) \
             VALUES ($1, LOWER($2), $3, $4, $5) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.role)
        .bind(data.department.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "users_email_key") {
                AppError::conflict("User already exists")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create user", e)
            }
        })
    }

    /// Apply a partial update. Returns `None` when the user does not exist.
    pub async fn update(&self, id: Uuid, data: &UpdateUser) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET \
               name = COALESCE($2, name), \
               email = COALESCE(LOWER($3), email), \
               role = COALESCE($4, role), \
               department = COALESCE($5, department), \
               password_hash = COALESCE($6, password_hash), \
               updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(data.name.as_deref())
        .bind(data.email.as_deref())
        .bind(data.role)
        .bind(data.department.as_deref())
        .bind(data.password_hash.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "users_email_key") {
                AppError::conflict("Email is already in use")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to update user", e)
            }
        })
    }

    /// Delete a user. Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete user", e))?;
        Ok(result.rows_affected() > 0)
    }
}
