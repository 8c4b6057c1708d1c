//! Complaint repository implementation.

use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use complaintdesk_core::error::{AppError, ErrorKind};
use complaintdesk_core::result::AppResult;
use complaintdesk_core::types::pagination::{PageRequest, PageResponse};
use complaintdesk_entity::complaint::model::generate_complaint_code;
use complaintdesk_entity::complaint::{
    Complaint, ComplaintDetail, ComplaintFilter, ComplaintStatus, CreateComplaint,
    UpdateComplaint,
};

use super::is_unique_violation;

/// Attempts at drawing an unused complaint code before giving up.
const CODE_ATTEMPTS: usize = 3;

const DETAIL_SELECT: &str = "SELECT c.*, \
       u.name AS owner_name, u.email AS owner_email, u.department AS owner_department, \
       a.name AS assignee_name, a.email AS assignee_email \
     FROM complaints c \
     JOIN users u ON u.id = c.user_id \
     LEFT JOIN users a ON a.id = c.assigned_to";

const FILTER_CLAUSE: &str = "($1::complaint_status IS NULL OR c.status = $1) \
       AND ($2::complaint_category IS NULL OR c.category = $2) \
       AND ($3::complaint_priority IS NULL OR c.priority = $3)";

/// Repository for complaint persistence.
#[derive(Debug, Clone)]
pub struct ComplaintRepository {
    pool: PgPool,
}

impl ComplaintRepository {
    /// Create a new complaint repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a complaint with a freshly generated public code.
    pub async fn create(&self, data: &CreateComplaint) -> AppResult<Complaint> {
        for _ in 0..CODE_ATTEMPTS {
            let code = generate_complaint_code();
            let result = sqlx::query_as::<_, Complaint>(
                "INSERT INTO complaints \
                   (user_id, complaint_code, title, description, category, priority, attachment) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
            )
            .bind(data.user_id)
            .bind(&code)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.category)
            .bind(data.priority)
            .bind(data.attachment.as_deref())
            .fetch_one(&self.pool)
            .await;

            match result {
                Ok(complaint) => return Ok(complaint),
                Err(e) if is_unique_violation(&e, "complaints_code_key") => {
                    warn!(code = %code, "Complaint code collision, retrying");
                }
                Err(e) => {
                    return Err(AppError::with_source(
                        ErrorKind::Database,
                        "Failed to create complaint",
                        e,
                    ));
                }
            }
        }
        Err(AppError::internal("Could not allocate a unique complaint code"))
    }

    /// Find a complaint by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Complaint>> {
        sqlx::query_as::<_, Complaint>("SELECT * FROM complaints WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find complaint", e)
            })
    }

    /// Find a complaint joined with owner and assignee. Messages are left empty.
    pub async fn find_detail(&self, id: Uuid) -> AppResult<Option<ComplaintDetail>> {
        sqlx::query_as::<_, ComplaintDetail>(&format!("{DETAIL_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load complaint", e)
            })
    }

    /// List complaints matching `filter`, newest first, one page at a time.
    pub async fn find_page(
        &self,
        filter: ComplaintFilter,
        page: PageRequest,
    ) -> AppResult<PageResponse<ComplaintDetail>> {
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM complaints c WHERE {FILTER_CLAUSE}"
        ))
        .bind(filter.status)
        .bind(filter.category)
        .bind(filter.priority)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count complaints", e))?;

        let items = sqlx::query_as::<_, ComplaintDetail>(&format!(
            "{DETAIL_SELECT} WHERE {FILTER_CLAUSE} \
             ORDER BY c.created_at DESC LIMIT $4 OFFSET $5"
        ))
        .bind(filter.status)
        .bind(filter.category)
        .bind(filter.priority)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list complaints", e))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// List every complaint matching `filter`, newest first.
    pub async fn find_all(&self, filter: ComplaintFilter) -> AppResult<Vec<ComplaintDetail>> {
        sqlx::query_as::<_, ComplaintDetail>(&format!(
            "{DETAIL_SELECT} WHERE {FILTER_CLAUSE} ORDER BY c.created_at DESC"
        ))
        .bind(filter.status)
        .bind(filter.category)
        .bind(filter.priority)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list complaints", e))
    }

    /// List complaints filed by `user_id`, newest first.
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<ComplaintDetail>> {
        sqlx::query_as::<_, ComplaintDetail>(&format!(
            "{DETAIL_SELECT} WHERE c.user_id = $1 ORDER BY c.created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list user complaints", e)
        })
    }

    /// Apply an administrative update. Resolving stamps `resolved_at`.
    pub async fn update(&self, id: Uuid, data: &UpdateComplaint) -> AppResult<Option<Complaint>> {
        sqlx::query_as::<_, Complaint>(
            "UPDATE complaints SET \
               status = COALESCE($2, status), \
               assigned_to = COALESCE($3, assigned_to), \
               remarks = COALESCE($4, remarks), \
               resolved_at = CASE WHEN $5 THEN NOW() ELSE resolved_at END, \
               updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(data.status)
        .bind(data.assigned_to)
        .bind(data.remarks.as_deref())
        .bind(data.resolves())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update complaint", e))
    }

    /// Change only the status of a complaint.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: ComplaintStatus,
    ) -> AppResult<Option<Complaint>> {
        self.update(
            id,
            &UpdateComplaint {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete a complaint and its thread. Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM complaints WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete complaint", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
