//! Aggregate queries for the administrator dashboard.
//!
//! Day boundaries are taken in UTC.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use complaintdesk_core::error::{AppError, ErrorKind};
use complaintdesk_core::result::AppResult;
use complaintdesk_entity::complaint::{
    ComplaintCategory, ComplaintDetail, ComplaintPriority, ComplaintStatus,
};

/// Number of recent complaints returned on the dashboard.
const RECENT_LIMIT: i64 = 10;

/// Headline complaint counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, FromRow)]
pub struct ComplaintCounts {
    /// All complaints.
    pub total: i64,
    /// Complaints in the Resolved state.
    pub resolved: i64,
    /// Complaints in the Pending state.
    pub pending: i64,
    /// Complaints in the In Progress state.
    pub in_progress: i64,
    /// Complaints filed since midnight UTC.
    pub today: i64,
}

/// Complaint count for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromRow)]
pub struct DailyCount {
    /// The UTC day.
    pub date: NaiveDate,
    /// Complaints filed that day.
    pub count: i64,
}

/// Repository for dashboard aggregates.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    /// Create a new stats repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Headline counters in a single pass.
    pub async fn counts(&self) -> AppResult<ComplaintCounts> {
        sqlx::query_as::<_, ComplaintCounts>(
            "SELECT COUNT(*) AS total, \
               COUNT(*) FILTER (WHERE status = 'resolved') AS resolved, \
               COUNT(*) FILTER (WHERE status = 'pending') AS pending, \
               COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress, \
               COUNT(*) FILTER (WHERE created_at >= date_trunc('day', NOW() AT TIME ZONE 'UTC') AT TIME ZONE 'UTC') AS today \
             FROM complaints",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count complaints", e))
    }

    /// Complaint count per status.
    pub async fn by_status(&self) -> AppResult<Vec<(ComplaintStatus, i64)>> {
        sqlx::query_as("SELECT status, COUNT(*) FROM complaints GROUP BY status ORDER BY status")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to group by status", e)
            })
    }

    /// Complaint count per category.
    pub async fn by_category(&self) -> AppResult<Vec<(ComplaintCategory, i64)>> {
        sqlx::query_as(
            "SELECT category, COUNT(*) FROM complaints GROUP BY category ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to group by category", e))
    }

    /// Complaint count per priority.
    pub async fn by_priority(&self) -> AppResult<Vec<(ComplaintPriority, i64)>> {
        sqlx::query_as(
            "SELECT priority, COUNT(*) FROM complaints GROUP BY priority ORDER BY priority",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to group by priority", e))
    }

    /// The newest complaints filed within the last seven days.
    pub async fn recent(&self) -> AppResult<Vec<ComplaintDetail>> {
        sqlx::query_as::<_, ComplaintDetail>(
            "SELECT c.*, \
               u.name AS owner_name, u.email AS owner_email, u.department AS owner_department, \
               a.name AS assignee_name, a.email AS assignee_email \
             FROM complaints c \
             JOIN users u ON u.id = c.user_id \
             LEFT JOIN users a ON a.id = c.assigned_to \
             WHERE c.created_at >= NOW() - INTERVAL '7 days' \
             ORDER BY c.created_at DESC LIMIT $1",
        )
        .bind(RECENT_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load recent complaints", e)
        })
    }

    /// Per-day counts over the trailing `days` UTC days, oldest first.
    /// Days without complaints are omitted.
    pub async fn daily_counts(&self, days: u32) -> AppResult<Vec<DailyCount>> {
        sqlx::query_as::<_, DailyCount>(
            "SELECT (created_at AT TIME ZONE 'UTC')::date AS date, COUNT(*) AS count \
             FROM complaints \
             WHERE created_at >= NOW() - make_interval(days => $1) \
             GROUP BY 1 ORDER BY 1",
        )
        .bind(days as i32)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load chart data", e))
    }
}
