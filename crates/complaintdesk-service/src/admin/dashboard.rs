//! Dashboard aggregates for administrators.

use std::fmt::Display;
use std::sync::Arc;

use serde::Serialize;

use complaintdesk_core::error::AppError;
use complaintdesk_database::repositories::StatsRepository;
use complaintdesk_database::repositories::stats::DailyCount;
use complaintdesk_entity::complaint::ComplaintDetail;

/// Default chart window in days.
pub const DEFAULT_CHART_DAYS: u32 = 30;
/// Largest chart window in days.
pub const MAX_CHART_DAYS: u32 = 365;

/// Count for one label of a breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCount {
    /// Display label, e.g. `"In Progress"`.
    pub name: String,
    /// Number of complaints.
    pub count: i64,
}

impl StatCount {
    fn from_pairs<T: Display>(pairs: Vec<(T, i64)>) -> Vec<Self> {
        pairs
            .into_iter()
            .map(|(label, count)| Self {
                name: label.to_string(),
                count,
            })
            .collect()
    }
}

/// Everything shown on the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    /// All complaints.
    pub total_complaints: i64,
    /// Resolved complaints.
    pub resolved_complaints: i64,
    /// Pending complaints.
    pub pending_complaints: i64,
    /// In-progress complaints.
    pub in_progress_complaints: i64,
    /// Complaints filed today (UTC).
    pub complaints_today: i64,
    /// Breakdown by status.
    pub status_stats: Vec<StatCount>,
    /// Breakdown by category.
    pub category_stats: Vec<StatCount>,
    /// Breakdown by priority.
    pub priority_stats: Vec<StatCount>,
    /// Newest complaints from the last seven days.
    pub recent_complaints: Vec<ComplaintDetail>,
}

/// Computes dashboard aggregates.
#[derive(Debug, Clone)]
pub struct DashboardService {
    stats: Arc<StatsRepository>,
}

impl DashboardService {
    /// Creates a new dashboard service.
    pub fn new(stats: Arc<StatsRepository>) -> Self {
        Self { stats }
    }

    /// Collects headline counts, breakdowns, and recent complaints.
    pub async fn stats(&self) -> Result<DashboardStats, AppError> {
        let counts = self.stats.counts().await?;
        Ok(DashboardStats {
            total_complaints: counts.total,
            resolved_complaints: counts.resolved,
            pending_complaints: counts.pending,
            in_progress_complaints: counts.in_progress,
            complaints_today: counts.today,
            status_stats: StatCount::from_pairs(self.stats.by_status().await?),
            category_stats: StatCount::from_pairs(self.stats.by_category().await?),
            priority_stats: StatCount::from_pairs(self.stats.by_priority().await?),
            recent_complaints: self.stats.recent().await?,
        })
    }

    /// Per-day complaint counts over a trailing window.
    pub async fn chart_data(&self, days: Option<u32>) -> Result<Vec<DailyCount>, AppError> {
        self.stats.daily_counts(clamp_days(days)).await
    }
}

/// Window length actually queried for a requested `days` value.
pub fn clamp_days(days: Option<u32>) -> u32 {
    days.unwrap_or(DEFAULT_CHART_DAYS).clamp(1, MAX_CHART_DAYS)
}

#[cfg(test)]
mod tests {
    use complaintdesk_entity::complaint::ComplaintStatus;

    use super::*;

    #[test]
    fn test_clamp_days() {
        assert_eq!(clamp_days(None), 30);
        assert_eq!(clamp_days(Some(0)), 1);
        assert_eq!(clamp_days(Some(7)), 7);
        assert_eq!(clamp_days(Some(10_000)), 365);
    }

    #[test]
    fn test_breakdown_uses_display_labels() {
        let rows = StatCount::from_pairs(vec![
            (ComplaintStatus::Pending, 4),
            (ComplaintStatus::InProgress, 2),
        ]);
        assert_eq!(rows[1].name, "In Progress");
        assert_eq!(rows[0].count, 4);
    }
}
