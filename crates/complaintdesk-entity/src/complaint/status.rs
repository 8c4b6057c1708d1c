//! Complaint workflow status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a complaint is in the triage workflow.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "complaint_status", rename_all = "snake_case")]
pub enum ComplaintStatus {
    /// Filed, not yet picked up.
    #[default]
    Pending,
    /// An administrator is working on it.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Closed with a fix.
    Resolved,
    /// Closed without action.
    Rejected,
}

impl ComplaintStatus {
    /// All statuses, in workflow order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Resolved,
        Self::Rejected,
    ];

    /// Return the display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Rejected => "Rejected",
        }
    }

    /// Whether the complaint no longer needs attention.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = complaintdesk_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace(['_', '-'], " ");
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(normalized.trim()))
            .ok_or_else(|| {
                complaintdesk_core::AppError::validation(format!(
                    "Invalid status: '{s}'. Expected one of: Pending, In Progress, Resolved, Rejected"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_progress_spellings() {
        assert_eq!(
            "In Progress".parse::<ComplaintStatus>().unwrap(),
            ComplaintStatus::InProgress
        );
        assert_eq!(
            "in_progress".parse::<ComplaintStatus>().unwrap(),
            ComplaintStatus::InProgress
        );
        assert!("done".parse::<ComplaintStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_display_labels() {
        assert_eq!(
            serde_json::to_string(&ComplaintStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
        let st: ComplaintStatus = serde_json::from_str("\"Resolved\"").unwrap();
        assert!(st.is_closed());
    }
}
