//! Complaint priority enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Urgency assigned by the complainant.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "complaint_priority", rename_all = "lowercase")]
pub enum ComplaintPriority {
    /// Can wait.
    Low,
    /// Normal handling.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

impl ComplaintPriority {
    /// All priorities, lowest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Return the display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for ComplaintPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintPriority {
    type Err = complaintdesk_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                complaintdesk_core::AppError::validation(format!(
                    "Invalid priority: '{s}'. Expected one of: Low, Medium, High"
                ))
            })
    }
}
