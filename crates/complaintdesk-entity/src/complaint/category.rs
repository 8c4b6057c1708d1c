//! Complaint category enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Area a complaint concerns.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "complaint_category", rename_all = "lowercase")]
pub enum ComplaintCategory {
    /// Physical equipment.
    Hardware,
    /// Applications and licences.
    Software,
    /// Connectivity.
    Network,
    /// Anything else.
    #[default]
    Other,
}

impl ComplaintCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 4] = [Self::Hardware, Self::Software, Self::Network, Self::Other];

    /// Return the display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hardware => "Hardware",
            Self::Software => "Software",
            Self::Network => "Network",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ComplaintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintCategory {
    type Err = complaintdesk_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                complaintdesk_core::AppError::validation(format!(
                    "Invalid category: '{s}'. Expected one of: Hardware, Software, Network, Other"
                ))
            })
    }
}
