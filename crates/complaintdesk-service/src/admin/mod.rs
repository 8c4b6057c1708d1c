//! Administrator-only services.

pub mod dashboard;
pub mod users;

pub use dashboard::{DashboardService, DashboardStats, StatCount};
pub use users::{AdminUserService, AdminUserUpdate};
