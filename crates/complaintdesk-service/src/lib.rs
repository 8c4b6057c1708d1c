//! # complaintdesk-service
//!
//! Business logic for ComplaintDesk. Services receive their repositories and
//! collaborators at construction time and take a [`RequestContext`] for every
//! operation performed on behalf of a user.

pub mod admin;
pub mod auth;
pub mod complaint;
pub mod context;
pub mod media;

pub use admin::{AdminUserService, DashboardService};
pub use auth::AuthService;
pub use complaint::ComplaintService;
pub use context::RequestContext;
pub use media::{CloudinaryUploader, DisabledUploader, MediaUploader};
