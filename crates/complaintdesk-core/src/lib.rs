//! # complaintdesk-core
//!
//! Core crate for ComplaintDesk. Contains configuration schemas,
//! pagination types, the unified error system, and its HTTP mapping.
//!
//! This crate has **no** internal dependencies on other ComplaintDesk crates.

pub mod config;
pub mod error;
pub mod http;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
