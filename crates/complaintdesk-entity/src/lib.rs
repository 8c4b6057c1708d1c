//! # complaintdesk-entity
//!
//! Domain entity models for ComplaintDesk. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`; enums map to PostgreSQL enum types.

pub mod complaint;
pub mod user;
