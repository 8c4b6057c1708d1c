//! Core type definitions used across the ComplaintDesk workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
