//! HTTP request handlers organized by domain.

pub mod admin;
pub mod auth;
pub mod complaint;
pub mod health;
pub mod ws;
