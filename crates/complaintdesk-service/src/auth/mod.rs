//! Account registration, login, and profile.

pub mod service;

pub use service::{AuthService, AuthSession, LoginInput, RegisterInput};
