//! # complaintdesk-auth
//!
//! Authentication building blocks shared by the HTTP layer and the realtime
//! handshake.
//!
//! ## Modules
//!
//! - `jwt`: token claims, signing and validation
//! - `password`: Argon2id password hashing
//! - `identity`: the `IdentityStore` seam used to resolve token subjects
//! - `verifier`: `TokenVerifier`, which turns a raw token into an `Identity`

pub mod error;
pub mod identity;
pub mod jwt;
pub mod password;
pub mod verifier;

pub use error::{AuthError, VerifyError};
pub use identity::{Identity, IdentityStore};
pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
pub use verifier::TokenVerifier;
