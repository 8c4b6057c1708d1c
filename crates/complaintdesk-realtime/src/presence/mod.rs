//! Online-user presence.

pub mod registry;

pub use registry::PresenceRegistry;
