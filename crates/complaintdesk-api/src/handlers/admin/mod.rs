//! Admin-only handlers. Every handler checks the Admin role first.

pub mod complaints;
pub mod stats;
pub mod users;
