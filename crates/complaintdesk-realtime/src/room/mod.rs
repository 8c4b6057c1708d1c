//! Per-complaint rooms.

pub mod membership;
pub mod router;

pub use membership::MembershipIndex;
pub use router::RoomRouter;
