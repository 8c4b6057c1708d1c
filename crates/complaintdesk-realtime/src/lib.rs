//! # complaintdesk-realtime
//!
//! Live layer attached to complaint threads:
//!
//! - token-authenticated WebSocket connections
//! - a presence registry of online users
//! - one room per complaint, with typing and new-message fan-out
//!
//! The transport itself lives in the API crate; this crate only sees
//! handshakes, inbound text frames, and disconnects.

pub mod connection;
pub mod coordinator;
pub mod error;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod room;

pub use connection::{ConnectionHandle, ConnectionId, ConnectionPool};
pub use coordinator::{EstablishedConnection, HandshakeRequest, RealtimeCoordinator};
pub use error::RealtimeError;
pub use message::{InboundEvent, OutboundEvent};
pub use presence::PresenceRegistry;
pub use room::RoomRouter;
