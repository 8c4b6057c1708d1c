//! Realtime wire events.

pub mod types;

pub use types::{InboundEvent, NewMessagePayload, OutboundEvent, TypingPayload};
