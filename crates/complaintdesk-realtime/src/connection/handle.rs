//! Handle to a single live WebSocket connection.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use complaintdesk_auth::Identity;

use crate::error::RealtimeError;
use crate::message::OutboundEvent;

/// Opaque connection identifier.
pub type ConnectionId = Uuid;

/// A registered connection.
///
/// Outbound events are queued on a bounded channel drained by the
/// connection's writer task.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Identity resolved at handshake. Never changes.
    pub identity: Identity,
    /// When the handshake completed.
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<OutboundEvent>,
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a handle with a fresh id.
    pub fn new(identity: Identity, sender: mpsc::Sender<OutboundEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
            connected_at: Utc::now(),
            sender,
            alive: AtomicBool::new(true),
        }
    }

    /// Queue an event without waiting.
    ///
    /// A full queue drops the event. A closed queue marks the connection dead.
    pub fn send(&self, event: OutboundEvent) -> Result<(), RealtimeError> {
        if !self.is_alive() {
            return Err(self.transport_error("connection closed"));
        }
        match self.sender.try_send(event) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Outbound buffer full, dropping event");
                Err(self.transport_error("outbound buffer full"))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                Err(self.transport_error("connection closed"))
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    fn transport_error(&self, reason: &str) -> RealtimeError {
        RealtimeError::Transport {
            connection: self.id,
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use complaintdesk_entity::user::UserRole;

    use super::*;

    fn identity() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            display_name: "Mei".to_string(),
            role: UserRole::User,
        }
    }

    #[test]
    fn test_full_buffer_drops_but_stays_alive() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = ConnectionHandle::new(identity(), tx);

        assert!(handle.send(OutboundEvent::OnlineUsers(vec![])).is_ok());
        let err = handle.send(OutboundEvent::OnlineUsers(vec![])).unwrap_err();
        assert!(matches!(err, RealtimeError::Transport { .. }));
        assert!(handle.is_alive());

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_receiver_marks_dead() {
        let (tx, rx) = mpsc::channel(4);
        let handle = ConnectionHandle::new(identity(), tx);
        drop(rx);

        assert!(handle.send(OutboundEvent::OnlineUsers(vec![])).is_err());
        assert!(!handle.is_alive());
    }
}
