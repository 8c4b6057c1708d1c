//! Room router: membership management and fan-out to room members.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::connection::{ConnectionId, ConnectionPool};
use crate::message::OutboundEvent;

use super::membership::MembershipIndex;

/// Outcome of a fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Events queued successfully.
    pub delivered: usize,
    /// Events dropped on full or closed queues.
    pub dropped: usize,
}

/// Named rooms of connections. A room exists only while it has members.
#[derive(Debug)]
pub struct RoomRouter {
    rooms: DashMap<String, HashSet<ConnectionId>>,
    memberships: MembershipIndex,
    pool: Arc<ConnectionPool>,
}

impl RoomRouter {
    /// Creates a router that resolves members through `pool`.
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self {
            rooms: DashMap::new(),
            memberships: MembershipIndex::new(),
            pool,
        }
    }

    /// Adds `conn_id` to `room`. Joining twice has no further effect.
    pub fn join(&self, conn_id: ConnectionId, room: &str) -> bool {
        let added = self
            .rooms
            .entry(room.to_string())
            .or_default()
            .insert(conn_id);
        self.memberships.add(conn_id, room);
        added
    }

    /// Removes `conn_id` from every room, dropping rooms left empty.
    pub fn leave_all(&self, conn_id: ConnectionId) -> HashSet<String> {
        let rooms = self.memberships.remove_all(conn_id);
        for room in &rooms {
            if let Some(mut members) = self.rooms.get_mut(room) {
                members.remove(&conn_id);
                if members.is_empty() {
                    drop(members);
                    self.rooms.remove_if(room, |_, members| members.is_empty());
                }
            }
        }
        rooms
    }

    /// Queues `event` for each member of `room` exactly once.
    pub fn broadcast(&self, room: &str, event: &OutboundEvent) -> Delivery {
        let members: Vec<ConnectionId> = match self.rooms.get(room) {
            Some(members) => members.iter().copied().collect(),
            None => {
                debug!(room = %room, "Broadcast to empty room");
                return Delivery::default();
            }
        };

        let mut delivery = Delivery::default();
        for conn_id in members {
            match self.pool.get(&conn_id) {
                Some(handle) if handle.send(event.clone()).is_ok() => delivery.delivered += 1,
                _ => delivery.dropped += 1,
            }
        }
        delivery
    }

    /// Queues `event` for every registered connection.
    pub fn broadcast_all(&self, event: &OutboundEvent) -> Delivery {
        let mut delivery = Delivery::default();
        for handle in self.pool.all_connections() {
            if handle.send(event.clone()).is_ok() {
                delivery.delivered += 1;
            } else {
                delivery.dropped += 1;
            }
        }
        delivery
    }

    /// Members of `room`.
    pub fn members(&self, room: &str) -> HashSet<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.value().clone())
            .unwrap_or_default()
    }

    /// Rooms `conn_id` has joined.
    pub fn rooms_of(&self, conn_id: ConnectionId) -> HashSet<String> {
        self.memberships.rooms_of(conn_id)
    }

    /// Number of non-empty rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;
    use uuid::Uuid;

    use complaintdesk_auth::Identity;
    use complaintdesk_entity::user::UserRole;

    use super::*;
    use crate::connection::ConnectionHandle;

    fn connect(pool: &ConnectionPool) -> (ConnectionId, mpsc::Receiver<OutboundEvent>) {
        let (tx, rx) = mpsc::channel(8);
        let identity = Identity {
            user_id: Uuid::new_v4(),
            display_name: "member".to_string(),
            role: UserRole::User,
        };
        let handle = Arc::new(ConnectionHandle::new(identity, tx));
        let id = handle.id;
        pool.add(handle);
        (id, rx)
    }

    #[test]
    fn test_double_join_delivers_once() {
        let pool = Arc::new(ConnectionPool::new());
        let router = RoomRouter::new(pool.clone());
        let (conn, mut rx) = connect(&pool);

        assert!(router.join(conn, "c1"));
        assert!(!router.join(conn, "c1"));

        let delivery = router.broadcast("c1", &OutboundEvent::NewMessage("hi".into()));
        assert_eq!(delivery.delivered, 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_leave_all_drops_empty_rooms() {
        let pool = Arc::new(ConnectionPool::new());
        let router = RoomRouter::new(pool.clone());
        let (a, _rx_a) = connect(&pool);
        let (b, _rx_b) = connect(&pool);

        router.join(a, "c1");
        router.join(a, "c2");
        router.join(b, "c2");

        let left = router.leave_all(a);
        assert_eq!(left.len(), 2);
        assert_eq!(router.room_count(), 1);
        assert_eq!(router.members("c2"), HashSet::from([b]));
        assert!(router.rooms_of(a).is_empty());
    }

    #[test]
    fn test_broadcast_only_reaches_members() {
        let pool = Arc::new(ConnectionPool::new());
        let router = RoomRouter::new(pool.clone());
        let (a, mut rx_a) = connect(&pool);
        let (_outsider, mut rx_out) = connect(&pool);

        router.join(a, "c1");
        router.broadcast("c1", &OutboundEvent::NewMessage("x".into()));

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_out.try_recv().is_err());
        assert_eq!(
            router.broadcast("nobody-here", &OutboundEvent::NewMessage("x".into())),
            Delivery::default()
        );
    }
}
