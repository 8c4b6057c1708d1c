//! Reverse index from connection to the rooms it has joined.

use std::collections::HashSet;

use dashmap::DashMap;

use crate::connection::ConnectionId;

/// Connection → joined rooms.
#[derive(Debug, Default)]
pub struct MembershipIndex {
    conn_to_rooms: DashMap<ConnectionId, HashSet<String>>,
}

impl MembershipIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a membership. Returns `false` if it was already present.
    pub fn add(&self, conn_id: ConnectionId, room: &str) -> bool {
        self.conn_to_rooms
            .entry(conn_id)
            .or_default()
            .insert(room.to_string())
    }

    /// Rooms `conn_id` has joined.
    pub fn rooms_of(&self, conn_id: ConnectionId) -> HashSet<String> {
        self.conn_to_rooms
            .get(&conn_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Forgets every membership of `conn_id` and returns them.
    pub fn remove_all(&self, conn_id: ConnectionId) -> HashSet<String> {
        self.conn_to_rooms
            .remove(&conn_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default()
    }
}
