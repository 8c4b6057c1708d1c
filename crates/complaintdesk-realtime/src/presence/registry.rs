//! Presence registry: user identity to most recent connection.
//!
//! Not synchronized internally. The coordinator owns it behind a mutex so
//! that every mutation and the snapshot it broadcasts happen together.

use std::collections::HashMap;

use crate::connection::ConnectionId;

#[derive(Debug, Clone, Copy)]
struct PresenceEntry {
    connection_id: ConnectionId,
    /// First-registration order; kept when the entry is overwritten.
    seq: u64,
}

/// Maps each online user id to the connection that registered it last.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    entries: HashMap<String, PresenceEntry>,
    next_seq: u64,
}

impl PresenceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `user_id` at `connection_id`, replacing any earlier connection.
    pub fn set(&mut self, user_id: impl Into<String>, connection_id: ConnectionId) {
        let user_id = user_id.into();
        match self.entries.get_mut(&user_id) {
            Some(entry) => entry.connection_id = connection_id,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.entries.insert(user_id, PresenceEntry { connection_id, seq });
            }
        }
    }

    /// Drop every entry still pointing at `connection_id`.
    ///
    /// Returns whether anything was removed. A connection that was superseded
    /// by a newer one for the same user removes nothing.
    pub fn remove(&mut self, connection_id: ConnectionId) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.connection_id != connection_id);
        self.entries.len() < before
    }

    /// Online user ids in first-registration order.
    pub fn list_user_ids(&self) -> Vec<String> {
        let mut ids: Vec<(&String, u64)> = self
            .entries
            .iter()
            .map(|(user_id, entry)| (user_id, entry.seq))
            .collect();
        ids.sort_by_key(|(_, seq)| *seq);
        ids.into_iter().map(|(user_id, _)| user_id.clone()).collect()
    }

    /// The connection currently registered for `user_id`.
    pub fn connection_of(&self, user_id: &str) -> Option<ConnectionId> {
        self.entries.get(user_id).map(|entry| entry.connection_id)
    }

    /// Number of online users.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nobody is online.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_order_is_first_registration() {
        let mut registry = PresenceRegistry::new();
        let (a1, b, a2) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        registry.set("A", a1);
        registry.set("B", b);
        registry.set("A", a2);

        assert_eq!(registry.list_user_ids(), vec!["A", "B"]);
        assert_eq!(registry.connection_of("A"), Some(a2));
    }

    #[test]
    fn test_stale_connection_does_not_remove_user() {
        let mut registry = PresenceRegistry::new();
        let (old, new) = (Uuid::new_v4(), Uuid::new_v4());

        registry.set("U", old);
        registry.set("U", new);

        assert!(!registry.remove(old));
        assert_eq!(registry.list_user_ids(), vec!["U"]);

        assert!(registry.remove(new));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rejoin_goes_to_the_back() {
        let mut registry = PresenceRegistry::new();
        let (a, b, a_again) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

        registry.set("A", a);
        registry.set("B", b);
        registry.remove(a);
        registry.set("A", a_again);

        assert_eq!(registry.list_user_ids(), vec!["B", "A"]);
        assert_eq!(registry.len(), 2);
    }
}
