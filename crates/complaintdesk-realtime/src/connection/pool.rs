//! Connection pool, tracking every registered connection by id.

use std::sync::Arc;

use dashmap::DashMap;

use super::handle::{ConnectionHandle, ConnectionId};

/// Thread-safe pool of registered connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle);
    }

    /// Removes a connection from the pool.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.remove(conn_id).map(|(_, handle)| handle)
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Returns a snapshot of all connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns total number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }
}
