//! Realtime counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Process-wide realtime counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_opened: AtomicU64,
    connections_closed: AtomicU64,
    handshakes_refused: AtomicU64,
    events_received: AtomicU64,
    events_malformed: AtomicU64,
    events_delivered: AtomicU64,
    events_dropped: AtomicU64,
}

impl RealtimeMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn connection_closed(&self) {
        self.connections_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn handshake_refused(&self) {
        self.handshakes_refused.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn event_malformed(&self) {
        self.events_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery(&self, delivered: usize, dropped: usize) {
        self.events_delivered
            .fetch_add(delivered as u64, Ordering::Relaxed);
        self.events_dropped.fetch_add(dropped as u64, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let opened = self.connections_opened.load(Ordering::Relaxed);
        let closed = self.connections_closed.load(Ordering::Relaxed);
        MetricsSnapshot {
            connections_opened: opened,
            connections_active: opened.saturating_sub(closed),
            handshakes_refused: self.handshakes_refused.load(Ordering::Relaxed),
            events_received: self.events_received.load(Ordering::Relaxed),
            events_malformed: self.events_malformed.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Connections that completed a handshake.
    pub connections_opened: u64,
    /// Connections currently registered.
    pub connections_active: u64,
    /// Handshakes refused for bad credentials.
    pub handshakes_refused: u64,
    /// Inbound frames received.
    pub events_received: u64,
    /// Inbound frames that failed to decode.
    pub events_malformed: u64,
    /// Outbound events queued.
    pub events_delivered: u64,
    /// Outbound events dropped.
    pub events_dropped: u64,
}
