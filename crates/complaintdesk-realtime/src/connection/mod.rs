//! Live connection handles and the pool that indexes them.

pub mod handle;
pub mod pool;

pub use handle::{ConnectionHandle, ConnectionId};
pub use pool::ConnectionPool;
