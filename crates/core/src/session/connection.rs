//! The transport abstraction a [`Session`](super::Session) sends through.
//!
//! WebSocket framing lives outside this crate entirely (see the `chat-cli`
//! binary). `Transport` is the seam: anything that can deliver a text frame
//! to a peer and report its remote address qualifies, so the registry and
//! dispatcher never depend on a concrete socket type.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;

/// Something a [`Session`](super::Session) can write outbound frames to.
///
/// Implementors must be safe to hold behind `Arc` and call from the
/// dispatcher's task as well as the supervisor's background thread.
pub trait Transport: Send + Sync {
    /// Enqueue a text frame for delivery. Must not block indefinitely.
    fn send(&self, text: &str) -> Result<()>;

    /// The peer's address as reported by the underlying socket.
    fn remote_addr(&self) -> &str;

    /// Close the underlying connection, e.g. after a fatal protocol error.
    fn close(&self, reason: &str);
}

static CONNECTION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identifies one live transport, independent of whether it has registered a
/// name yet. Needed because `dyn Transport` isn't `Hash`/`Eq`, and the
/// registry's by-handle index (invariant I2) needs a hashable key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Allocate a fresh id, unique for the lifetime of the process.
    pub fn next() -> Self {
        ConnectionId(CONNECTION_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}
