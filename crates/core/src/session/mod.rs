//! Chat session management.
//!
//! A session is a server-side state object created by a successful
//! `register` frame and destroyed by `disconnect`, transport close, or a
//! fatal protocol error. It tracks:
//!
//! - A unique display name (registry invariant I1).
//! - The presence status: Active <-> Busy <-> Inactive.
//! - The timestamp of the most recent inbound frame, consulted by the
//!   inactivity supervisor.
//! - A handle to the transport used to deliver outbound frames.
//!
//! ## Session lifecycle
//!
//! ```text
//! register (name free)   -> live, status=Active
//! register (name taken)  -> rejected, never created
//! change_status          -> status=S
//! supervisor idle scan   -> status=Inactive (only from Active)
//! disconnect / close     -> removed
//! ```

pub mod connection;
pub mod registry;

use parking_lot::RwLock;
use std::time::Instant;

pub use connection::{ConnectionId, Transport};
pub use registry::Registry;

use crate::protocol::Status;

/// A single live chat session.
///
/// Interior mutability via `RwLock` lets the dispatcher, the registry's
/// iteration, and the supervisor all hold a shared `Arc<Session>` at once.
pub struct Session {
    /// Unique display name (registry invariant I1).
    pub name: String,
    /// Peer address as reported by the transport, informational only.
    pub remote_addr: String,
    /// Identifies the underlying transport (registry invariant I2).
    pub id: ConnectionId,
    status: RwLock<Status>,
    last_activity: RwLock<Instant>,
    transport: std::sync::Arc<dyn Transport>,
}

impl Session {
    pub(crate) fn new(name: String, id: ConnectionId, transport: std::sync::Arc<dyn Transport>) -> Self {
        let remote_addr = transport.remote_addr().to_string();
        Session {
            name,
            remote_addr,
            id,
            status: RwLock::new(Status::Active),
            last_activity: RwLock::new(Instant::now()),
            transport,
        }
    }

    /// Current presence status.
    pub fn status(&self) -> Status {
        *self.status.read()
    }

    /// Overwrite the presence status (does not touch `last_activity`; callers
    /// that want the activity clock reset call [`touch`](Self::touch) too).
    pub fn set_status(&self, status: Status) {
        tracing::debug!(session = %self.name, old = ?self.status().as_wire(), new = ?status.as_wire(), "status transition");
        *self.status.write() = status;
    }

    /// Record that a frame was just received from this session.
    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    /// How long it has been since the last inbound frame.
    pub fn idle_for(&self) -> std::time::Duration {
        self.last_activity.read().elapsed()
    }

    /// Send a raw text frame to this session's transport.
    pub fn send(&self, text: &str) -> crate::error::Result<()> {
        self.transport.send(text)
    }

    /// Close the underlying transport.
    pub fn close(&self, reason: &str) {
        self.transport.close(reason);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("name", &self.name)
            .field("remote_addr", &self.remote_addr)
            .field("id", &self.id)
            .field("status", &self.status())
            .finish()
    }
}
