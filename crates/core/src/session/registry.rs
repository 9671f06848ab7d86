//! The concurrent session table (registry invariants I1–I3).
//!
//! Both indices — by display name and by transport handle — live behind a
//! single lock on one inner struct, so `try_register`/`remove` update them
//! atomically. A two-lock design (one per index) would let a reader observe
//! a session registered under one index but not yet the other.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::connection::{ConnectionId, Transport};
use super::Session;
use crate::error::ChatError;

#[derive(Default)]
struct Inner {
    by_name: HashMap<String, Arc<Session>>,
    by_handle: HashMap<ConnectionId, Arc<Session>>,
}

/// Thread-safe registry of live sessions.
///
/// Registered under `by_name` (routing) and `by_handle` (transport
/// lifecycle callbacks), kept consistent by [`try_register`](Self::try_register)
/// and [`remove`](Self::remove).
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<RwLock<Inner>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Register a new session for `name` on the given transport.
    ///
    /// Fails with [`ChatError::NameTaken`] if another live session already
    /// holds `name`, or [`ChatError::AlreadyRegistered`] if `id` already has
    /// a session (a transport may only ever back one session at a time).
    pub fn try_register(
        &self,
        name: String,
        id: ConnectionId,
        transport: Arc<dyn Transport>,
    ) -> Result<Arc<Session>, ChatError> {
        let mut inner = self.inner.write();

        if inner.by_handle.contains_key(&id) {
            return Err(ChatError::AlreadyRegistered(name));
        }
        if inner.by_name.contains_key(&name) {
            return Err(ChatError::NameTaken(name));
        }

        let session = Arc::new(Session::new(name.clone(), id, transport));
        inner.by_name.insert(name, session.clone());
        inner.by_handle.insert(id, session.clone());

        tracing::info!(session = %session.name, total = inner.by_name.len(), "session registered");
        Ok(session)
    }

    /// Look up a live session by display name.
    pub fn lookup_by_name(&self, name: &str) -> Option<Arc<Session>> {
        self.inner.read().by_name.get(name).cloned()
    }

    /// Look up a live session by its transport handle.
    pub fn lookup_by_handle(&self, id: ConnectionId) -> Option<Arc<Session>> {
        self.inner.read().by_handle.get(&id).cloned()
    }

    /// Remove a session by its transport handle. Idempotent.
    pub fn remove(&self, id: ConnectionId) -> Option<Arc<Session>> {
        let mut inner = self.inner.write();
        let session = inner.by_handle.remove(&id)?;
        inner.by_name.remove(&session.name);
        tracing::info!(session = %session.name, total = inner.by_name.len(), "session removed");
        Some(session)
    }

    /// A point-in-time copy of every live display name.
    pub fn snapshot_names(&self) -> Vec<String> {
        self.inner.read().by_name.keys().cloned().collect()
    }

    /// A point-in-time copy of every live session, for iteration outside the
    /// registry's lock (broadcasts must not hold this lock while writing to
    /// transports).
    pub fn snapshot_sessions(&self) -> Vec<Arc<Session>> {
        self.inner.read().by_handle.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
