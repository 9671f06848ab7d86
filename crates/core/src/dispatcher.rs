//! Applies the protocol state machine to a single connection's inbound frames.
//!
//! One [`Dispatcher`] is created per connection by the transport binary and
//! fed every decoded text frame in order. It owns no socket itself — it
//! reads/writes [`Session`]s through the shared [`Registry`] and the
//! connection's own [`Transport`] handle.
//!
//! Registration state is not tracked as a separate field: "is this
//! connection registered" is simply "does the registry have a session for
//! my [`ConnectionId`] right now" — avoiding a boolean that could drift out
//! of sync with the registry it's describing.

use std::sync::Arc;

use serde_json::{Value, json};

use crate::protocol::{self, Outbound, Status, kind};
use crate::session::{ConnectionId, Registry, Session, Transport};

/// Per-connection message router.
pub struct Dispatcher {
    registry: Registry,
    id: ConnectionId,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(registry: Registry, transport: Arc<dyn Transport>) -> Self {
        Dispatcher {
            registry,
            id: ConnectionId::next(),
            transport,
        }
    }

    fn session(&self) -> Option<Arc<Session>> {
        self.registry.lookup_by_handle(self.id)
    }

    fn reply(&self, frame: Outbound) {
        let text = protocol::encode(frame);
        if let Err(e) = self.transport.send(&text) {
            tracing::warn!(conn = %self.id, error = %e, "failed to deliver reply");
        }
    }

    fn reply_error(&self, message: impl Into<String>) {
        self.reply(protocol::error_frame(message));
    }

    fn broadcast(&self, frame_builder: impl Fn() -> Outbound) {
        self.broadcast_except(None, frame_builder);
    }

    /// Same as [`broadcast`](Self::broadcast) but skips the session owned by
    /// `exclude` (used for the register-announcement, which must not echo
    /// back to the session that just joined).
    fn broadcast_except(&self, exclude: Option<ConnectionId>, frame_builder: impl Fn() -> Outbound) {
        for session in self.registry.snapshot_sessions() {
            if exclude == Some(session.id) {
                continue;
            }
            let text = protocol::encode(frame_builder());
            if session.send(&text).is_err() {
                tracing::warn!(session = %session.name, "dropping unreachable session from broadcast");
            }
        }
    }

    /// Handle one decoded-text frame. Returns `true` if the caller should
    /// close the underlying transport after this call returns.
    pub fn dispatch(&self, raw: &str) -> bool {
        let frame = match protocol::decode(raw) {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!(conn = %self.id, error = %e, "dropping malformed frame");
                return false;
            }
        };

        if frame.kind != kind::REGISTER {
            match self.session() {
                Some(session) => session.touch(),
                None => {
                    self.reply_error("not registered");
                    return true;
                }
            }
        }

        match frame.kind.as_str() {
            kind::REGISTER => self.handle_register(frame.sender),
            kind::BROADCAST => self.handle_broadcast(frame.sender, frame.content),
            kind::PRIVATE => self.handle_private(frame.sender, frame.target, frame.content),
            kind::LIST_USERS => self.handle_list_users(),
            kind::USER_INFO => self.handle_user_info(frame.target),
            kind::CHANGE_STATUS => self.handle_change_status(frame.sender, frame.content),
            kind::DISCONNECT => self.handle_disconnect(),
            other => {
                self.reply_error(format!("unknown command: {other}"));
                false
            }
        }
    }

    /// Remove this connection's session and notify peers, without touching
    /// the transport (used when the socket itself has already gone away).
    pub fn handle_close(&self) {
        if let Some(session) = self.registry.remove(self.id) {
            session.close("normal closure");
            self.broadcast(|| {
                protocol::from_server(
                    kind::USER_DISCONNECTED,
                    Value::String(format!("{} left the chat", session.name)),
                )
            });
        }
    }

    fn handle_register(&self, name: String) -> bool {
        if self.session().is_some() {
            self.reply_error("already registered");
            return false;
        }

        match self
            .registry
            .try_register(name.clone(), self.id, self.transport.clone())
        {
            Ok(_session) => {
                let names = self.registry.snapshot_names();
                self.reply(protocol::from_server(
                    kind::REGISTER_SUCCESS,
                    json!(names),
                ));
                self.broadcast_except(Some(self.id), || {
                    protocol::from_server(
                        kind::BROADCAST,
                        Value::String(format!("{name} joined the chat")),
                    )
                });
                false
            }
            Err(e) => {
                self.reply_error(e.to_string());
                true
            }
        }
    }

    fn handle_broadcast(&self, sender: String, content: Value) -> bool {
        self.broadcast(|| protocol::from_sender(kind::BROADCAST, sender.clone(), content.clone()));
        false
    }

    fn handle_private(&self, sender: String, target: Option<String>, content: Value) -> bool {
        let Some(target_name) = target else {
            self.reply_error("missing target");
            return false;
        };
        match self.registry.lookup_by_name(&target_name) {
            Some(target_session) => {
                let text = protocol::encode(protocol::from_sender(
                    kind::PRIVATE,
                    sender,
                    content,
                ));
                if target_session.send(&text).is_err() {
                    tracing::warn!(target = %target_name, "private delivery failed");
                }
            }
            None => self.reply_error(format!("user not found: {target_name}")),
        }
        false
    }

    fn handle_list_users(&self) -> bool {
        let names = self.registry.snapshot_names();
        self.reply(protocol::from_server(kind::LIST_USERS_RESPONSE, json!(names)));
        false
    }

    fn handle_user_info(&self, target: Option<String>) -> bool {
        let Some(target_name) = target else {
            self.reply_error("missing target");
            return false;
        };
        let content = match self.registry.lookup_by_name(&target_name) {
            Some(session) => json!({ "ip": session.remote_addr, "status": session.status().as_wire() }),
            None => Value::String("user not found".to_string()),
        };
        let mut frame = protocol::from_server(kind::USER_INFO_RESPONSE, content);
        frame.target = Some(target_name);
        self.reply(frame);
        false
    }

    fn handle_change_status(&self, user: String, content: Value) -> bool {
        let raw_status = content.as_str().unwrap_or("");
        let Some(status) = Status::parse(raw_status) else {
            self.reply_error(format!("invalid status: {raw_status}"));
            return false;
        };

        if let Some(session) = self.session() {
            session.set_status(status);
            session.touch();
        }

        self.broadcast(|| {
            protocol::from_server(
                kind::STATUS_UPDATE,
                json!({ "user": user.clone(), "status": status.as_wire() }),
            )
        });
        false
    }

    fn handle_disconnect(&self) -> bool {
        self.handle_close();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingTransport {
        addr: String,
        sent: Mutex<Vec<String>>,
        closed: std::sync::atomic::AtomicUsize,
    }

    impl RecordingTransport {
        fn new(addr: &str) -> Arc<Self> {
            Arc::new(RecordingTransport {
                addr: addr.to_string(),
                sent: Mutex::new(Vec::new()),
                closed: std::sync::atomic::AtomicUsize::new(0),
            })
        }

        fn messages(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for RecordingTransport {
        fn send(&self, text: &str) -> crate::error::Result<()> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn remote_addr(&self) -> &str {
            &self.addr
        }

        fn close(&self, _reason: &str) {
            self.closed.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }

    fn register(registry: &Registry, name: &str, addr: &str) -> (Dispatcher, Arc<RecordingTransport>) {
        let transport = RecordingTransport::new(addr);
        let dispatcher = Dispatcher::new(registry.clone(), transport.clone());
        let frame = format!(r#"{{"type":"register","sender":"{name}","timestamp":"x"}}"#);
        assert!(!dispatcher.dispatch(&frame));
        (dispatcher, transport)
    }

    #[test]
    fn register_success_lists_self() {
        let registry = Registry::new();
        let (_d, transport) = register(&registry, "alice", "1.1.1.1");
        let messages = transport.messages();
        assert!(messages[0].contains("register_success"));
        assert!(messages[0].contains("alice"));
    }

    #[test]
    fn duplicate_name_is_rejected_and_closed() {
        let registry = Registry::new();
        let (_d1, _t1) = register(&registry, "alice", "1.1.1.1");

        let transport2 = RecordingTransport::new("2.2.2.2");
        let dispatcher2 = Dispatcher::new(registry.clone(), transport2.clone());
        let should_close = dispatcher2
            .dispatch(r#"{"type":"register","sender":"alice","timestamp":"x"}"#);
        assert!(should_close);
        assert!(transport2.messages()[0].contains("name in use"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn register_join_announcement_excludes_new_user() {
        let registry = Registry::new();
        let (_d1, t1) = register(&registry, "alice", "1.1.1.1");

        let (_d2, t2) = register(&registry, "bob", "2.2.2.2");

        assert!(!t2.messages().iter().any(|m| m.contains("joined the chat")));
        assert!(t1.messages().iter().any(|m| m.contains("bob joined the chat")));
    }

    #[test]
    fn user_info_response_includes_target() {
        let registry = Registry::new();
        let (d1, t1) = register(&registry, "alice", "1.1.1.1");
        let (_d2, _t2) = register(&registry, "bob", "2.2.2.2");

        d1.dispatch(r#"{"type":"user_info","sender":"alice","target":"bob"}"#);

        let reply = t1.messages().last().unwrap().clone();
        assert!(reply.contains("\"target\":\"bob\""));
        assert!(reply.contains("2.2.2.2"));
    }

    #[test]
    fn disconnect_closes_transport() {
        let registry = Registry::new();
        let transport = RecordingTransport::new("1.1.1.1");
        let dispatcher = Dispatcher::new(registry, transport.clone());
        assert!(!dispatcher.dispatch(r#"{"type":"register","sender":"alice","timestamp":"x"}"#));

        dispatcher.dispatch(r#"{"type":"disconnect","sender":"alice","timestamp":"x"}"#);

        assert_eq!(transport.closed.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn broadcast_reaches_sender_and_peers() {
        let registry = Registry::new();
        let (d1, t1) = register(&registry, "alice", "1.1.1.1");
        let (_d2, t2) = register(&registry, "bob", "2.2.2.2");

        d1.dispatch(r#"{"type":"broadcast","sender":"alice","content":"hi","timestamp":"x"}"#);

        assert!(t1.messages().iter().any(|m| m.contains("\"content\":\"hi\"")));
        assert!(t2.messages().iter().any(|m| m.contains("\"content\":\"hi\"")));
    }

    #[test]
    fn private_message_reaches_only_target() {
        let registry = Registry::new();
        let (d1, _t1) = register(&registry, "alice", "1.1.1.1");
        let (_d2, t2) = register(&registry, "bob", "2.2.2.2");
        let (_d3, t3) = register(&registry, "carol", "3.3.3.3");

        d1.dispatch(r#"{"type":"private","sender":"alice","target":"bob","content":"psst","timestamp":"x"}"#);

        assert!(t2.messages().iter().any(|m| m.contains("psst")));
        assert!(!t3.messages().iter().any(|m| m.contains("psst")));
    }

    #[test]
    fn private_to_unknown_target_errors() {
        let registry = Registry::new();
        let (d1, t1) = register(&registry, "alice", "1.1.1.1");

        d1.dispatch(r#"{"type":"private","sender":"alice","target":"zoe","content":"hey","timestamp":"x"}"#);

        assert!(t1.messages().last().unwrap().contains("user not found"));
    }

    #[test]
    fn change_status_broadcasts_update() {
        let registry = Registry::new();
        let (d1, t1) = register(&registry, "alice", "1.1.1.1");

        d1.dispatch(r#"{"type":"change_status","sender":"alice","content":"OCUPADO","timestamp":"x"}"#);

        assert!(t1.messages().last().unwrap().contains("OCUPADO"));
        assert_eq!(registry.lookup_by_name("alice").unwrap().status().as_wire(), "OCUPADO");
    }

    #[test]
    fn invalid_status_is_rejected_without_state_change() {
        let registry = Registry::new();
        let (d1, t1) = register(&registry, "alice", "1.1.1.1");

        d1.dispatch(r#"{"type":"change_status","sender":"alice","content":"WAT","timestamp":"x"}"#);

        assert!(t1.messages().last().unwrap().contains("invalid status"));
        assert_eq!(registry.lookup_by_name("alice").unwrap().status().as_wire(), "ACTIVO");
    }

    #[test]
    fn disconnect_removes_session_and_notifies_peers() {
        let registry = Registry::new();
        let (d1, _t1) = register(&registry, "alice", "1.1.1.1");
        let (_d2, t2) = register(&registry, "bob", "2.2.2.2");

        let should_close = d1.dispatch(r#"{"type":"disconnect","sender":"alice","timestamp":"x"}"#);

        assert!(should_close);
        assert!(registry.lookup_by_name("alice").is_none());
        assert!(t2.messages().iter().any(|m| m.contains("user_disconnected")));
    }

    #[test]
    fn frame_before_registration_is_rejected() {
        let registry = Registry::new();
        let transport = RecordingTransport::new("1.1.1.1");
        let dispatcher = Dispatcher::new(registry, transport.clone());

        let should_close = dispatcher.dispatch(r#"{"type":"list_users","sender":"alice"}"#);

        assert!(should_close);
        assert!(transport.messages()[0].contains("not registered"));
    }

    #[test]
    fn unknown_type_does_not_close() {
        let registry = Registry::new();
        let (d1, t1) = register(&registry, "alice", "1.1.1.1");

        let should_close = d1.dispatch(r#"{"type":"teleport","sender":"alice"}"#);

        assert!(!should_close);
        assert!(t1.messages().last().unwrap().contains("unknown command"));
    }

    #[test]
    fn malformed_frame_is_dropped_silently() {
        let registry = Registry::new();
        let (d1, t1) = register(&registry, "alice", "1.1.1.1");
        let before = t1.messages().len();

        let should_close = d1.dispatch("not json");

        assert!(!should_close);
        assert_eq!(t1.messages().len(), before);
    }
}
