//! Decode/encode between wire text and [`Frame`]/[`Outbound`].

use serde_json::Value;

use super::envelope::{Frame, Outbound, SERVER_SENDER};
use crate::error::ChatError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a single text frame. Rejects anything that isn't valid JSON or is
/// missing `type`/`sender` — both are required to safely address an `error`
/// reply back to the caller, so callers that fail this step must be dropped
/// silently rather than answered (the sender cannot be trusted).
pub fn decode(raw: &str) -> crate::error::Result<Frame> {
    serde_json::from_str(raw).map_err(|e| ChatError::Malformed(e.to_string()))
}

/// Serialize an outbound frame, stamping `timestamp` with the current local
/// time immediately before encoding.
pub fn encode(mut frame: Outbound) -> String {
    frame.timestamp = now();
    serde_json::to_string(&frame).expect("Outbound always serializes")
}

fn now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Build an outbound frame addressed as coming from a named sender.
pub fn from_sender(kind: &'static str, sender: impl Into<String>, content: Value) -> Outbound {
    Outbound {
        kind,
        sender: sender.into(),
        target: None,
        content,
        timestamp: String::new(),
    }
}

/// Build an outbound frame addressed as coming from the server.
pub fn from_server(kind: &'static str, content: Value) -> Outbound {
    from_sender(kind, SERVER_SENDER, content)
}

/// Build a server-originated `error` frame.
pub fn error_frame(message: impl Into<String>) -> Outbound {
    from_server(super::envelope::kind::ERROR, Value::String(message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::envelope::kind;

    #[test]
    fn decode_register_frame() {
        let raw = r#"{"type":"register","sender":"alice","timestamp":"2025-01-01T00:00:00"}"#;
        let frame = decode(raw).unwrap();
        assert_eq!(frame.kind, "register");
        assert_eq!(frame.sender, "alice");
        assert!(frame.target.is_none());
    }

    #[test]
    fn decode_rejects_non_json() {
        assert!(decode("not json").is_err());
    }

    #[test]
    fn decode_rejects_missing_sender() {
        let raw = r#"{"type":"register"}"#;
        assert!(decode(raw).is_err());
    }

    #[test]
    fn decode_keeps_unknown_kind() {
        let raw = r#"{"type":"frobnicate","sender":"alice"}"#;
        let frame = decode(raw).unwrap();
        assert_eq!(frame.kind, "frobnicate");
    }

    #[test]
    fn encode_stamps_timestamp_and_kind() {
        let frame = from_server(kind::LIST_USERS_RESPONSE, serde_json::json!(["alice", "bob"]));
        let s = encode(frame);
        assert!(s.contains("\"type\":\"list_users_response\""));
        assert!(s.contains("\"sender\":\"server\""));
        assert!(s.contains("\"timestamp\":\""));
    }

    #[test]
    fn encode_omits_target_when_absent() {
        let frame = from_server(kind::BROADCAST, Value::String("hi".into()));
        let s = encode(frame);
        assert!(!s.contains("\"target\""));
    }

    #[test]
    fn error_frame_has_server_sender() {
        let frame = error_frame("user not found");
        assert_eq!(frame.sender, "server");
    }
}
