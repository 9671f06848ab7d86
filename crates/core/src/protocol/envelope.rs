//! The chat wire envelope (JSON object with `type`/`sender`/`target`/`content`/`timestamp`).
//!
//! Inbound frames are decoded into [`Frame`] without validating `kind` against
//! a fixed set of variants — an unrecognized `type` must still produce a
//! usable `Frame` so the dispatcher can answer with [`ChatError::UnknownType`](crate::error::ChatError::UnknownType)
//! instead of silently dropping the connection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Presence status of a registered session.
///
/// The wire literals (`ACTIVO`, `OCUPADO`, `INACTIVO`) are carried bit-exact
/// for compatibility with existing clients — do not translate them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    Busy,
    Inactive,
}

impl Status {
    pub const ACTIVE_LITERAL: &'static str = "ACTIVO";
    pub const BUSY_LITERAL: &'static str = "OCUPADO";
    pub const INACTIVE_LITERAL: &'static str = "INACTIVO";

    pub fn as_wire(self) -> &'static str {
        match self {
            Status::Active => Self::ACTIVE_LITERAL,
            Status::Busy => Self::BUSY_LITERAL,
            Status::Inactive => Self::INACTIVE_LITERAL,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            Self::ACTIVE_LITERAL => Some(Status::Active),
            Self::BUSY_LITERAL => Some(Status::Busy),
            Self::INACTIVE_LITERAL => Some(Status::Inactive),
            _ => None,
        }
    }
}

impl Serialize for Status {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Status::parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid status: {raw}")))
    }
}

/// A decoded inbound frame. `kind` is kept as the raw string the client sent
/// so the dispatcher — not the codec — decides what to do with an unknown one.
#[derive(Debug, Clone, Deserialize)]
pub struct Frame {
    #[serde(rename = "type")]
    pub kind: String,
    pub sender: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub content: Value,
}

/// An outbound frame, ready for [`timestamp`](Self::stamp) and serialization.
#[derive(Debug, Clone, Serialize)]
pub struct Outbound {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub sender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub content: Value,
    pub timestamp: String,
}

/// Literal `sender` value used on every server-originated frame.
pub const SERVER_SENDER: &str = "server";

pub mod kind {
    pub const REGISTER: &str = "register";
    pub const REGISTER_SUCCESS: &str = "register_success";
    pub const BROADCAST: &str = "broadcast";
    pub const PRIVATE: &str = "private";
    pub const LIST_USERS: &str = "list_users";
    pub const LIST_USERS_RESPONSE: &str = "list_users_response";
    pub const USER_INFO: &str = "user_info";
    pub const USER_INFO_RESPONSE: &str = "user_info_response";
    pub const CHANGE_STATUS: &str = "change_status";
    pub const STATUS_UPDATE: &str = "status_update";
    pub const DISCONNECT: &str = "disconnect";
    pub const USER_DISCONNECTED: &str = "user_disconnected";
    pub const ERROR: &str = "error";
}
