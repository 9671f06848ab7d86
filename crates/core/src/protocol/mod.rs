//! The chat wire protocol: JSON frames exchanged between client and server.
//!
//! ## Message format
//!
//! ```text
//! {"type":"broadcast","sender":"alice","content":"hi","timestamp":"2025-01-01T00:00:00"}
//! ```
//!
//! `timestamp` is always `YYYY-MM-DDTHH:MM:SS` in local time, stamped by the
//! producer at encode time (RFC 2326-style request/response pairing does not
//! apply here — there is no CSeq, frames are routed by `type`).
//!
//! ## Frame kinds
//!
//! | Inbound | Outbound |
//! |---------|----------|
//! | `register` | `register_success` |
//! | `broadcast` | `broadcast` |
//! | `private` | `private` |
//! | `list_users` | `list_users_response` |
//! | `user_info` | `user_info_response` |
//! | `change_status` | `status_update` |
//! | `disconnect` | `user_disconnected` |
//! | — | `error` |

pub mod codec;
pub mod envelope;

pub use codec::{decode, encode, error_frame, from_sender, from_server};
pub use envelope::{Frame, Outbound, Status, kind};
