//! # chat-core — session registry and message dispatcher for the JSON chat protocol
//!
//! A transport-agnostic library implementing a real-time chat server's
//! routing core: name-unique session registration, a JSON message
//! dispatcher, and a background inactivity supervisor. WebSocket framing
//! and the TCP listener live outside this crate (see the `chat-cli` binary);
//! this crate only ever sees decoded text frames in and produces text
//! frames out, through the [`session::Transport`] trait.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  chat-cli — axum WebSocket transport      │
//! ├──────────────────────────────────────────┤
//! │  Dispatcher    — per-connection routing  │
//! │  Supervisor    — inactivity sweep        │
//! ├──────────────────────────────────────────┤
//! │  Session / Registry — session table      │
//! │  Protocol            — JSON envelope     │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use chat_core::{Registry, Supervisor};
//!
//! let registry = Registry::new();
//! let mut supervisor = Supervisor::start(registry.clone());
//! // ... accept connections, feed frames to a Dispatcher per connection ...
//! supervisor.stop();
//! ```
//!
//! ## Crate layout
//!
//! - [`dispatcher`] — [`Dispatcher`], the per-connection protocol state machine.
//! - [`supervisor`] — [`Supervisor`], the periodic inactivity sweep.
//! - [`session`] — [`session::Session`], [`Registry`], and the [`session::Transport`] seam.
//! - [`protocol`] — wire envelope types, codec, and [`protocol::Status`].
//! - [`error`] — [`ChatError`] and [`Result`].

pub mod dispatcher;
pub mod error;
pub mod protocol;
pub mod session;
pub mod supervisor;

pub use dispatcher::Dispatcher;
pub use error::{ChatError, Result};
pub use session::{Registry, Session};
pub use supervisor::Supervisor;
