//! Error types for the chat server core.

/// Errors that can occur while routing chat protocol messages.
///
/// Variants map to the rejection/failure modes a single session can hit:
///
/// - **Wire**: [`Malformed`](Self::Malformed) — invalid JSON or missing fields.
/// - **Registration**: [`NameTaken`](Self::NameTaken), [`AlreadyRegistered`](Self::AlreadyRegistered),
///   [`NotRegistered`](Self::NotRegistered).
/// - **Routing**: [`TargetMissing`](Self::TargetMissing), [`UnknownType`](Self::UnknownType).
/// - **State**: [`InvalidStatus`](Self::InvalidStatus).
/// - **Transport**: [`TransportBroken`](Self::TransportBroken), [`Io`](Self::Io).
/// - **Server**: [`BindFailure`](Self::BindFailure).
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Underlying I/O or socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame was not valid JSON, or lacked a required field.
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// A `register` frame named a display name already held by a live session.
    #[error("name in use: {0}")]
    NameTaken(String),

    /// A `register` frame arrived on a transport that already has a session.
    #[error("already registered: {0}")]
    AlreadyRegistered(String),

    /// A non-`register` frame arrived before the connection registered.
    #[error("not registered")]
    NotRegistered,

    /// `private` or `user_info` named a target with no live session.
    #[error("user not found: {0}")]
    TargetMissing(String),

    /// `change_status` carried a value outside {ACTIVE, BUSY, INACTIVE}.
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// Frame `type` was not one of the known kinds.
    #[error("unknown command: {0}")]
    UnknownType(String),

    /// Outbound write to a session's transport failed.
    #[error("transport broken for session: {0}")]
    TransportBroken(String),

    /// The listener could not bind to its configured address.
    #[error("failed to bind: {0}")]
    BindFailure(String),
}

/// Convenience alias for `Result<T, ChatError>`.
pub type Result<T> = std::result::Result<T, ChatError>;
