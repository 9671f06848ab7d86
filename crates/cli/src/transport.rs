//! Bridges an axum [`WebSocket`] to [`chat_core::session::Transport`].
//!
//! `Transport::send` is a synchronous call (the dispatcher is plain,
//! non-async code shared with the test suite), but writing to the socket is
//! async — so sends are handed to a channel and a dedicated writer task
//! drives the actual `WebSocket::send`, the same split the reference
//! forwarder uses between its reader loop and its heartbeat/command sends.

use axum::extract::ws::{Message, WebSocket};
use tokio::sync::mpsc::UnboundedSender;

use chat_core::error::ChatError;
use chat_core::session::Transport;

pub enum WsCommand {
    Text(String),
    Close,
}

pub struct WsTransport {
    addr: String,
    tx: UnboundedSender<WsCommand>,
}

impl WsTransport {
    pub fn new(addr: String, tx: UnboundedSender<WsCommand>) -> Self {
        WsTransport { addr, tx }
    }
}

impl Transport for WsTransport {
    fn send(&self, text: &str) -> chat_core::Result<()> {
        self.tx
            .send(WsCommand::Text(text.to_string()))
            .map_err(|_| ChatError::TransportBroken(self.addr.clone()))
    }

    fn remote_addr(&self) -> &str {
        &self.addr
    }

    fn close(&self, _reason: &str) {
        let _ = self.tx.send(WsCommand::Close);
    }
}

/// Drains `rx` onto `socket` until the channel closes or a send fails.
/// Runs on its own task, paired one-to-one with a connection's [`WsTransport`].
pub async fn run_writer(mut socket: futures_util::stream::SplitSink<WebSocket, Message>, mut rx: tokio::sync::mpsc::UnboundedReceiver<WsCommand>) {
    use futures_util::SinkExt;

    while let Some(cmd) = rx.recv().await {
        match cmd {
            WsCommand::Text(text) => {
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            WsCommand::Close => {
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
        }
    }
}
