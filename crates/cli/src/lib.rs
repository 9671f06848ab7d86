//! The WebSocket transport binary for `chat-core`: an axum server exposing
//! `GET /chat` as a WebSocket upgrade (subprotocol `chat-protocol`), bridging
//! decoded text frames to a [`Dispatcher`] per connection.

pub mod config;
pub mod transport;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::IntoResponse;
use axum::routing::get;
use futures_util::StreamExt;
use tokio::net::TcpListener;

use chat_core::dispatcher::Dispatcher;
use chat_core::{Registry, Supervisor};

pub use config::ServerConfig;
use transport::{WsCommand, WsTransport};

const SUBPROTOCOL: &str = "chat-protocol";

#[derive(Clone)]
struct AppState {
    registry: Registry,
}

/// Build the router in isolation from the listener, so tests can drive it
/// against an ephemeral port without going through [`run`].
pub fn app(registry: Registry) -> Router {
    Router::new()
        .route("/chat", get(ws_handler))
        .with_state(AppState { registry })
}

/// Bind, start the inactivity supervisor, and serve until `shutdown` resolves.
pub async fn run(config: ServerConfig, shutdown: impl std::future::Future<Output = ()> + Send + 'static) -> chat_core::Result<()> {
    let registry = Registry::new();
    let mut supervisor = Supervisor::start_with(registry.clone(), config.scan_interval, config.inactivity_timeout);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| chat_core::ChatError::BindFailure(e.to_string()))?;

    tracing::info!(%addr, "chat server listening");

    let serve = axum::serve(
        listener,
        app(registry).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown);

    if let Err(e) = serve.await {
        tracing::error!(error = %e, "server error");
    }

    supervisor.stop();
    tracing::info!("chat server shut down");
    Ok(())
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.protocols([SUBPROTOCOL])
        .on_upgrade(move |socket| handle_socket(socket, addr, state))
}

async fn handle_socket(socket: WebSocket, addr: SocketAddr, state: AppState) {
    let (ws_tx, mut ws_rx) = socket.split();
    let (cmd_tx, cmd_rx) = tokio::sync::mpsc::unbounded_channel::<WsCommand>();

    let writer = tokio::spawn(transport::run_writer(ws_tx, cmd_rx));

    let ws_transport = Arc::new(WsTransport::new(addr.to_string(), cmd_tx));
    let dispatcher = Dispatcher::new(state.registry, ws_transport.clone());

    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if dispatcher.dispatch(&text) {
                    break;
                }
            }
            Ok(Message::Binary(_)) => {
                let _ = ws_transport.send(&chat_core::protocol::encode(
                    chat_core::protocol::error_frame("binary frames are not supported"),
                ));
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Err(e) => {
                tracing::warn!(%addr, error = %e, "websocket error");
                break;
            }
        }
    }

    dispatcher.handle_close();
    drop(dispatcher);
    drop(ws_transport);
    let _ = writer.await;
}
