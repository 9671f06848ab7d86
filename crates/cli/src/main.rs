use clap::Parser;

use chat_cli::ServerConfig;

#[derive(Parser)]
#[command(name = "chat-server", about = "Real-time JSON chat server")]
struct Args {
    /// Port to listen on (default 8080).
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = ServerConfig::with_port(args.port);

    if let Err(e) = chat_cli::run(config, shutdown_signal()).await {
        eprintln!("chat server failed: {e}");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("received SIGINT, shutting down");
}
