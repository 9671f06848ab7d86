//! Process-level configuration: listen port plus the two supervisor tunables.
//!
//! No file-based configuration format is introduced here — the reference
//! implementation and the distilled protocol show no config file, only a
//! positional port argument, so this stays proportionate to that.

use std::time::Duration;

use chat_core::supervisor::{INACTIVITY_TIMEOUT, SCAN_INTERVAL};

/// Default TCP port the server listens on when no port is given on the
/// command line.
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub scan_interval: Duration,
    pub inactivity_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
            scan_interval: SCAN_INTERVAL,
            inactivity_timeout: INACTIVITY_TIMEOUT,
        }
    }
}

impl ServerConfig {
    pub fn with_port(port: Option<u16>) -> Self {
        ServerConfig {
            port: port.unwrap_or(DEFAULT_PORT),
            ..Default::default()
        }
    }
}
