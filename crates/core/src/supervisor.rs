//! Background inactivity scan (grounded in the reference implementation's
//! `monitor_inactividad` thread: a fixed-cadence sweep that demotes sessions
//! which have gone quiet, nothing more).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::json;

use crate::protocol::{self, Status, kind};
use crate::session::Registry;

/// Default interval between inactivity scans.
pub const SCAN_INTERVAL: Duration = Duration::from_secs(5);
/// Default age (since last activity) at which an `Active` session is demoted.
pub const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs the periodic inactivity scan on its own OS thread.
///
/// Demotion is the only thing this task does: it never removes sessions,
/// and it only ever moves `Active -> Inactive`. Any subsequent inbound frame
/// resets the idle clock; only an explicit `change_status` re-promotes.
pub struct Supervisor {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Supervisor {
    /// Spawn the scan loop against `registry` using the default cadence and
    /// timeout.
    pub fn start(registry: Registry) -> Self {
        Self::start_with(registry, SCAN_INTERVAL, INACTIVITY_TIMEOUT)
    }

    /// Spawn the scan loop with explicit tunables, e.g. for tests that want
    /// a faster cadence than the production defaults.
    pub fn start_with(registry: Registry, scan_interval: Duration, inactivity_timeout: Duration) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = running.clone();

        let handle = thread::spawn(move || {
            while thread_running.load(Ordering::SeqCst) {
                thread::sleep(scan_interval);
                if !thread_running.load(Ordering::SeqCst) {
                    break;
                }
                scan_once(&registry, inactivity_timeout);
            }
        });

        Supervisor {
            running,
            handle: Some(handle),
        }
    }

    /// Signal the scan loop to stop and wait for it to exit.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Demote every `Active` session idle longer than `timeout`, broadcasting
/// one `status_update` per demotion.
fn scan_once(registry: &Registry, timeout: Duration) {
    let sessions = registry.snapshot_sessions();
    let mut demoted = Vec::new();

    for session in &sessions {
        if session.status() == Status::Active && session.idle_for() > timeout {
            session.set_status(Status::Inactive);
            tracing::debug!(session = %session.name, "demoted to INACTIVO after inactivity");
            demoted.push(session.name.clone());
        }
    }

    for name in demoted {
        for session in &sessions {
            let text = protocol::encode(protocol::from_server(
                kind::STATUS_UPDATE,
                json!({ "user": name, "status": Status::Inactive.as_wire() }),
            ));
            let _ = session.send(&text);
        }
    }
}
