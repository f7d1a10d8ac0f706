//! Ctrl+C handling shared by every command.
//!
//! Batch commands exit right away. Once `serve` registers its server, Ctrl+C
//! instead unblocks the request loop so `serve` returns normally and any
//! request still running can finish its atomic write.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::Context;
use tiny_http::Server;

/// Exit status for termination by SIGINT.
const INTERRUPTED_EXIT: i32 = 130;

struct Shutdown {
    requested: AtomicBool,
    server: OnceLock<Arc<Server>>,
}

static SHUTDOWN: Shutdown = Shutdown {
    requested: AtomicBool::new(false),
    server: OnceLock::new(),
};

impl Shutdown {
    /// Returns whether a server was there to unblock.
    fn request(&self) -> bool {
        self.requested.store(true, Ordering::SeqCst);
        match self.server.get() {
            Some(server) => {
                server.unblock();
                true
            }
            None => false,
        }
    }
}

/// Install the Ctrl+C handler. Call once, before any blocking work.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if SHUTDOWN.request() {
            crate::log!("serve"; "shutting down...");
        } else {
            std::process::exit(INTERRUPTED_EXIT);
        }
    })
    .context("failed to set Ctrl+C handler")
}

pub fn register_server(server: Arc<Server>) {
    // Only one server per process; later registrations are ignored.
    let _ = SHUTDOWN.server.set(server);
}

pub fn is_shutdown() -> bool {
    SHUTDOWN.requested.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_shutdown_by_default() {
        assert!(!is_shutdown());
    }
}
