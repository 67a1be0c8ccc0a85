//! Process-wide shutdown state.
//!
//! Ctrl+C (and SIGTERM) reach the supervisor and every worker:
//! - worker: the registered HTTP server is unblocked and the request loop ends
//! - supervisor: registered listeners are notified and the pool is stopped

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crossbeam::channel::{self, Receiver, Sender};
use tiny_http::Server;

/// Shutdown has been requested (Ctrl+C or SIGTERM received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Shutdown signal sender for the supervisor loop
static SHUTDOWN_TX: OnceLock<Sender<()>> = OnceLock::new();

/// Setup the global Ctrl+C / SIGTERM handler. Call once at program start
///
/// Before anything is registered the process exits immediately.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        let notified = SHUTDOWN_TX.get().is_some_and(|tx| tx.send(()).is_ok());

        if let Some(server) = SERVER.get() {
            crate::log!("serve"; "worker {} shutting down...", std::process::id());
            server.unblock();
        } else if !notified {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the HTTP server for graceful shutdown
///
/// Call this after creating the server, before entering the request loop
pub fn register_server(server: Arc<Server>) {
    let _ = SERVER.set(server);
}

/// Receiver notified once per Ctrl+C.
///
/// Only the first call registers a channel; later calls get a receiver that
/// never fires.
pub fn register_shutdown_listener() -> Receiver<()> {
    let (tx, rx) = channel::unbounded();
    match SHUTDOWN_TX.set(tx) {
        Ok(()) => rx,
        Err(_) => channel::never(),
    }
}

/// Check if shutdown has been requested
///
/// Uses Relaxed ordering for performance - worst case is processing
/// a few more items before stopping, which is acceptable
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
