//! Worker process supervision.
//!
//! ```text
//! Starting ──(N spawned)──► Running ──(worker exit)──► respawn, stay Running
//!                               │
//!                          shutdown signal
//!                               ▼
//!                     SIGTERM remaining workers, return
//! ```
//!
//! Restarts are unconditional and unthrottled: a worker that dies on startup
//! is respawned in a tight loop.

mod launch;
mod pool;

pub use launch::{ExecLauncher, Launcher};
pub use pool::{WorkerId, WorkerPool};

use anyhow::{Context, Result};
use crossbeam::channel::{self, Receiver, Sender};
use std::ops::ControlFlow;
use std::process::ExitStatus;
use std::thread;
use std::time::{Duration, Instant};

use crate::{debug, log, warn};

/// How long terminated workers get before they are killed.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// `(worker, status)`; status is `None` when waiting on the child failed.
type Exit = (WorkerId, Option<ExitStatus>);

/// Pool transitions reported to an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorEvent {
    Started(WorkerId),
    Respawned {
        exited: WorkerId,
        status: Option<ExitStatus>,
        replacement: WorkerId,
    },
}

/// Keeps `size` workers alive until shutdown.
pub struct Supervisor<L: Launcher> {
    launcher: L,
    size: usize,
    shutdown: Receiver<()>,
}

impl<L: Launcher> Supervisor<L> {
    pub fn new(launcher: L, size: usize) -> Self {
        Self {
            launcher,
            size,
            shutdown: channel::never(),
        }
    }

    /// Stop once a message arrives on `shutdown` or its sender is dropped.
    pub fn with_shutdown(mut self, shutdown: Receiver<()>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Supervise until shutdown. Blocks.
    pub fn run(self) -> Result<()> {
        self.run_observed(|_, _| ControlFlow::Continue(()))
    }

    /// Like [`run`](Self::run), calling `observe` after every pool
    /// transition. Returning `Break` shuts the pool down.
    pub fn run_observed<F>(self, mut observe: F) -> Result<()>
    where
        F: FnMut(&SupervisorEvent, &WorkerPool) -> ControlFlow<()>,
    {
        let Self {
            mut launcher,
            size,
            shutdown,
        } = self;
        let (exit_tx, exit_rx) = channel::unbounded::<Exit>();
        let mut pool = WorkerPool::new(size);

        while !pool.is_full() {
            let id = match spawn(&mut launcher, &exit_tx) {
                Ok(id) => id,
                Err(e) => {
                    terminate(pool, &exit_rx);
                    return Err(e.context("failed to start worker"));
                }
            };
            pool = pool.admit(id);
            debug!("supervisor"; "started worker {id}");
            if observe(&SupervisorEvent::Started(id), &pool).is_break() {
                terminate(pool, &exit_rx);
                return Ok(());
            }
        }
        log!("supervisor"; "{} workers running", pool.len());

        loop {
            channel::select! {
                recv(exit_rx) -> exit => {
                    let Ok((exited, status)) = exit else { break };
                    // Exits caused by the shutdown itself are not respawned
                    if !shutdown.is_empty() {
                        pool = pool.remove(exited);
                        break;
                    }
                    warn!("supervisor"; "worker {exited} {}, restarting", describe(status));

                    let replacement = match spawn(&mut launcher, &exit_tx) {
                        Ok(id) => id,
                        Err(e) => {
                            terminate(pool.remove(exited), &exit_rx);
                            return Err(e.context("failed to respawn worker"));
                        }
                    };
                    pool = pool.replace(exited, replacement);
                    let event = SupervisorEvent::Respawned { exited, status, replacement };
                    if observe(&event, &pool).is_break() {
                        break;
                    }
                }
                recv(shutdown) -> _ => break,
            }
        }

        log!("supervisor"; "stopping {} workers", pool.len());
        terminate(pool, &exit_rx);
        Ok(())
    }
}

/// Launch one worker and attach a waiter thread reporting its exit.
fn spawn<L: Launcher>(launcher: &mut L, exits: &Sender<Exit>) -> Result<WorkerId> {
    let mut child = launcher.launch().context("failed to launch process")?;
    let id = WorkerId(child.id());
    let exits = exits.clone();

    thread::Builder::new()
        .name(format!("wait-{id}"))
        .spawn(move || {
            let status = child.wait().ok();
            // The supervisor may already be gone
            let _ = exits.send((id, status));
        })
        .context("failed to spawn waiter thread")?;
    Ok(id)
}

/// Terminate every worker in `pool` and wait (bounded) for their exits.
fn terminate(mut pool: WorkerPool, exits: &Receiver<Exit>) {
    if pool.is_empty() {
        return;
    }
    for id in pool.ids() {
        signal(id, Signal::Term);
    }

    let deadline = Instant::now() + SHUTDOWN_GRACE;
    while !pool.is_empty() {
        match exits.recv_deadline(deadline) {
            Ok((id, _)) => pool = pool.remove(id),
            Err(_) => break,
        }
    }

    for id in pool.ids() {
        warn!("supervisor"; "worker {id} ignored SIGTERM, killing");
        signal(id, Signal::Kill);
    }
}

enum Signal {
    Term,
    Kill,
}

#[cfg(unix)]
fn signal(id: WorkerId, signal: Signal) {
    use nix::sys::signal::{self, Signal as Sig};
    use nix::unistd::Pid;

    let sig = match signal {
        Signal::Term => Sig::SIGTERM,
        Signal::Kill => Sig::SIGKILL,
    };
    let Ok(pid) = i32::try_from(id.0) else {
        return;
    };
    if let Err(e) = signal::kill(Pid::from_raw(pid), sig) {
        // ESRCH: already gone
        debug!("supervisor"; "signal {sig:?} to worker {id}: {e}");
    }
}

#[cfg(not(unix))]
fn signal(id: WorkerId, _signal: Signal) {
    warn!("supervisor"; "cannot signal worker {id} on this platform");
}

/// Human-readable exit reason.
fn describe(status: Option<ExitStatus>) -> String {
    let Some(status) = status else {
        return "exited (status unavailable)".into();
    };
    if let Some(code) = status.code() {
        return format!("exited with code {code}");
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("killed by signal {signal}");
        }
    }
    format!("exited ({status})")
}
