//! Per-worker ceiling on requests held at once.

use crossbeam::channel::{self, Receiver, Sender};

/// Counting slots backed by a bounded channel.
pub struct InFlight {
    acquire: Sender<()>,
    release: Receiver<()>,
}

/// Frees its slot on drop.
pub struct Slot(Receiver<()>);

impl InFlight {
    /// `limit` must be at least 1.
    pub fn new(limit: usize) -> Self {
        let (acquire, release) = channel::bounded(limit.max(1));
        Self { acquire, release }
    }

    /// Take a slot, or `None` when `limit` requests are already held.
    pub fn try_acquire(&self) -> Option<Slot> {
        self.acquire
            .try_send(())
            .ok()
            .map(|()| Slot(self.release.clone()))
    }

    pub fn held(&self) -> usize {
        self.acquire.len()
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        let _ = self.0.try_recv();
    }
}
