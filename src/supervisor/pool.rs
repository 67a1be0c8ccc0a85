//! Worker bookkeeping.

use std::collections::BTreeSet;
use std::fmt;

/// OS process id of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub u32);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Live workers plus the size the supervisor keeps the pool at.
///
/// All transitions consume the pool and return the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerPool {
    size: usize,
    workers: BTreeSet<WorkerId>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            workers: BTreeSet::new(),
        }
    }

    /// Add a freshly started worker.
    #[must_use]
    pub fn admit(mut self, id: WorkerId) -> Self {
        self.workers.insert(id);
        self
    }

    /// Swap an exited worker for its replacement; the length is unchanged
    /// when `exited` was a member.
    #[must_use]
    pub fn replace(mut self, exited: WorkerId, replacement: WorkerId) -> Self {
        self.workers.remove(&exited);
        self.workers.insert(replacement);
        self
    }

    #[must_use]
    pub fn remove(mut self, id: WorkerId) -> Self {
        self.workers.remove(&id);
        self
    }

    /// Target size.
    pub const fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.workers.len() >= self.size
    }

    pub fn contains(&self, id: WorkerId) -> bool {
        self.workers.contains(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = WorkerId> + '_ {
        self.workers.iter().copied()
    }
}
