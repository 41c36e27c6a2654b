//! Instance id allocation.
//!
//! Every scene node receives a process-unique [`InstanceId`]. Ids come from an
//! [`IdAllocator`] owned by the scene, so tests can inject a private
//! [`SequentialIds`] and get deterministic values, while production scenes
//! share the process-wide counter through [`ProcessIds`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically assigned identity of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Source of fresh instance ids.
pub trait IdAllocator: Send + Sync + fmt::Debug {
    /// Returns an id never returned before by this allocator.
    fn allocate(&self) -> InstanceId;
}

/// Atomic counter allocator. Ids start at 1.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    #[must_use]
    pub const fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Id that the next call to [`allocate`](IdAllocator::allocate) returns.
    #[must_use]
    pub fn peek(&self) -> InstanceId {
        InstanceId(self.next.load(Ordering::Relaxed))
    }

    /// Restarts the sequence at 1. Only meaningful for allocators that are
    /// not shared with live scenes.
    pub fn reset(&self) {
        self.next.store(1, Ordering::Relaxed);
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator for SequentialIds {
    #[inline]
    fn allocate(&self) -> InstanceId {
        InstanceId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

static PROCESS_IDS: SequentialIds = SequentialIds::new();

/// The process-wide allocator. Stateless handle onto a single global counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessIds;

impl IdAllocator for ProcessIds {
    #[inline]
    fn allocate(&self) -> InstanceId {
        PROCESS_IDS.allocate()
    }
}

/// Allocates from the process-wide counter.
#[inline]
#[must_use]
pub fn next_instance_id() -> InstanceId {
    PROCESS_IDS.allocate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_monotonic() {
        let ids = SequentialIds::new();
        let a = ids.allocate();
        let b = ids.allocate();
        assert_eq!(a.raw(), 1);
        assert_eq!(b.raw(), 2);
        assert_eq!(ids.peek().raw(), 3);
    }

    #[test]
    fn reset_restarts_sequence() {
        let ids = SequentialIds::starting_at(10);
        assert_eq!(ids.allocate().raw(), 10);
        ids.reset();
        assert_eq!(ids.allocate().raw(), 1);
    }

    #[test]
    fn process_ids_never_repeat() {
        let a = ProcessIds.allocate();
        let b = next_instance_id();
        assert!(b > a);
    }
}
