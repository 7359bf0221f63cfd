//! Allocator handle + RAII guard implementations.
//!
//! Stages must *always* acquire a guard before buffering. Dropping the guard
//! returns the bytes to the arena (panic-safe).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use flatseq_core::budget::{BudgetGuard, MemoryBudget};
use flatseq_core::config::{Capacities, PipelineConfig};

use crate::error::{Error, Result};
use crate::tracking::PeakTracker;

/// Shared inner state for the arena.
struct ArenaInner {
    capacity: usize,
    used: AtomicUsize,
    peak: PeakTracker,
    capacities: Capacities,
}

impl ArenaInner {
    fn new(capacity: usize, capacities: Capacities) -> Self {
        Self {
            capacity,
            used: AtomicUsize::new(0),
            peak: PeakTracker::new(),
            capacities,
        }
    }

    fn try_acquire(&self, bytes: usize) -> bool {
        loop {
            let cur = self.used.load(Ordering::Relaxed);
            let next = cur.saturating_add(bytes);
            if next > self.capacity {
                return false;
            }
            if self
                .used
                .compare_exchange(cur, next, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                self.peak.record_used(next);
                return true;
            }
        }
    }

    fn release(&self, bytes: usize) {
        self.used.fetch_sub(bytes, Ordering::AcqRel);
    }

    fn used(&self) -> usize {
        self.used.load(Ordering::Relaxed)
    }
}

/// Allocator handle threaded by value through a pipeline.
///
/// Cloning is cheap and every clone refers to the same arena. The handle also
/// carries the buffer sizing hints stages use for their first allocation.
#[derive(Clone)]
pub struct Allocator {
    inner: Arc<ArenaInner>,
}

impl Allocator {
    /// Arena with a hard cap of `capacity_bytes`.
    pub fn new(capacity_bytes: usize) -> Self {
        Self::with_capacities(capacity_bytes, Capacities::default())
    }

    /// Scratch arena without a practical cap. Accounting still applies.
    pub fn unbounded() -> Self {
        Self::new(usize::MAX)
    }

    pub fn with_capacities(capacity_bytes: usize, capacities: Capacities) -> Self {
        Self {
            inner: Arc::new(ArenaInner::new(capacity_bytes, capacities)),
        }
    }

    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self::with_capacities(cfg.mem_cap_bytes.unwrap_or(usize::MAX), cfg.capacities())
    }

    /// Current usage.
    pub fn used_bytes(&self) -> usize {
        self.inner.used()
    }

    pub fn capacity_bytes(&self) -> usize {
        self.inner.capacity
    }

    /// High-water mark since the arena was created.
    pub fn peak_bytes(&self) -> usize {
        self.inner.peak.peak()
    }

    pub fn capacities(&self) -> Capacities {
        self.inner.capacities
    }

    /// Acquire `bytes`, mapping a refusal to [`Error::BudgetExceeded`].
    pub fn acquire(&self, bytes: usize, tag: &'static str) -> Result<AllocGuard> {
        self.try_acquire(bytes, tag).ok_or_else(|| {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                tag,
                requested = bytes,
                used = self.used_bytes(),
                capacity = self.capacity_bytes(),
                "allocation refused"
            );
            Error::BudgetExceeded {
                tag,
                requested: bytes,
                capacity: self.capacity_bytes(),
                used: self.used_bytes(),
            }
        })
    }
}

impl std::fmt::Debug for Allocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Allocator")
            .field("capacity", &self.inner.capacity)
            .field("used", &self.inner.used())
            .field("headroom", &MemoryBudget::headroom_bytes(self))
            .finish()
    }
}

/// Bytes held by one buffer. Returned to the arena on drop.
pub struct AllocGuard {
    inner: Arc<ArenaInner>,
    bytes: usize,
    tag: &'static str,
}

impl Drop for AllocGuard {
    fn drop(&mut self) {
        if self.bytes > 0 {
            self.inner.release(self.bytes);
            self.bytes = 0;
        }
    }
}

impl std::fmt::Debug for AllocGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllocGuard")
            .field("bytes", &self.bytes)
            .field("tag", &self.tag)
            .finish()
    }
}

impl BudgetGuard for AllocGuard {
    fn bytes(&self) -> usize {
        self.bytes
    }
    fn tag(&self) -> &'static str {
        self.tag
    }
}

impl AllocGuard {
    /// Move the accounted size to `new_bytes`. Shrinking always succeeds;
    /// growing fails without side effects when the cap would be exceeded.
    pub fn try_resize(&mut self, new_bytes: usize) -> bool {
        if new_bytes == self.bytes {
            return true;
        }

        if new_bytes < self.bytes {
            let delta = self.bytes - new_bytes;
            self.inner.release(delta);
            self.bytes = new_bytes;
            true
        } else {
            let delta = new_bytes - self.bytes;
            if self.inner.try_acquire(delta) {
                self.bytes = new_bytes;
                true
            } else {
                false
            }
        }
    }

    pub(crate) fn arena_capacity(&self) -> usize {
        self.inner.capacity
    }

    pub(crate) fn arena_used(&self) -> usize {
        self.inner.used()
    }
}

impl MemoryBudget for Allocator {
    type Guard = AllocGuard;

    fn try_acquire(&self, bytes: usize, tag: &'static str) -> Option<Self::Guard> {
        if bytes == 0 {
            return Some(AllocGuard {
                inner: Arc::clone(&self.inner),
                bytes: 0,
                tag,
            });
        }
        if self.inner.try_acquire(bytes) {
            Some(AllocGuard {
                inner: Arc::clone(&self.inner),
                bytes,
                tag,
            })
        } else {
            None
        }
    }

    fn capacity_bytes(&self) -> usize {
        self.inner.capacity
    }

    fn used_bytes(&self) -> usize {
        self.inner.used()
    }
}
