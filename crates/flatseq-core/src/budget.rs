//! Allocator-handle contracts.
//!
//! `flatseq-mem` owns the only implementation; stages and tests see these
//! traits so the accounting rules are written down in one place.

/// Proof that some bytes are accounted against an arena.
///
/// Dropping the guard gives the bytes back, including on unwind.
pub trait BudgetGuard: Send {
    fn bytes(&self) -> usize;

    /// Tag of the stage buffer holding the bytes, for diagnostics.
    fn tag(&self) -> &'static str {
        "unnamed"
    }
}

/// An arena with a hard byte cap.
///
/// A refused `try_acquire` is final for that request. Callers turn it into an
/// allocation error; nothing retries or degrades to a partial result.
pub trait MemoryBudget: Send + Sync + 'static {
    type Guard: BudgetGuard;

    fn try_acquire(&self, bytes: usize, tag: &'static str) -> Option<Self::Guard>;

    fn capacity_bytes(&self) -> usize;

    fn used_bytes(&self) -> usize;

    /// Bytes that can still be acquired before the cap refuses.
    fn headroom_bytes(&self) -> usize {
        self.capacity_bytes().saturating_sub(self.used_bytes())
    }
}
