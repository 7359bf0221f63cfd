//! Budget-accounted element buffers.
//!
//! Every element buffer a stage holds is an `ArenaBuf`. The accounted size is
//! `capacity * size_of::<T>()`; growth acquires the delta from the arena
//! *before* reserving, so a refused growth leaves the buffer untouched.

use std::mem;
use std::ops::{Deref, DerefMut};

use flatseq_core::budget::BudgetGuard;

use crate::error::{Error, Result};
use crate::guard::{AllocGuard, Allocator};

/// Capacity growth policy applied when a push finds the buffer full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Growth {
    /// `cap * 2` (grouping tables and group buffers).
    #[default]
    Double,
    /// `cap + cap / 2` (join inner buffers).
    OneAndHalf,
}

impl Growth {
    pub fn next_capacity(self, cap: usize) -> usize {
        match self {
            Growth::Double => cap.saturating_mul(2).max(1),
            Growth::OneAndHalf => cap.saturating_add((cap / 2).max(1)),
        }
    }
}

/// Owned element buffer that returns its accounted bytes on drop via the guard.
pub struct ArenaBuf<T> {
    guard: AllocGuard,
    buf: Vec<T>,
    cap: usize,
    growth: Growth,
}

fn bytes_for<T>(elements: usize, tag: &'static str) -> Result<usize> {
    let elem_size = mem::size_of::<T>();
    elements
        .checked_mul(elem_size)
        .ok_or(Error::CapacityOverflow {
            tag,
            elements,
            elem_size,
        })
}

impl<T> ArenaBuf<T> {
    /// Create an empty buffer able to hold `cap` elements, accounting against `alloc`.
    pub fn with_capacity(alloc: &Allocator, cap: usize, tag: &'static str) -> Result<Self> {
        let bytes = bytes_for::<T>(cap, tag)?;
        let guard = alloc.acquire(bytes, tag)?;

        // Budget acquired; the system allocator can still say no.
        let mut buf = Vec::new();
        buf.try_reserve_exact(cap)
            .map_err(|_| Error::AllocFailed { tag, bytes })?;

        Ok(Self {
            guard,
            buf,
            cap,
            growth: Growth::default(),
        })
    }

    /// Set the policy used when `push` finds the buffer full.
    pub fn with_growth(mut self, growth: Growth) -> Self {
        self.growth = growth;
        self
    }

    pub fn growth(&self) -> Growth {
        self.growth
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Accounted capacity in elements.
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Current accounted size (bytes).
    pub fn accounted_bytes(&self) -> usize {
        self.guard.bytes()
    }

    pub fn tag(&self) -> &'static str {
        self.guard.tag()
    }

    /// Grow the accounted capacity to at least `new_cap` elements.
    pub fn try_reserve_to(&mut self, new_cap: usize) -> Result<()> {
        if new_cap <= self.cap {
            return Ok(());
        }

        let tag = self.guard.tag();
        let old_bytes = self.guard.bytes();
        let new_bytes = bytes_for::<T>(new_cap, tag)?;

        if !self.guard.try_resize(new_bytes) {
            #[cfg(feature = "tracing")]
            tracing::debug!(tag, from = self.cap, to = new_cap, "buffer growth refused");
            return Err(Error::BudgetExceeded {
                tag,
                requested: new_bytes - old_bytes,
                capacity: self.guard.arena_capacity(),
                used: self.guard.arena_used(),
            });
        }

        if self
            .buf
            .try_reserve_exact(new_cap - self.buf.len())
            .is_err()
        {
            // Shrinking back never fails.
            self.guard.try_resize(old_bytes);
            return Err(Error::AllocFailed {
                tag,
                bytes: new_bytes,
            });
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(tag, from = self.cap, to = new_cap, bytes = new_bytes, "buffer grown");

        self.cap = new_cap;
        Ok(())
    }

    /// Append, growing by the buffer's [`Growth`] policy when full.
    pub fn push(&mut self, value: T) -> Result<()> {
        if self.buf.len() == self.cap {
            let next = self.growth.next_capacity(self.cap);
            self.try_reserve_to(next)?;
        }
        self.buf.push(value);
        Ok(())
    }

    /// Append only if there is accounted room left; hands the value back otherwise.
    pub fn push_within_capacity(&mut self, value: T) -> std::result::Result<(), T> {
        if self.buf.len() < self.cap {
            self.buf.push(value);
            Ok(())
        } else {
            Err(value)
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        self.buf.pop()
    }

    /// Remove `index` by moving the last element into its slot.
    pub fn swap_remove(&mut self, index: usize) -> T {
        self.buf.swap_remove(index)
    }

    /// Keep the accounted capacity, drop the elements.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn truncate(&mut self, len: usize) {
        self.buf.truncate(len);
    }

    pub fn retain(&mut self, f: impl FnMut(&T) -> bool) {
        self.buf.retain(f);
    }

    /// Collapse adjacent runs that `same` considers equal, keeping the first of each run.
    pub fn dedup_by(&mut self, mut same: impl FnMut(&T, &T) -> bool) {
        self.buf.dedup_by(|later, earlier| same(earlier, later));
    }

    /// Move the elements out of the arena. The accounted bytes are released.
    pub fn into_vec(self) -> Vec<T> {
        self.buf
    }

    /// Remove and return every element, front to back.
    pub fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.buf.drain(..)
    }
}

impl<T> Deref for ArenaBuf<T> {
    type Target = [T];
    fn deref(&self) -> &Self::Target {
        &self.buf
    }
}

impl<T> DerefMut for ArenaBuf<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buf
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ArenaBuf<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaBuf")
            .field("tag", &self.guard.tag())
            .field("cap", &self.cap)
            .field("items", &self.buf)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accounts_capacity_not_length() {
        let alloc = Allocator::new(1024);
        let buf: ArenaBuf<u64> = ArenaBuf::with_capacity(&alloc, 8, "test").unwrap();
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.accounted_bytes(), 64);
        assert_eq!(alloc.used_bytes(), 64);
        drop(buf);
        assert_eq!(alloc.used_bytes(), 0);
    }

    #[test]
    fn test_push_doubles() {
        let alloc = Allocator::unbounded();
        let mut buf = ArenaBuf::with_capacity(&alloc, 2, "test").unwrap();
        for i in 0..5u32 {
            buf.push(i).unwrap();
        }
        assert_eq!(buf.capacity(), 8);
        assert_eq!(&buf[..], &[0, 1, 2, 3, 4]);
        assert_eq!(alloc.used_bytes(), 8 * 4);
    }

    #[test]
    fn test_push_one_and_half() {
        let alloc = Allocator::unbounded();
        let mut buf = ArenaBuf::with_capacity(&alloc, 4, "test")
            .unwrap()
            .with_growth(Growth::OneAndHalf);
        for i in 0..5u8 {
            buf.push(i).unwrap();
        }
        assert_eq!(buf.capacity(), 6);
    }

    #[test]
    fn test_refused_growth_leaves_buffer_intact() {
        let alloc = Allocator::new(16);
        let mut buf = ArenaBuf::with_capacity(&alloc, 4, "test").unwrap();
        for i in 0..4u32 {
            buf.push(i).unwrap();
        }
        let err = buf.push(4).unwrap_err();
        assert!(matches!(err, Error::BudgetExceeded { tag: "test", .. }));
        assert_eq!(&buf[..], &[0, 1, 2, 3]);
        assert_eq!(alloc.used_bytes(), 16);
    }

    #[test]
    fn test_initial_request_over_cap() {
        let alloc = Allocator::new(7);
        let err = ArenaBuf::<u64>::with_capacity(&alloc, 1, "big").unwrap_err();
        assert_eq!(
            err,
            Error::BudgetExceeded {
                tag: "big",
                requested: 8,
                capacity: 7,
                used: 0
            }
        );
    }

    #[test]
    fn test_capacity_overflow() {
        let alloc = Allocator::unbounded();
        let err = ArenaBuf::<u64>::with_capacity(&alloc, usize::MAX, "huge").unwrap_err();
        assert!(matches!(err, Error::CapacityOverflow { .. }));
        assert_eq!(alloc.used_bytes(), 0);
    }

    #[test]
    fn test_dedup_keeps_first_of_run() {
        let alloc = Allocator::unbounded();
        let mut buf = ArenaBuf::with_capacity(&alloc, 6, "test").unwrap();
        for v in [(1, 'a'), (1, 'b'), (2, 'c'), (2, 'd'), (3, 'e')] {
            buf.push(v).unwrap();
        }
        buf.dedup_by(|a, b| a.0 == b.0);
        assert_eq!(&buf[..], &[(1, 'a'), (2, 'c'), (3, 'e')]);
    }
}
