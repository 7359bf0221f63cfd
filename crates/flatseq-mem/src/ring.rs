//! Bounded circular buffer on top of [`ArenaBuf`].
//!
//! The ring holds at most `limit` elements. Physical slots start at a caller
//! chosen size and grow by the buffer's [`Growth`](crate::buf::Growth) policy
//! only while every slot is occupied and the limit is not reached, so a huge
//! limit over a short input only pays for what it holds. Once `limit`
//! elements are held, pushing overwrites the oldest slot and hands that
//! element back.

use crate::buf::ArenaBuf;
use crate::error::Result;
use crate::guard::Allocator;

pub struct RingBuf<T> {
    slots: ArenaBuf<T>,
    head: usize,
    len: usize,
    limit: usize,
}

impl<T: Copy> RingBuf<T> {
    /// A ring whose slots are all reserved up front.
    pub fn with_capacity(alloc: &Allocator, cap: usize, tag: &'static str) -> Result<Self> {
        Self::bounded(alloc, cap, cap, tag)
    }

    /// A ring of at most `limit` elements with `initial` slots reserved now.
    pub fn bounded(
        alloc: &Allocator,
        limit: usize,
        initial: usize,
        tag: &'static str,
    ) -> Result<Self> {
        Ok(Self {
            slots: ArenaBuf::with_capacity(alloc, initial.min(limit), tag)?,
            head: 0,
            len: 0,
            limit,
        })
    }

    /// Physical slots currently accounted.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.limit
    }

    /// Push at the back. When the ring already holds `limit` elements the
    /// oldest is evicted and returned; a zero-limit ring evicts `value`
    /// itself. Fails only when growing the slots is refused.
    pub fn push_overwrite(&mut self, value: T) -> Result<Option<T>> {
        if self.limit == 0 {
            return Ok(Some(value));
        }

        if self.len == self.limit {
            let oldest = self.slots[self.head];
            self.slots[self.head] = value;
            self.head = (self.head + 1) % self.capacity();
            return Ok(Some(oldest));
        }

        if self.len == self.capacity() {
            self.grow()?;
        }
        let idx = (self.head + self.len) % self.capacity();
        if idx < self.slots.len() {
            self.slots[idx] = value;
        } else {
            // Slots are first written in ring order, so this never grows.
            self.slots.push(value)?;
        }
        self.len += 1;
        Ok(None)
    }

    /// Rotate the occupied slots to start at zero, then reserve more.
    fn grow(&mut self) -> Result<()> {
        self.slots.rotate_left(self.head);
        self.head = 0;
        let next = self
            .slots
            .growth()
            .next_capacity(self.capacity())
            .min(self.limit);
        self.slots.try_reserve_to(next)
    }

    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = self.slots[self.head];
        self.head = (self.head + 1) % self.capacity();
        self.len -= 1;
        Some(value)
    }

    /// `i`-th element counted from the oldest.
    pub fn get(&self, i: usize) -> Option<T> {
        if i >= self.len {
            return None;
        }
        Some(self.slots[(self.head + i) % self.capacity()])
    }

    pub fn accounted_bytes(&self) -> usize {
        self.slots.accounted_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_fill_then_overwrite_oldest_first() {
        let alloc = Allocator::unbounded();
        let mut ring = RingBuf::with_capacity(&alloc, 3, "ring").unwrap();
        assert_eq!(ring.push_overwrite(1).unwrap(), None);
        assert_eq!(ring.push_overwrite(2).unwrap(), None);
        assert_eq!(ring.push_overwrite(3).unwrap(), None);
        assert!(ring.is_full());
        assert_eq!(ring.push_overwrite(4).unwrap(), Some(1));
        assert_eq!(ring.push_overwrite(5).unwrap(), Some(2));

        let seen: Vec<_> = (0..ring.len()).filter_map(|i| ring.get(i)).collect();
        assert_eq!(seen, vec![3, 4, 5]);
    }

    #[test]
    fn test_pop_then_push_reuses_slots() {
        let alloc = Allocator::unbounded();
        let mut ring = RingBuf::with_capacity(&alloc, 3, "ring").unwrap();
        ring.push_overwrite(1).unwrap();
        ring.push_overwrite(2).unwrap();
        assert_eq!(ring.pop_front(), Some(1));
        ring.push_overwrite(3).unwrap();
        ring.push_overwrite(4).unwrap();
        assert_eq!(ring.push_overwrite(5).unwrap(), Some(2));
        assert_eq!(ring.pop_front(), Some(3));
        assert_eq!(ring.pop_front(), Some(4));
        assert_eq!(ring.pop_front(), Some(5));
        assert_eq!(ring.pop_front(), None);
    }

    #[test]
    fn test_zero_capacity_evicts_immediately() {
        let alloc = Allocator::unbounded();
        let mut ring = RingBuf::with_capacity(&alloc, 0, "ring").unwrap();
        assert_eq!(ring.push_overwrite(7).unwrap(), Some(7));
        assert!(ring.is_empty());
    }

    #[test]
    fn test_bytes_released_on_drop() {
        let alloc = Allocator::new(64);
        let ring = RingBuf::<u32>::with_capacity(&alloc, 4, "ring").unwrap();
        assert_eq!(alloc.used_bytes(), 16);
        drop(ring);
        assert_eq!(alloc.used_bytes(), 0);
    }

    #[test]
    fn test_bounded_grows_only_with_contents() {
        let alloc = Allocator::new(64);
        let mut ring = RingBuf::<u32>::bounded(&alloc, usize::MAX, 2, "ring").unwrap();
        assert_eq!(alloc.used_bytes(), 8);
        for v in 0..5 {
            assert_eq!(ring.push_overwrite(v).unwrap(), None);
        }
        assert_eq!(ring.capacity(), 8);
        assert_eq!(alloc.used_bytes(), 32);
        let seen: Vec<_> = (0..ring.len()).filter_map(|i| ring.get(i)).collect();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_growth_after_wrap_keeps_order() {
        let alloc = Allocator::unbounded();
        let mut ring = RingBuf::<u32>::bounded(&alloc, 10, 3, "ring").unwrap();
        ring.push_overwrite(1).unwrap();
        ring.push_overwrite(2).unwrap();
        ring.push_overwrite(3).unwrap();
        assert_eq!(ring.pop_front(), Some(1));
        // Wraps into slot 0, then the next push has to grow.
        ring.push_overwrite(4).unwrap();
        ring.push_overwrite(5).unwrap();
        assert_eq!(ring.capacity(), 6);
        let seen: Vec<_> = (0..ring.len()).filter_map(|i| ring.get(i)).collect();
        assert_eq!(seen, vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_bounded_stops_growing_at_limit() {
        let alloc = Allocator::unbounded();
        let mut ring = RingBuf::<u32>::bounded(&alloc, 3, 1, "ring").unwrap();
        for v in 1..=3 {
            assert_eq!(ring.push_overwrite(v).unwrap(), None);
        }
        assert_eq!(ring.capacity(), 3);
        assert_eq!(ring.push_overwrite(4).unwrap(), Some(1));
        assert_eq!(ring.capacity(), 3);
    }

    #[test]
    fn test_refused_growth_surfaces_budget_error() {
        let alloc = Allocator::new(8);
        let mut ring = RingBuf::<u32>::bounded(&alloc, 100, 2, "ring").unwrap();
        ring.push_overwrite(1).unwrap();
        ring.push_overwrite(2).unwrap();
        match ring.push_overwrite(3) {
            Err(Error::BudgetExceeded { tag, .. }) => assert_eq!(tag, "ring"),
            other => panic!("expected budget refusal, got {other:?}"),
        }
        assert_eq!(ring.len(), 2);
    }
}
