//! Tail windows. Neither knows where "last" is without buffering, so both
//! hold a `RingBuf` allocated on the first pull. The ring is bounded by the
//! window size but only grows with the elements actually seen, so a window
//! far larger than the input costs no more than the input.

use flatseq_mem::{Allocator, RingBuf};

use crate::materialize::DEFAULT_CAPACITY;
use crate::metrics;
use crate::traits::{clamp_count, Cursor, SeqResult, Sequence};

// ----- SkipLast -----

/// Drops the last `n` elements with an `n`-deep lag: an `(n + 1)`-slot ring
/// fills up and its oldest slot is emitted each time it is full.
#[derive(Debug, Clone)]
pub struct SkipLast<S> {
    source: S,
    count: usize,
    alloc: Allocator,
}

impl<S> SkipLast<S> {
    pub fn new(source: S, count: isize, alloc: &Allocator) -> Self {
        Self {
            source,
            count: clamp_count(count),
            alloc: alloc.clone(),
        }
    }
}

impl<S> Sequence for SkipLast<S>
where
    S: Sequence,
    S::Item: Copy,
{
    type Item = S::Item;
    type Cursor = SkipLastCursor<S::Cursor>;

    fn name(&self) -> &'static str {
        "skip_last"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        // A known count no larger than `n` leaves nothing to emit.
        let known = self.source.fast_count();
        let done = matches!(known, Some(n) if n <= self.count);
        let limit = self.count.saturating_add(1);
        Ok(SkipLastCursor {
            inner: self.source.cursor()?,
            count: self.count,
            initial: known.unwrap_or(DEFAULT_CAPACITY).min(limit),
            alloc: self.alloc.clone(),
            ring: None,
            done,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        self.source
            .fast_count()
            .map(|n| n.saturating_sub(self.count))
    }
}

pub struct SkipLastCursor<C: Cursor> {
    inner: C,
    count: usize,
    initial: usize,
    alloc: Allocator,
    ring: Option<RingBuf<C::Item>>,
    done: bool,
}

impl<C> Cursor for SkipLastCursor<C>
where
    C: Cursor,
    C::Item: Copy,
{
    type Item = C::Item;

    fn try_advance(&mut self) -> SeqResult<Option<C::Item>> {
        if self.done {
            return Ok(None);
        }
        if self.count == 0 {
            return self.inner.try_advance();
        }
        if self.ring.is_none() {
            let limit = self.count.saturating_add(1);
            let ring = RingBuf::bounded(&self.alloc, limit, self.initial, "skip_last")?;
            self.ring = Some(ring);
        }
        let Some(ring) = self.ring.as_mut() else {
            return Ok(None);
        };

        while let Some(item) = self.inner.try_advance()? {
            ring.push_overwrite(item)?;
            if ring.is_full() {
                return Ok(ring.pop_front());
            }
        }

        // The `n` held elements are the tail being skipped.
        if let Some(ring) = self.ring.take() {
            metrics::stage_released("skip_last", ring.accounted_bytes());
        }
        self.done = true;
        Ok(None)
    }
}

// ----- TakeLast -----

/// Keeps the last `n` elements: drains the whole upstream into a ring of at
/// most `n` elements (overwriting oldest first), then hands the ring out
/// front to back.
#[derive(Debug, Clone)]
pub struct TakeLast<S> {
    source: S,
    count: usize,
    alloc: Allocator,
}

impl<S> TakeLast<S> {
    pub fn new(source: S, count: isize, alloc: &Allocator) -> Self {
        Self {
            source,
            count: clamp_count(count),
            alloc: alloc.clone(),
        }
    }
}

impl<S> Sequence for TakeLast<S>
where
    S: Sequence,
    S::Item: Copy,
{
    type Item = S::Item;
    type Cursor = TakeLastCursor<S::Cursor>;

    fn name(&self) -> &'static str {
        "take_last"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        // Never reserve more slots than the upstream can fill.
        let (limit, initial) = match self.source.fast_count() {
            Some(n) => (n.min(self.count), n.min(self.count)),
            None => (self.count, DEFAULT_CAPACITY.min(self.count)),
        };
        Ok(TakeLastCursor {
            inner: self.source.cursor()?,
            limit,
            initial,
            alloc: self.alloc.clone(),
            ring: None,
            filled: false,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        if self.count == 0 {
            return Some(0);
        }
        self.source.fast_count().map(|n| n.min(self.count))
    }
}

pub struct TakeLastCursor<C: Cursor> {
    inner: C,
    limit: usize,
    initial: usize,
    alloc: Allocator,
    ring: Option<RingBuf<C::Item>>,
    filled: bool,
}

impl<C> Cursor for TakeLastCursor<C>
where
    C: Cursor,
    C::Item: Copy,
{
    type Item = C::Item;

    fn try_advance(&mut self) -> SeqResult<Option<C::Item>> {
        if !self.filled {
            self.filled = true;
            if self.limit == 0 {
                return Ok(None);
            }
            let mut ring = RingBuf::bounded(&self.alloc, self.limit, self.initial, "take_last")?;
            while let Some(item) = self.inner.try_advance()? {
                ring.push_overwrite(item)?;
            }
            metrics::stage_materialized("take_last", ring.len(), ring.accounted_bytes());
            self.ring = Some(ring);
        }

        let Some(ring) = self.ring.as_mut() else {
            return Ok(None);
        };
        if let Some(item) = ring.pop_front() {
            return Ok(Some(item));
        }
        if let Some(ring) = self.ring.take() {
            metrics::stage_released("take_last", ring.accounted_bytes());
        }
        Ok(None)
    }
}
