//! `Intersect` and `Except` over sorted-distinct snapshots.
//!
//! Both sides are reduced to sorted-distinct buffers, then compared with
//! binary search. If either side turns out empty the result is empty: an
//! empty left side means the right is never enumerated, and an empty right
//! side drops the left snapshot without probing it. Intermediate buffers are dropped before the first element is
//! handed out; only the result buffer survives.

use flatseq_mem::{Allocator, ArenaBuf};

use super::sorted_distinct;
use crate::compare::Comparer;
use crate::materialize::BufCursor;
use crate::metrics;
use crate::traits::{Cursor, SeqResult, Sequence};

fn contains<T, K: Comparer<T>>(sorted: &[T], item: &T, cmp: &K) -> bool {
    sorted
        .binary_search_by(|probe| cmp.compare(probe, item))
        .is_ok()
}

fn release<T>(buf: ArenaBuf<T>) {
    metrics::stage_released(buf.tag(), buf.accounted_bytes());
}

// ----- Intersect -----

#[derive(Debug, Clone)]
pub struct Intersect<A, B, C> {
    first: A,
    second: B,
    cmp: C,
    alloc: Allocator,
}

impl<A, B, C> Intersect<A, B, C> {
    pub fn new(first: A, second: B, cmp: C, alloc: &Allocator) -> Self {
        Self {
            first,
            second,
            cmp,
            alloc: alloc.clone(),
        }
    }
}

impl<A, B, C> Sequence for Intersect<A, B, C>
where
    A: Sequence,
    A::Item: Copy,
    B: Sequence<Item = A::Item>,
    C: Comparer<A::Item> + Clone,
{
    type Item = A::Item;
    type Cursor = IntersectCursor<A, B, C>;

    fn name(&self) -> &'static str {
        "intersect"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(IntersectCursor {
            first: self.first.clone(),
            second: self.second.clone(),
            cmp: self.cmp.clone(),
            alloc: self.alloc.clone(),
            out: None,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        match (self.first.fast_count(), self.second.fast_count()) {
            (Some(0), _) | (_, Some(0)) => Some(0),
            _ => None,
        }
    }
}

pub struct IntersectCursor<A: Sequence, B, C> {
    first: A,
    second: B,
    cmp: C,
    alloc: Allocator,
    out: Option<BufCursor<A::Item>>,
}

impl<A, B, C> IntersectCursor<A, B, C>
where
    A: Sequence,
    A::Item: Copy,
    B: Sequence<Item = A::Item>,
    C: Comparer<A::Item>,
{
    fn compute(&self) -> SeqResult<Option<ArenaBuf<A::Item>>> {
        let left = sorted_distinct(
            &mut self.first.cursor()?,
            &self.cmp,
            &self.alloc,
            self.first.fast_count(),
            "intersect",
        )?;
        if left.is_empty() {
            return Ok(None);
        }
        let right = sorted_distinct(
            &mut self.second.cursor()?,
            &self.cmp,
            &self.alloc,
            self.second.fast_count(),
            "intersect",
        )?;
        if right.is_empty() {
            return Ok(None);
        }

        // Probe with the shorter side; it becomes the result buffer.
        let (mut probe, other) = if left.len() <= right.len() {
            (left, right)
        } else {
            (right, left)
        };
        probe.retain(|item| contains(&other[..], item, &self.cmp));
        release(other);
        Ok(Some(probe))
    }
}

impl<A, B, C> Cursor for IntersectCursor<A, B, C>
where
    A: Sequence,
    A::Item: Copy,
    B: Sequence<Item = A::Item>,
    C: Comparer<A::Item>,
{
    type Item = A::Item;

    fn try_advance(&mut self) -> SeqResult<Option<A::Item>> {
        if self.out.is_none() {
            self.out = Some(BufCursor::empty());
            if let Some(buf) = self.compute()? {
                metrics::stage_materialized("intersect", buf.len(), buf.accounted_bytes());
                self.out = Some(BufCursor::new(buf));
            }
        }
        Ok(self.out.as_mut().and_then(BufCursor::next))
    }
}

// ----- Except -----

/// Elements of `first` absent from `second`, deduplicated. Empty whenever
/// either side is empty.
///
/// Matches are removed with swap-with-last compaction, so the output is not
/// sorted in general.
#[derive(Debug, Clone)]
pub struct Except<A, B, C> {
    first: A,
    second: B,
    cmp: C,
    alloc: Allocator,
}

impl<A, B, C> Except<A, B, C> {
    pub fn new(first: A, second: B, cmp: C, alloc: &Allocator) -> Self {
        Self {
            first,
            second,
            cmp,
            alloc: alloc.clone(),
        }
    }
}

impl<A, B, C> Sequence for Except<A, B, C>
where
    A: Sequence,
    A::Item: Copy,
    B: Sequence<Item = A::Item>,
    C: Comparer<A::Item> + Clone,
{
    type Item = A::Item;
    type Cursor = ExceptCursor<A, B, C>;

    fn name(&self) -> &'static str {
        "except"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(ExceptCursor {
            first: self.first.clone(),
            second: self.second.clone(),
            cmp: self.cmp.clone(),
            alloc: self.alloc.clone(),
            out: None,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        match (self.first.fast_count(), self.second.fast_count()) {
            (Some(0), _) | (_, Some(0)) => Some(0),
            _ => None,
        }
    }
}

pub struct ExceptCursor<A: Sequence, B, C> {
    first: A,
    second: B,
    cmp: C,
    alloc: Allocator,
    out: Option<BufCursor<A::Item>>,
}

impl<A, B, C> ExceptCursor<A, B, C>
where
    A: Sequence,
    A::Item: Copy,
    B: Sequence<Item = A::Item>,
    C: Comparer<A::Item>,
{
    fn compute(&self) -> SeqResult<Option<ArenaBuf<A::Item>>> {
        // A removal set known to be empty decides the result up front.
        if self.second.fast_count() == Some(0) {
            return Ok(None);
        }
        let mut candidates = sorted_distinct(
            &mut self.first.cursor()?,
            &self.cmp,
            &self.alloc,
            self.first.fast_count(),
            "except",
        )?;
        if candidates.is_empty() {
            return Ok(None);
        }
        let removals = sorted_distinct(
            &mut self.second.cursor()?,
            &self.cmp,
            &self.alloc,
            self.second.fast_count(),
            "except",
        )?;
        if removals.is_empty() {
            release(removals);
            release(candidates);
            return Ok(None);
        }

        let mut i = 0;
        while i < candidates.len() {
            if contains(&removals[..], &candidates[i], &self.cmp) {
                candidates.swap_remove(i);
            } else {
                i += 1;
            }
        }
        release(removals);
        Ok(Some(candidates))
    }
}

impl<A, B, C> Cursor for ExceptCursor<A, B, C>
where
    A: Sequence,
    A::Item: Copy,
    B: Sequence<Item = A::Item>,
    C: Comparer<A::Item>,
{
    type Item = A::Item;

    fn try_advance(&mut self) -> SeqResult<Option<A::Item>> {
        if self.out.is_none() {
            self.out = Some(BufCursor::empty());
            if let Some(buf) = self.compute()? {
                metrics::stage_materialized("except", buf.len(), buf.accounted_bytes());
                self.out = Some(BufCursor::new(buf));
            }
        }
        Ok(self.out.as_mut().and_then(BufCursor::next))
    }
}
