//! Deduplication and set engine.
//!
//! Everything here is sort-based: a source is drained, sorted by the supplied
//! comparer, and compacted so that each equal run keeps one entry. Output
//! order is therefore the sort order, not the input order.
//!
//! - `Distinct`: sort-then-compact (also exposed as `Union` over a `Concat`).
//! - `DedupAdjacent`: streaming compaction for input that is already sorted.
//! - `Intersect`/`Except`: two sorted-distinct buffers plus binary search.

mod algebra;

pub use algebra::{Except, ExceptCursor, Intersect, IntersectCursor};

use std::cmp::Ordering;

use flatseq_mem::{Allocator, ArenaBuf};

use crate::boundary::Concat;
use crate::compare::Comparer;
use crate::materialize::{drain_into, BufCursor};
use crate::metrics;
use crate::traits::{Cursor, SeqResult, Sequence};

/// Drain `cursor`, sort it, and collapse equal runs to their first entry.
pub(crate) fn sorted_distinct<C, K>(
    cursor: &mut C,
    cmp: &K,
    alloc: &Allocator,
    hint: Option<usize>,
    tag: &'static str,
) -> SeqResult<ArenaBuf<C::Item>>
where
    C: Cursor,
    K: Comparer<C::Item>,
{
    let mut buf = drain_into(cursor, alloc, hint, tag)?;
    buf.sort_unstable_by(|a, b| cmp.compare(a, b));
    buf.dedup_by(|a, b| cmp.compare(a, b) == Ordering::Equal);
    Ok(buf)
}

// ----- Distinct -----

#[derive(Debug, Clone)]
pub struct Distinct<S, C> {
    source: S,
    cmp: C,
    alloc: Allocator,
}

impl<S, C> Distinct<S, C> {
    pub fn new(source: S, cmp: C, alloc: &Allocator) -> Self {
        Self {
            source,
            cmp,
            alloc: alloc.clone(),
        }
    }
}

/// Sorted union of two sequences.
pub type Union<A, B, C> = Distinct<Concat<A, B>, C>;

impl<S, C> Sequence for Distinct<S, C>
where
    S: Sequence,
    S::Item: Copy,
    C: Comparer<S::Item> + Clone,
{
    type Item = S::Item;
    type Cursor = DistinctCursor<S::Cursor, C>;

    fn name(&self) -> &'static str {
        "distinct"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(DistinctCursor {
            inner: self.source.cursor()?,
            cmp: self.cmp.clone(),
            alloc: self.alloc.clone(),
            hint: self.source.fast_count(),
            out: None,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        match self.source.fast_count() {
            Some(0) => Some(0),
            _ => None,
        }
    }

    fn is_non_empty(&self) -> SeqResult<bool> {
        self.source.is_non_empty()
    }
}

pub struct DistinctCursor<C: Cursor, K> {
    inner: C,
    cmp: K,
    alloc: Allocator,
    hint: Option<usize>,
    out: Option<BufCursor<C::Item>>,
}

impl<C, K> Cursor for DistinctCursor<C, K>
where
    C: Cursor,
    C::Item: Copy,
    K: Comparer<C::Item>,
{
    type Item = C::Item;

    fn try_advance(&mut self) -> SeqResult<Option<C::Item>> {
        if self.out.is_none() {
            self.out = Some(BufCursor::empty());
            let buf = sorted_distinct(
                &mut self.inner,
                &self.cmp,
                &self.alloc,
                self.hint,
                "distinct",
            )?;
            metrics::stage_materialized("distinct", buf.len(), buf.accounted_bytes());
            self.out = Some(BufCursor::new(buf));
        }
        Ok(self.out.as_mut().and_then(BufCursor::next))
    }
}

// ----- DedupAdjacent -----

/// Collapses adjacent equal runs without buffering. On sorted input this is
/// `Distinct` without the sort.
#[derive(Debug, Clone)]
pub struct DedupAdjacent<S, C> {
    source: S,
    cmp: C,
}

impl<S, C> DedupAdjacent<S, C> {
    pub fn new(source: S, cmp: C) -> Self {
        Self { source, cmp }
    }
}

impl<S, C> Sequence for DedupAdjacent<S, C>
where
    S: Sequence,
    S::Item: Clone,
    C: Comparer<S::Item> + Clone,
{
    type Item = S::Item;
    type Cursor = DedupAdjacentCursor<S::Cursor, C>;

    fn name(&self) -> &'static str {
        "dedup_adjacent"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(DedupAdjacentCursor {
            inner: self.source.cursor()?,
            cmp: self.cmp.clone(),
            last: None,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        match self.source.fast_count() {
            Some(n) if n <= 1 => Some(n),
            _ => None,
        }
    }

    fn is_non_empty(&self) -> SeqResult<bool> {
        self.source.is_non_empty()
    }
}

pub struct DedupAdjacentCursor<C: Cursor, K> {
    inner: C,
    cmp: K,
    last: Option<C::Item>,
}

impl<C, K> Cursor for DedupAdjacentCursor<C, K>
where
    C: Cursor,
    C::Item: Clone,
    K: Comparer<C::Item>,
{
    type Item = C::Item;

    fn try_advance(&mut self) -> SeqResult<Option<C::Item>> {
        while let Some(item) = self.inner.try_advance()? {
            let repeat = self
                .last
                .as_ref()
                .is_some_and(|last| self.cmp.compare(last, &item) == Ordering::Equal);
            if !repeat {
                self.last = Some(item.clone());
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    fn reset(&mut self) -> SeqResult<()> {
        self.inner.reset()?;
        self.last = None;
        Ok(())
    }
}
