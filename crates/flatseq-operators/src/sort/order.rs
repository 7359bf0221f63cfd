//! `OrderBy` with `ThenBy` chains.
//!
//! The whole source is drained into an allocator-owned buffer and sorted in
//! place once. Each `then_by*` call wraps the comparer in a [`ThenBy`], so a
//! chain of any length still costs a single sort pass.
//!
//! The sort is unstable: elements whose keys all tie come out in an
//! unspecified relative order.

use flatseq_mem::Allocator;

use crate::compare::{Comparer, KeyComparer, Natural, ThenBy};
use crate::materialize::{drain_into, BufCursor};
use crate::metrics;
use crate::traits::{Cursor, SeqResult, Sequence};

#[derive(Debug, Clone)]
pub struct OrderBy<S, C> {
    source: S,
    cmp: C,
    alloc: Allocator,
}

impl<S, C> OrderBy<S, C> {
    pub fn new(source: S, cmp: C, alloc: &Allocator) -> Self {
        Self {
            source,
            cmp,
            alloc: alloc.clone(),
        }
    }
}

impl<S: Sequence, C> OrderBy<S, C> {
    /// Break remaining ties by an element comparer.
    pub fn then_by_cmp<C2>(self, cmp: C2) -> OrderBy<S, ThenBy<C, C2>>
    where
        C2: Comparer<S::Item>,
    {
        OrderBy {
            source: self.source,
            cmp: ThenBy::new(self.cmp, cmp),
            alloc: self.alloc,
        }
    }

    pub fn then_by<F, K, KC>(self, key: F, cmp: KC) -> OrderBy<S, ThenBy<C, KeyComparer<F, KC, K>>>
    where
        F: Fn(&S::Item) -> K,
        KC: Comparer<K>,
    {
        self.then_by_cmp(KeyComparer::new(key, cmp, false))
    }

    pub fn then_by_descending<F, K, KC>(
        self,
        key: F,
        cmp: KC,
    ) -> OrderBy<S, ThenBy<C, KeyComparer<F, KC, K>>>
    where
        F: Fn(&S::Item) -> K,
        KC: Comparer<K>,
    {
        self.then_by_cmp(KeyComparer::new(key, cmp, true))
    }

    pub fn then_by_key<F, K>(self, key: F) -> OrderBy<S, ThenBy<C, KeyComparer<F, Natural, K>>>
    where
        F: Fn(&S::Item) -> K,
        K: Ord,
    {
        self.then_by(key, Natural)
    }

    pub fn then_by_key_descending<F, K>(
        self,
        key: F,
    ) -> OrderBy<S, ThenBy<C, KeyComparer<F, Natural, K>>>
    where
        F: Fn(&S::Item) -> K,
        K: Ord,
    {
        self.then_by_descending(key, Natural)
    }
}

impl<S, C> Sequence for OrderBy<S, C>
where
    S: Sequence,
    S::Item: Copy,
    C: Comparer<S::Item> + Clone,
{
    type Item = S::Item;
    type Cursor = OrderByCursor<S::Cursor, C>;

    fn name(&self) -> &'static str {
        "order_by"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(OrderByCursor {
            inner: self.source.cursor()?,
            cmp: self.cmp.clone(),
            alloc: self.alloc.clone(),
            hint: self.source.fast_count(),
            out: None,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        self.source.fast_count()
    }

    fn is_non_empty(&self) -> SeqResult<bool> {
        self.source.is_non_empty()
    }
}

pub struct OrderByCursor<C: Cursor, K> {
    inner: C,
    cmp: K,
    alloc: Allocator,
    hint: Option<usize>,
    out: Option<BufCursor<C::Item>>,
}

impl<C, K> Cursor for OrderByCursor<C, K>
where
    C: Cursor,
    C::Item: Copy,
    K: Comparer<C::Item>,
{
    type Item = C::Item;

    fn try_advance(&mut self) -> SeqResult<Option<C::Item>> {
        if self.out.is_none() {
            self.out = Some(BufCursor::empty());
            let mut buf = drain_into(&mut self.inner, &self.alloc, self.hint, "order_by")?;
            let cmp = &self.cmp;
            buf.sort_unstable_by(|a, b| cmp.compare(a, b));
            metrics::stage_materialized("order_by", buf.len(), buf.accounted_bytes());
            self.out = Some(BufCursor::new(buf));
        }
        Ok(self.out.as_mut().and_then(BufCursor::next))
    }
}
