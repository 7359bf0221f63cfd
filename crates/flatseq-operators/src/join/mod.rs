//! Join engine.
//!
//! Keys are only equality-comparable, so neither join builds an index:
//! - `Join` materializes the inner rows with their keys once and scans them
//!   per outer row (nested loop). Each inner value sits next to its key as
//!   one `(value, key)` entry of a single buffer, not as a block of values
//!   followed by a block of keys.
//! - `GroupJoin` materializes only the inner keys and gives each outer row a
//!   `WhereIndex` view over the full inner sequence.

mod group;

pub use group::{GroupJoin, GroupJoinCursor, GroupJoinMatches, KeyMatch};

use std::marker::PhantomData;

use flatseq_mem::{Allocator, ArenaBuf, Growth};

use crate::compare::EqualityComparer;
use crate::metrics;
use crate::traits::{Cursor, SeqResult, Sequence};

/// Inner-join of `outer` and `inner` on key equality. Results come out in
/// outer order, and within one outer row in inner order.
pub struct Join<O, I, OKF, IKF, R, Q, K> {
    outer: O,
    inner: I,
    outer_key: OKF,
    inner_key: IKF,
    result: R,
    eq: Q,
    alloc: Allocator,
    _key: PhantomData<fn() -> K>,
}

impl<O, I, OKF, IKF, R, Q, K> Join<O, I, OKF, IKF, R, Q, K> {
    pub fn new(
        outer: O,
        inner: I,
        outer_key: OKF,
        inner_key: IKF,
        result: R,
        eq: Q,
        alloc: &Allocator,
    ) -> Self {
        Self {
            outer,
            inner,
            outer_key,
            inner_key,
            result,
            eq,
            alloc: alloc.clone(),
            _key: PhantomData,
        }
    }
}

impl<O, I, OKF, IKF, R, Q, K> Clone for Join<O, I, OKF, IKF, R, Q, K>
where
    O: Clone,
    I: Clone,
    OKF: Clone,
    IKF: Clone,
    R: Clone,
    Q: Clone,
{
    fn clone(&self) -> Self {
        Self {
            outer: self.outer.clone(),
            inner: self.inner.clone(),
            outer_key: self.outer_key.clone(),
            inner_key: self.inner_key.clone(),
            result: self.result.clone(),
            eq: self.eq.clone(),
            alloc: self.alloc.clone(),
            _key: PhantomData,
        }
    }
}

impl<O, I, OKF, IKF, R, Q, K, U> Sequence for Join<O, I, OKF, IKF, R, Q, K>
where
    O: Sequence,
    O::Item: Copy,
    I: Sequence,
    I::Item: Copy,
    OKF: Fn(&O::Item) -> K + Clone,
    IKF: Fn(&I::Item) -> K + Clone,
    R: Fn(O::Item, I::Item) -> U + Clone,
    Q: EqualityComparer<K> + Clone,
{
    type Item = U;
    type Cursor = JoinCursor<O::Cursor, I, OKF, IKF, R, Q, K>;

    fn name(&self) -> &'static str {
        "join"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(JoinCursor {
            outer: self.outer.cursor()?,
            inner: self.inner.clone(),
            outer_key: self.outer_key.clone(),
            inner_key: self.inner_key.clone(),
            result: self.result.clone(),
            eq: self.eq.clone(),
            alloc: self.alloc.clone(),
            rows: None,
            current: None,
            pos: 0,
            done: false,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        match (self.outer.fast_count(), self.inner.fast_count()) {
            (Some(0), _) | (_, Some(0)) => Some(0),
            _ => None,
        }
    }
}

pub struct JoinCursor<OC: Cursor, I: Sequence, OKF, IKF, R, Q, K> {
    outer: OC,
    inner: I,
    outer_key: OKF,
    inner_key: IKF,
    result: R,
    eq: Q,
    alloc: Allocator,
    // One `(value, key)` entry per inner row, in inner order.
    rows: Option<ArenaBuf<(I::Item, K)>>,
    current: Option<(OC::Item, K)>,
    pos: usize,
    done: bool,
}

impl<OC, I, OKF, IKF, R, Q, K> JoinCursor<OC, I, OKF, IKF, R, Q, K>
where
    OC: Cursor,
    I: Sequence,
    IKF: Fn(&I::Item) -> K,
{
    fn materialize_inner(&self) -> SeqResult<ArenaBuf<(I::Item, K)>> {
        let cap = self
            .inner
            .fast_count()
            .unwrap_or(self.alloc.capacities().join_initial);
        let mut rows = ArenaBuf::with_capacity(&self.alloc, cap, "join_inner")?
            .with_growth(Growth::OneAndHalf);
        let mut cursor = self.inner.cursor()?;
        while let Some(value) = cursor.try_advance()? {
            let key = (self.inner_key)(&value);
            rows.push((value, key))?;
        }
        metrics::stage_materialized("join", rows.len(), rows.accounted_bytes());
        Ok(rows)
    }
}

impl<OC, I, OKF, IKF, R, Q, K, U> Cursor for JoinCursor<OC, I, OKF, IKF, R, Q, K>
where
    OC: Cursor,
    OC::Item: Copy,
    I: Sequence,
    I::Item: Copy,
    OKF: Fn(&OC::Item) -> K,
    IKF: Fn(&I::Item) -> K,
    R: Fn(OC::Item, I::Item) -> U,
    Q: EqualityComparer<K>,
{
    type Item = U;

    fn try_advance(&mut self) -> SeqResult<Option<U>> {
        if self.done {
            return Ok(None);
        }
        loop {
            if let (Some((outer, key)), Some(rows)) = (self.current.as_ref(), self.rows.as_ref()) {
                while let Some((value, inner_key)) = rows.get(self.pos) {
                    self.pos += 1;
                    if self.eq.equals(key, inner_key) {
                        return Ok(Some((self.result)(*outer, *value)));
                    }
                }
            }
            self.current = None;

            let next = match self.outer.try_advance() {
                Ok(next) => next,
                Err(e) => {
                    self.finish();
                    return Err(e);
                }
            };
            let Some(outer) = next else {
                self.finish();
                return Ok(None);
            };
            // The inner side is only materialized once an outer row exists.
            if self.rows.is_none() {
                match self.materialize_inner() {
                    Ok(rows) => self.rows = Some(rows),
                    Err(e) => {
                        self.finish();
                        return Err(e);
                    }
                }
            }
            let key = (self.outer_key)(&outer);
            self.current = Some((outer, key));
            self.pos = 0;
        }
    }
}

impl<OC: Cursor, I: Sequence, OKF, IKF, R, Q, K> JoinCursor<OC, I, OKF, IKF, R, Q, K> {
    fn finish(&mut self) {
        self.done = true;
        self.current = None;
        if let Some(rows) = self.rows.take() {
            metrics::stage_released("join", rows.accounted_bytes());
        }
    }
}
