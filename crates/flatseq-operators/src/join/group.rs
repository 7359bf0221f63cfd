//! `GroupJoin`: each outer row paired with its matching inner subsequence.

use std::marker::PhantomData;
use std::rc::Rc;

use flatseq_mem::{Allocator, ArenaBuf, Growth};

use crate::compare::EqualityComparer;
use crate::filter::{IndexPredicate, WhereIndex};
use crate::metrics;
use crate::traits::{Cursor, SeqResult, Sequence};

/// Index predicate selecting inner positions whose key equals one outer key.
pub struct KeyMatch<K, Q> {
    keys: Rc<ArenaBuf<K>>,
    key: K,
    eq: Q,
}

impl<K: Clone, Q: Clone> Clone for KeyMatch<K, Q> {
    fn clone(&self) -> Self {
        Self {
            keys: Rc::clone(&self.keys),
            key: self.key.clone(),
            eq: self.eq.clone(),
        }
    }
}

impl<K, Q> KeyMatch<K, Q> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

impl<T, K, Q> IndexPredicate<T> for KeyMatch<K, Q>
where
    Q: EqualityComparer<K>,
{
    fn test(&self, _item: &T, index: usize) -> bool {
        self.keys
            .get(index)
            .is_some_and(|inner| self.eq.equals(&self.key, inner))
    }
}

/// The inner rows matching one outer row. Enumerating it re-reads the inner
/// sequence; the shared key table stays alive as long as any view does.
pub type GroupJoinMatches<I, K, Q> = WhereIndex<I, KeyMatch<K, Q>>;

pub struct GroupJoin<O, I, OKF, IKF, R, Q, K> {
    outer: O,
    inner: I,
    outer_key: OKF,
    inner_key: IKF,
    result: R,
    eq: Q,
    alloc: Allocator,
    _key: PhantomData<fn() -> K>,
}

impl<O, I, OKF, IKF, R, Q, K> GroupJoin<O, I, OKF, IKF, R, Q, K> {
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

impl<O, I, OKF, IKF, R, Q, K> Clone for GroupJoin<O, I, OKF, IKF, R, Q, K>
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

impl<O, I, OKF, IKF, R, Q, K, U> Sequence for GroupJoin<O, I, OKF, IKF, R, Q, K>
where
    O: Sequence,
    I: Sequence,
    OKF: Fn(&O::Item) -> K + Clone,
    IKF: Fn(&I::Item) -> K + Clone,
    R: Fn(O::Item, GroupJoinMatches<I, K, Q>) -> U + Clone,
    Q: EqualityComparer<K> + Clone,
    K: Clone,
{
    type Item = U;
    type Cursor = GroupJoinCursor<O::Cursor, I, OKF, IKF, R, Q, K>;

    fn name(&self) -> &'static str {
        "group_join"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(GroupJoinCursor {
            outer: self.outer.cursor()?,
            inner: self.inner.clone(),
            outer_key: self.outer_key.clone(),
            inner_key: self.inner_key.clone(),
            result: self.result.clone(),
            eq: self.eq.clone(),
            alloc: self.alloc.clone(),
            keys: None,
            done: false,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        // One result per outer row, matched or not.
        self.outer.fast_count()
    }

    fn is_non_empty(&self) -> SeqResult<bool> {
        self.outer.is_non_empty()
    }
}

pub struct GroupJoinCursor<OC, I, OKF, IKF, R, Q, K> {
    outer: OC,
    inner: I,
    outer_key: OKF,
    inner_key: IKF,
    result: R,
    eq: Q,
    alloc: Allocator,
    keys: Option<Rc<ArenaBuf<K>>>,
    done: bool,
}

impl<OC, I, OKF, IKF, R, Q, K> GroupJoinCursor<OC, I, OKF, IKF, R, Q, K>
where
    I: Sequence,
    IKF: Fn(&I::Item) -> K,
{
    fn materialize_keys(&self) -> SeqResult<ArenaBuf<K>> {
        let cap = self
            .inner
            .fast_count()
            .unwrap_or(self.alloc.capacities().join_initial);
        let mut keys = ArenaBuf::with_capacity(&self.alloc, cap, "group_join_keys")?
            .with_growth(Growth::OneAndHalf);
        let mut cursor = self.inner.cursor()?;
        while let Some(value) = cursor.try_advance()? {
            keys.push((self.inner_key)(&value))?;
        }
        metrics::stage_materialized("group_join", keys.len(), keys.accounted_bytes());
        Ok(keys)
    }
}

impl<OC, I, OKF, IKF, R, Q, K, U> Cursor for GroupJoinCursor<OC, I, OKF, IKF, R, Q, K>
where
    OC: Cursor,
    I: Sequence,
    OKF: Fn(&OC::Item) -> K,
    IKF: Fn(&I::Item) -> K,
    R: Fn(OC::Item, GroupJoinMatches<I, K, Q>) -> U,
    Q: EqualityComparer<K> + Clone,
{
    type Item = U;

    fn try_advance(&mut self) -> SeqResult<Option<U>> {
        if self.done {
            return Ok(None);
        }
        let outer = match self.outer.try_advance() {
            Ok(Some(outer)) => outer,
            other => {
                // Exhausted or failed: drop our share of the key table.
                self.done = true;
                self.keys = None;
                return other.map(|_| None);
            }
        };

        if self.keys.is_none() {
            match self.materialize_keys() {
                Ok(keys) => self.keys = Some(Rc::new(keys)),
                Err(e) => {
                    self.done = true;
                    return Err(e);
                }
            }
        }
        let Some(keys) = self.keys.as_ref() else {
            return Ok(None);
        };

        let matcher = KeyMatch {
            keys: Rc::clone(keys),
            key: (self.outer_key)(&outer),
            eq: self.eq.clone(),
        };
        let matches = WhereIndex::new(self.inner.clone(), matcher);
        Ok(Some((self.result)(outer, matches)))
    }
}
