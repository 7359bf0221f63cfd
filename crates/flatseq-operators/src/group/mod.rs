//! Grouping engine: `GroupBy` over a [`GroupingTable`].
//!
//! The cursor drains the whole source into a table on its first pull, then
//! yields one owned [`Grouping`] per distinct key in first-seen order. A
//! yielded group owns its element buffer; dropping it releases those bytes.

mod table;

pub use table::{Grouping, GroupingTable, IntoGroups};

use std::marker::PhantomData;

use flatseq_mem::Allocator;

use crate::compare::EqualityComparer;
use crate::metrics;
use crate::traits::{Cursor, SeqResult, Sequence};

/// `K`/`E` are the key and element types the selectors produce.
pub struct GroupBy<S, KF, EF, Q, K, E> {
    source: S,
    key: KF,
    element: EF,
    eq: Q,
    alloc: Allocator,
    _out: PhantomData<fn() -> (K, E)>,
}

impl<S, KF, EF, Q, K, E> GroupBy<S, KF, EF, Q, K, E> {
    pub fn new(source: S, key: KF, element: EF, eq: Q, alloc: &Allocator) -> Self {
        Self {
            source,
            key,
            element,
            eq,
            alloc: alloc.clone(),
            _out: PhantomData,
        }
    }
}

impl<S: Clone, KF: Clone, EF: Clone, Q: Clone, K, E> Clone for GroupBy<S, KF, EF, Q, K, E> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            key: self.key.clone(),
            element: self.element.clone(),
            eq: self.eq.clone(),
            alloc: self.alloc.clone(),
            _out: PhantomData,
        }
    }
}

fn build_table<C, K, E, KF, EF, Q>(
    cursor: &mut C,
    key: &KF,
    element: &EF,
    eq: &Q,
    alloc: &Allocator,
) -> SeqResult<GroupingTable<K, E>>
where
    C: Cursor,
    KF: Fn(&C::Item) -> K,
    EF: Fn(C::Item) -> E,
    Q: EqualityComparer<K>,
{
    let mut table = GroupingTable::new(alloc)?;
    while let Some(item) = cursor.try_advance()? {
        let k = key(&item);
        table.insert(k, element(item), eq)?;
    }
    metrics::stage_materialized("group_by", table.len(), table.accounted_bytes());
    Ok(table)
}

impl<S, KF, EF, Q, K, E> GroupBy<S, KF, EF, Q, K, E>
where
    S: Sequence,
    KF: Fn(&S::Item) -> K,
    EF: Fn(S::Item) -> E,
    Q: EqualityComparer<K>,
{
    /// Run the grouping pass and keep the whole table, for callers that want
    /// to pick the disposal depth themselves.
    pub fn into_table(&self) -> SeqResult<GroupingTable<K, E>> {
        build_table(
            &mut self.source.cursor()?,
            &self.key,
            &self.element,
            &self.eq,
            &self.alloc,
        )
    }
}

impl<S, KF, EF, Q, K, E> Sequence for GroupBy<S, KF, EF, Q, K, E>
where
    S: Sequence,
    KF: Fn(&S::Item) -> K + Clone,
    EF: Fn(S::Item) -> E + Clone,
    Q: EqualityComparer<K> + Clone,
{
    type Item = Grouping<K, E>;
    type Cursor = GroupByCursor<S::Cursor, KF, EF, Q, K, E>;

    fn name(&self) -> &'static str {
        "group_by"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(GroupByCursor {
            inner: self.source.cursor()?,
            key: self.key.clone(),
            element: self.element.clone(),
            eq: self.eq.clone(),
            alloc: self.alloc.clone(),
            groups: None,
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

pub struct GroupByCursor<C, KF, EF, Q, K, E> {
    inner: C,
    key: KF,
    element: EF,
    eq: Q,
    alloc: Allocator,
    groups: Option<IntoGroups<K, E>>,
}

impl<C, KF, EF, Q, K, E> Cursor for GroupByCursor<C, KF, EF, Q, K, E>
where
    C: Cursor,
    KF: Fn(&C::Item) -> K,
    EF: Fn(C::Item) -> E,
    Q: EqualityComparer<K>,
{
    type Item = Grouping<K, E>;

    fn try_advance(&mut self) -> SeqResult<Option<Grouping<K, E>>> {
        if self.groups.is_none() {
            self.groups = Some(IntoGroups::empty());
            let table = build_table(
                &mut self.inner,
                &self.key,
                &self.element,
                &self.eq,
                &self.alloc,
            )?;
            self.groups = Some(table.into_groups());
        }
        Ok(self.groups.as_mut().and_then(Iterator::next))
    }
}
