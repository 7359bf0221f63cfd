//! Builder surface: every stage and terminal as a method on any `Sequence`.
//!
//! ```
//! use flatseq_operators::{from_slice, Allocator, SequenceExt};
//!
//! let alloc = Allocator::unbounded();
//! let data = [5, 3, 8, 1, 9, 2];
//! let out = from_slice(&data)
//!     .filter(|x| *x > 2)
//!     .order_by_key(|x| *x, &alloc)
//!     .take(2)
//!     .to_vec()
//!     .unwrap();
//! assert_eq!(out, vec![3, 5]);
//! assert_eq!(alloc.used_bytes(), 0);
//! ```
//!
//! Closure-taking builders spell out the `Fn` signature so arguments infer;
//! the stage types themselves accept any
//! [`Predicate`](crate::filter::Predicate) or [`Comparer`].

use std::convert::identity;

use flatseq_mem::{Allocator, ArenaBuf};

use crate::boundary::{Append, Concat, DefaultIfEmpty, Prepend};
use crate::compare::{Comparer, DefaultEq, EqualityComparer, KeyComparer, Natural};
use crate::cursor::{CursorIter, Stepper};
use crate::element;
use crate::filter::{Negate, SkipWhile, TakeWhile, Where, WhereIndex};
use crate::group::GroupBy;
use crate::join::{GroupJoin, GroupJoinMatches, Join};
use crate::map::{Select, SelectIndex, SelectMany, Zip};
use crate::materialize;
use crate::set::{DedupAdjacent, Distinct, Except, Intersect, Union};
use crate::sort::OrderBy;
use crate::traits::{SeqResult, Sequence};
use crate::window::{Buffer, Reverse, Skip, SkipLast, Take, TakeLast};

/// Identity element selector used by [`SequenceExt::group_by`].
pub type Identity<T> = fn(T) -> T;

pub trait SequenceExt: Sequence {
    // ----- filter / map -----

    fn filter<F>(self, pred: F) -> Where<Self, F>
    where
        F: Fn(&Self::Item) -> bool + Clone,
    {
        Where::new(self, pred)
    }

    fn filter_not<F>(self, pred: F) -> Where<Self, Negate<F>>
    where
        F: Fn(&Self::Item) -> bool + Clone,
    {
        Where::new(self, Negate(pred))
    }

    fn filter_index<F>(self, pred: F) -> WhereIndex<Self, F>
    where
        F: Fn(&Self::Item, usize) -> bool + Clone,
    {
        WhereIndex::new(self, pred)
    }

    fn select<F, U>(self, project: F) -> Select<Self, F>
    where
        F: Fn(Self::Item) -> U + Clone,
    {
        Select::new(self, project)
    }

    fn select_index<F, U>(self, project: F) -> SelectIndex<Self, F>
    where
        F: Fn(Self::Item, usize) -> U + Clone,
    {
        SelectIndex::new(self, project)
    }

    fn select_many<F, I>(self, project: F) -> SelectMany<Self, F>
    where
        F: Fn(Self::Item) -> I + Clone,
        I: Sequence,
    {
        SelectMany::new(self, project)
    }

    fn take_while<F>(self, pred: F) -> TakeWhile<Self, F>
    where
        F: Fn(&Self::Item) -> bool + Clone,
    {
        TakeWhile::new(self, pred)
    }

    fn skip_while<F>(self, pred: F) -> SkipWhile<Self, F>
    where
        F: Fn(&Self::Item) -> bool + Clone,
    {
        SkipWhile::new(self, pred)
    }

    fn zip<B, F, U>(self, other: B, combine: F) -> Zip<Self, B, F>
    where
        B: Sequence,
        F: Fn(Self::Item, B::Item) -> U + Clone,
    {
        Zip::new(self, other, combine)
    }

    // ----- windowing -----

    fn skip(self, count: isize) -> Skip<Self> {
        Skip::new(self, count)
    }

    fn take(self, count: isize) -> Take<Self> {
        Take::new(self, count)
    }

    fn skip_last(self, count: isize, alloc: &Allocator) -> SkipLast<Self> {
        SkipLast::new(self, count, alloc)
    }

    fn take_last(self, count: isize, alloc: &Allocator) -> TakeLast<Self> {
        TakeLast::new(self, count, alloc)
    }

    fn buffer(self, size: usize, alloc: &Allocator) -> Buffer<Self> {
        Buffer::new(self, size, alloc)
    }

    fn reverse(self, alloc: &Allocator) -> Reverse<Self> {
        Reverse::new(self, alloc)
    }

    // ----- boundary -----

    fn append(self, value: Self::Item) -> Append<Self, Self::Item> {
        Append::new(self, value)
    }

    fn prepend(self, value: Self::Item) -> Prepend<Self, Self::Item> {
        Prepend::new(self, value)
    }

    fn default_if_empty(self, default: Self::Item) -> DefaultIfEmpty<Self, Self::Item> {
        DefaultIfEmpty::new(self, default)
    }

    fn concat<B>(self, other: B) -> Concat<Self, B>
    where
        B: Sequence<Item = Self::Item>,
    {
        Concat::new(self, other)
    }

    // ----- ordering -----

    fn order_by<F, K, C>(
        self,
        key: F,
        cmp: C,
        alloc: &Allocator,
    ) -> OrderBy<Self, KeyComparer<F, C, K>>
    where
        F: Fn(&Self::Item) -> K + Clone,
        C: Comparer<K> + Clone,
    {
        OrderBy::new(self, KeyComparer::new(key, cmp, false), alloc)
    }

    fn order_by_descending<F, K, C>(
        self,
        key: F,
        cmp: C,
        alloc: &Allocator,
    ) -> OrderBy<Self, KeyComparer<F, C, K>>
    where
        F: Fn(&Self::Item) -> K + Clone,
        C: Comparer<K> + Clone,
    {
        OrderBy::new(self, KeyComparer::new(key, cmp, true), alloc)
    }

    fn order_by_key<F, K>(
        self,
        key: F,
        alloc: &Allocator,
    ) -> OrderBy<Self, KeyComparer<F, Natural, K>>
    where
        F: Fn(&Self::Item) -> K + Clone,
        K: Ord,
    {
        self.order_by(key, Natural, alloc)
    }

    fn order_by_key_descending<F, K>(
        self,
        key: F,
        alloc: &Allocator,
    ) -> OrderBy<Self, KeyComparer<F, Natural, K>>
    where
        F: Fn(&Self::Item) -> K + Clone,
        K: Ord,
    {
        self.order_by_descending(key, Natural, alloc)
    }

    /// Order by a whole-element comparer.
    fn order_by_cmp<C>(self, cmp: C, alloc: &Allocator) -> OrderBy<Self, C>
    where
        C: Comparer<Self::Item> + Clone,
    {
        OrderBy::new(self, cmp, alloc)
    }

    // ----- dedup / set -----

    fn distinct(self, alloc: &Allocator) -> Distinct<Self, Natural>
    where
        Self::Item: Ord,
    {
        Distinct::new(self, Natural, alloc)
    }

    fn distinct_by<C>(self, cmp: C, alloc: &Allocator) -> Distinct<Self, C>
    where
        C: Comparer<Self::Item> + Clone,
    {
        Distinct::new(self, cmp, alloc)
    }

    /// Compact adjacent equal runs of an already sorted source.
    fn dedup_adjacent<C>(self, cmp: C) -> DedupAdjacent<Self, C>
    where
        C: Comparer<Self::Item> + Clone,
    {
        DedupAdjacent::new(self, cmp)
    }

    fn union<B, C>(self, other: B, cmp: C, alloc: &Allocator) -> Union<Self, B, C>
    where
        B: Sequence<Item = Self::Item>,
        C: Comparer<Self::Item> + Clone,
    {
        Distinct::new(Concat::new(self, other), cmp, alloc)
    }

    fn intersect<B, C>(self, other: B, cmp: C, alloc: &Allocator) -> Intersect<Self, B, C>
    where
        B: Sequence<Item = Self::Item>,
        C: Comparer<Self::Item> + Clone,
    {
        Intersect::new(self, other, cmp, alloc)
    }

    fn except<B, C>(self, other: B, cmp: C, alloc: &Allocator) -> Except<Self, B, C>
    where
        B: Sequence<Item = Self::Item>,
        C: Comparer<Self::Item> + Clone,
    {
        Except::new(self, other, cmp, alloc)
    }

    // ----- grouping / joins -----

    fn group_by<F, K>(
        self,
        key: F,
        alloc: &Allocator,
    ) -> GroupBy<Self, F, Identity<Self::Item>, DefaultEq, K, Self::Item>
    where
        F: Fn(&Self::Item) -> K + Clone,
        K: PartialEq,
    {
        GroupBy::new(self, key, identity as Identity<Self::Item>, DefaultEq, alloc)
    }

    fn group_by_with<F, K, EF, E, Q>(
        self,
        key: F,
        element: EF,
        eq: Q,
        alloc: &Allocator,
    ) -> GroupBy<Self, F, EF, Q, K, E>
    where
        F: Fn(&Self::Item) -> K + Clone,
        EF: Fn(Self::Item) -> E + Clone,
        Q: EqualityComparer<K> + Clone,
    {
        GroupBy::new(self, key, element, eq, alloc)
    }

    fn join<I, OKF, IKF, R, K, U>(
        self,
        inner: I,
        outer_key: OKF,
        inner_key: IKF,
        result: R,
        alloc: &Allocator,
    ) -> Join<Self, I, OKF, IKF, R, DefaultEq, K>
    where
        I: Sequence,
        OKF: Fn(&Self::Item) -> K + Clone,
        IKF: Fn(&I::Item) -> K + Clone,
        R: Fn(Self::Item, I::Item) -> U + Clone,
        K: PartialEq,
    {
        Join::new(self, inner, outer_key, inner_key, result, DefaultEq, alloc)
    }

    #[allow(clippy::too_many_arguments)]
    fn join_by<I, OKF, IKF, R, Q, K, U>(
        self,
        inner: I,
        outer_key: OKF,
        inner_key: IKF,
        result: R,
        eq: Q,
        alloc: &Allocator,
    ) -> Join<Self, I, OKF, IKF, R, Q, K>
    where
        I: Sequence,
        OKF: Fn(&Self::Item) -> K + Clone,
        IKF: Fn(&I::Item) -> K + Clone,
        R: Fn(Self::Item, I::Item) -> U + Clone,
        Q: EqualityComparer<K> + Clone,
    {
        Join::new(self, inner, outer_key, inner_key, result, eq, alloc)
    }

    fn group_join<I, OKF, IKF, R, K, U>(
        self,
        inner: I,
        outer_key: OKF,
        inner_key: IKF,
        result: R,
        alloc: &Allocator,
    ) -> GroupJoin<Self, I, OKF, IKF, R, DefaultEq, K>
    where
        I: Sequence,
        OKF: Fn(&Self::Item) -> K + Clone,
        IKF: Fn(&I::Item) -> K + Clone,
        R: Fn(Self::Item, GroupJoinMatches<I, K, DefaultEq>) -> U + Clone,
        K: PartialEq + Clone,
    {
        GroupJoin::new(self, inner, outer_key, inner_key, result, DefaultEq, alloc)
    }

    #[allow(clippy::too_many_arguments)]
    fn group_join_by<I, OKF, IKF, R, Q, K, U>(
        self,
        inner: I,
        outer_key: OKF,
        inner_key: IKF,
        result: R,
        eq: Q,
        alloc: &Allocator,
    ) -> GroupJoin<Self, I, OKF, IKF, R, Q, K>
    where
        I: Sequence,
        OKF: Fn(&Self::Item) -> K + Clone,
        IKF: Fn(&I::Item) -> K + Clone,
        R: Fn(Self::Item, GroupJoinMatches<I, K, Q>) -> U + Clone,
        Q: EqualityComparer<K> + Clone,
        K: Clone,
    {
        GroupJoin::new(self, inner, outer_key, inner_key, result, eq, alloc)
    }

    // ----- cursors -----

    fn iter(&self) -> SeqResult<CursorIter<Self::Cursor>> {
        Ok(CursorIter::new(self.cursor()?))
    }

    fn stepper(&self) -> SeqResult<Stepper<Self::Cursor>> {
        Ok(Stepper::new(self.cursor()?))
    }

    // ----- materialization -----

    fn to_arena_buf(&self, alloc: &Allocator) -> SeqResult<ArenaBuf<Self::Item>> {
        materialize::to_arena_buf(self, alloc)
    }

    fn to_vec(&self) -> SeqResult<Vec<Self::Item>> {
        materialize::to_vec(self)
    }

    // ----- terminals -----

    fn first(&self) -> SeqResult<Self::Item> {
        element::first(self)
    }

    fn first_or(&self, default: Self::Item) -> SeqResult<Self::Item> {
        element::first_or(self, default)
    }

    fn last(&self) -> SeqResult<Self::Item> {
        element::last(self)
    }

    fn last_or(&self, default: Self::Item) -> SeqResult<Self::Item> {
        element::last_or(self, default)
    }

    fn element_at(&self, index: usize) -> SeqResult<Self::Item> {
        element::element_at(self, index)
    }

    fn any(&self) -> SeqResult<bool> {
        element::any(self)
    }

    fn any_by<F>(&self, pred: F) -> SeqResult<bool>
    where
        F: Fn(&Self::Item) -> bool,
    {
        element::any_by(self, &pred)
    }

    fn all<F>(&self, pred: F) -> SeqResult<bool>
    where
        F: Fn(&Self::Item) -> bool,
    {
        element::all(self, &pred)
    }

    fn contains(&self, value: &Self::Item) -> SeqResult<bool>
    where
        Self::Item: PartialEq,
    {
        element::contains_by(self, value, &DefaultEq)
    }

    fn contains_by<Q>(&self, value: &Self::Item, eq: Q) -> SeqResult<bool>
    where
        Q: EqualityComparer<Self::Item>,
    {
        element::contains_by(self, value, &eq)
    }

    fn count(&self) -> SeqResult<usize> {
        element::count(self)
    }

    fn count_by<F>(&self, pred: F) -> SeqResult<usize>
    where
        F: Fn(&Self::Item) -> bool,
    {
        element::count_by(self, &pred)
    }

    fn aggregate<A, F>(&self, seed: A, f: F) -> SeqResult<A>
    where
        F: FnMut(A, Self::Item) -> A,
    {
        element::aggregate(self, seed, f)
    }

    fn reduce<F>(&self, f: F) -> SeqResult<Self::Item>
    where
        F: FnMut(Self::Item, Self::Item) -> Self::Item,
    {
        element::reduce(self, f)
    }

    fn min(&self) -> SeqResult<Self::Item>
    where
        Self::Item: Ord,
    {
        element::min_by(self, &Natural)
    }

    fn max(&self) -> SeqResult<Self::Item>
    where
        Self::Item: Ord,
    {
        element::max_by(self, &Natural)
    }

    fn min_by<C>(&self, cmp: C) -> SeqResult<Self::Item>
    where
        C: Comparer<Self::Item>,
    {
        element::min_by(self, &cmp)
    }

    fn max_by<C>(&self, cmp: C) -> SeqResult<Self::Item>
    where
        C: Comparer<Self::Item>,
    {
        element::max_by(self, &cmp)
    }

    fn sequence_equal<B>(&self, other: &B) -> SeqResult<bool>
    where
        B: Sequence<Item = Self::Item>,
        Self::Item: PartialEq,
    {
        element::sequence_equal(self, other, &DefaultEq)
    }

    fn sequence_equal_by<B, Q>(&self, other: &B, eq: Q) -> SeqResult<bool>
    where
        B: Sequence<Item = Self::Item>,
        Q: EqualityComparer<Self::Item>,
    {
        element::sequence_equal(self, other, &eq)
    }
}

impl<S: Sequence> SequenceExt for S {}
