//! Terminal operations: element access, quantifiers, and aggregates.
//!
//! Each one opens a cursor, pulls what it needs, and drops the cursor before
//! returning, so any scratch memory upstream stages acquired is released on
//! every exit path. Stages that know their count or support random access are
//! answered without enumerating.

use std::cmp::Ordering;

use crate::compare::{Comparer, EqualityComparer};
use crate::filter::Predicate;
use crate::traits::{Cursor, SeqError, SeqResult, Sequence};

pub fn first<S: Sequence>(seq: &S) -> SeqResult<S::Item> {
    seq.cursor()?
        .try_advance()?
        .ok_or(SeqError::Empty { op: "first" })
}

pub fn first_or<S: Sequence>(seq: &S, default: S::Item) -> SeqResult<S::Item> {
    Ok(seq.cursor()?.try_advance()?.unwrap_or(default))
}

fn last_opt<S: Sequence>(seq: &S) -> SeqResult<Option<S::Item>> {
    if seq.supports_random_access() {
        if let Some(n) = seq.fast_count() {
            return match n {
                0 => Ok(None),
                n => seq.get(n - 1).map(Some),
            };
        }
    }
    let mut cursor = seq.cursor()?;
    let mut last = None;
    while let Some(item) = cursor.try_advance()? {
        last = Some(item);
    }
    Ok(last)
}

pub fn last<S: Sequence>(seq: &S) -> SeqResult<S::Item> {
    last_opt(seq)?.ok_or(SeqError::Empty { op: "last" })
}

pub fn last_or<S: Sequence>(seq: &S, default: S::Item) -> SeqResult<S::Item> {
    Ok(last_opt(seq)?.unwrap_or(default))
}

/// Element at `index`: random access when supported, otherwise a counted scan.
pub fn element_at<S: Sequence>(seq: &S, index: usize) -> SeqResult<S::Item> {
    if seq.supports_random_access() {
        return seq.get(index);
    }
    let mut cursor = seq.cursor()?;
    let mut seen = 0;
    while let Some(item) = cursor.try_advance()? {
        if seen == index {
            return Ok(item);
        }
        seen += 1;
    }
    Err(SeqError::IndexOutOfRange { index, len: seen })
}

pub fn any<S: Sequence>(seq: &S) -> SeqResult<bool> {
    seq.is_non_empty()
}

pub fn any_by<S, P>(seq: &S, pred: &P) -> SeqResult<bool>
where
    S: Sequence,
    P: Predicate<S::Item>,
{
    let mut cursor = seq.cursor()?;
    while let Some(item) = cursor.try_advance()? {
        if pred.test(&item) {
            return Ok(true);
        }
    }
    Ok(false)
}

pub fn all<S, P>(seq: &S, pred: &P) -> SeqResult<bool>
where
    S: Sequence,
    P: Predicate<S::Item>,
{
    let mut cursor = seq.cursor()?;
    while let Some(item) = cursor.try_advance()? {
        if !pred.test(&item) {
            return Ok(false);
        }
    }
    Ok(true)
}

pub fn contains_by<S, Q>(seq: &S, value: &S::Item, eq: &Q) -> SeqResult<bool>
where
    S: Sequence,
    Q: EqualityComparer<S::Item>,
{
    any_by(seq, &|item: &S::Item| eq.equals(item, value))
}

pub fn count<S: Sequence>(seq: &S) -> SeqResult<usize> {
    if let Some(n) = seq.fast_count() {
        return Ok(n);
    }
    let mut cursor = seq.cursor()?;
    let mut n = 0;
    while cursor.try_advance()?.is_some() {
        n += 1;
    }
    Ok(n)
}

pub fn count_by<S, P>(seq: &S, pred: &P) -> SeqResult<usize>
where
    S: Sequence,
    P: Predicate<S::Item>,
{
    let mut cursor = seq.cursor()?;
    let mut n = 0;
    while let Some(item) = cursor.try_advance()? {
        if pred.test(&item) {
            n += 1;
        }
    }
    Ok(n)
}

pub fn aggregate<S, A, F>(seq: &S, seed: A, mut f: F) -> SeqResult<A>
where
    S: Sequence,
    F: FnMut(A, S::Item) -> A,
{
    let mut cursor = seq.cursor()?;
    let mut acc = seed;
    while let Some(item) = cursor.try_advance()? {
        acc = f(acc, item);
    }
    Ok(acc)
}

/// `aggregate` seeded with the first element.
pub fn reduce<S, F>(seq: &S, mut f: F) -> SeqResult<S::Item>
where
    S: Sequence,
    F: FnMut(S::Item, S::Item) -> S::Item,
{
    let mut cursor = seq.cursor()?;
    let mut acc = cursor
        .try_advance()?
        .ok_or(SeqError::Empty { op: "reduce" })?;
    while let Some(item) = cursor.try_advance()? {
        acc = f(acc, item);
    }
    Ok(acc)
}

// Keeps the earliest element among ties.
fn extreme_by<S, C>(seq: &S, cmp: &C, replace_on: Ordering, op: &'static str) -> SeqResult<S::Item>
where
    S: Sequence,
    C: Comparer<S::Item>,
{
    let mut cursor = seq.cursor()?;
    let mut best = cursor.try_advance()?.ok_or(SeqError::Empty { op })?;
    while let Some(item) = cursor.try_advance()? {
        if cmp.compare(&item, &best) == replace_on {
            best = item;
        }
    }
    Ok(best)
}

pub fn min_by<S, C>(seq: &S, cmp: &C) -> SeqResult<S::Item>
where
    S: Sequence,
    C: Comparer<S::Item>,
{
    extreme_by(seq, cmp, Ordering::Less, "min")
}

pub fn max_by<S, C>(seq: &S, cmp: &C) -> SeqResult<S::Item>
where
    S: Sequence,
    C: Comparer<S::Item>,
{
    extreme_by(seq, cmp, Ordering::Greater, "max")
}

/// Same length and pairwise equal, in order.
pub fn sequence_equal<A, B, Q>(a: &A, b: &B, eq: &Q) -> SeqResult<bool>
where
    A: Sequence,
    B: Sequence<Item = A::Item>,
    Q: EqualityComparer<A::Item>,
{
    if let (Some(n), Some(m)) = (a.fast_count(), b.fast_count()) {
        if n != m {
            return Ok(false);
        }
    }
    let mut left = a.cursor()?;
    let mut right = b.cursor()?;
    loop {
        match (left.try_advance()?, right.try_advance()?) {
            (None, None) => return Ok(true),
            (Some(x), Some(y)) if eq.equals(&x, &y) => {}
            _ => return Ok(false),
        }
    }
}
