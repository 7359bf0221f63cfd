//! Boundary-element stages: `Append`, `Prepend`, `DefaultIfEmpty`, `Concat`.
//!
//! One extra element at an end, or two sequences stitched together. None of
//! these allocate.

use crate::traits::{Cursor, SeqError, SeqResult, Sequence};

// ----- Append -----

#[derive(Debug, Clone)]
pub struct Append<S, T> {
    source: S,
    value: T,
}

impl<S, T> Append<S, T> {
    pub fn new(source: S, value: T) -> Self {
        Self { source, value }
    }
}

impl<S> Sequence for Append<S, S::Item>
where
    S: Sequence,
    S::Item: Clone,
{
    type Item = S::Item;
    type Cursor = AppendCursor<S::Cursor>;

    fn name(&self) -> &'static str {
        "append"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(AppendCursor {
            inner: self.source.cursor()?,
            value: self.value.clone(),
            tail: None,
            inner_done: false,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        self.source.fast_count()?.checked_add(1)
    }

    fn is_non_empty(&self) -> SeqResult<bool> {
        Ok(true)
    }

    fn supports_random_access(&self) -> bool {
        self.source.supports_random_access() && self.source.fast_count().is_some()
    }

    fn get(&self, index: usize) -> SeqResult<S::Item> {
        let Some(n) = self.source.fast_count().filter(|_| self.supports_random_access()) else {
            return Err(SeqError::unsupported("get", self.name()));
        };
        match index.cmp(&n) {
            std::cmp::Ordering::Less => self.source.get(index),
            std::cmp::Ordering::Equal => Ok(self.value.clone()),
            std::cmp::Ordering::Greater => Err(SeqError::IndexOutOfRange { index, len: n + 1 }),
        }
    }
}

pub struct AppendCursor<C: Cursor> {
    inner: C,
    value: C::Item,
    tail: Option<C::Item>,
    inner_done: bool,
}

impl<C> Cursor for AppendCursor<C>
where
    C: Cursor,
    C::Item: Clone,
{
    type Item = C::Item;

    fn try_advance(&mut self) -> SeqResult<Option<C::Item>> {
        if !self.inner_done {
            if let Some(item) = self.inner.try_advance()? {
                return Ok(Some(item));
            }
            self.inner_done = true;
            self.tail = Some(self.value.clone());
        }
        Ok(self.tail.take())
    }

    fn reset(&mut self) -> SeqResult<()> {
        self.inner.reset()?;
        self.inner_done = false;
        self.tail = None;
        Ok(())
    }
}

// ----- Prepend -----

#[derive(Debug, Clone)]
pub struct Prepend<S, T> {
    source: S,
    value: T,
}

impl<S, T> Prepend<S, T> {
    pub fn new(source: S, value: T) -> Self {
        Self { source, value }
    }
}

impl<S> Sequence for Prepend<S, S::Item>
where
    S: Sequence,
    S::Item: Clone,
{
    type Item = S::Item;
    type Cursor = PrependCursor<S::Cursor>;

    fn name(&self) -> &'static str {
        "prepend"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(PrependCursor {
            inner: self.source.cursor()?,
            value: self.value.clone(),
            head: Some(self.value.clone()),
        })
    }

    fn fast_count(&self) -> Option<usize> {
        self.source.fast_count()?.checked_add(1)
    }

    fn is_non_empty(&self) -> SeqResult<bool> {
        Ok(true)
    }

    fn supports_random_access(&self) -> bool {
        self.source.supports_random_access()
    }

    fn get(&self, index: usize) -> SeqResult<S::Item> {
        if !self.source.supports_random_access() {
            return Err(SeqError::unsupported("get", self.name()));
        }
        match index {
            0 => Ok(self.value.clone()),
            i => self.source.get(i - 1).map_err(|e| match e {
                SeqError::IndexOutOfRange { len, .. } => SeqError::IndexOutOfRange {
                    index,
                    len: len + 1,
                },
                other => other,
            }),
        }
    }
}

pub struct PrependCursor<C: Cursor> {
    inner: C,
    value: C::Item,
    head: Option<C::Item>,
}

impl<C> Cursor for PrependCursor<C>
where
    C: Cursor,
    C::Item: Clone,
{
    type Item = C::Item;

    fn try_advance(&mut self) -> SeqResult<Option<C::Item>> {
        if let Some(head) = self.head.take() {
            return Ok(Some(head));
        }
        self.inner.try_advance()
    }

    fn reset(&mut self) -> SeqResult<()> {
        self.inner.reset()?;
        self.head = Some(self.value.clone());
        Ok(())
    }
}

// ----- DefaultIfEmpty -----

/// Passes the source through, or yields a single default when it is empty.
#[derive(Debug, Clone)]
pub struct DefaultIfEmpty<S, T> {
    source: S,
    default: T,
}

impl<S, T> DefaultIfEmpty<S, T> {
    pub fn new(source: S, default: T) -> Self {
        Self { source, default }
    }
}

impl<S> Sequence for DefaultIfEmpty<S, S::Item>
where
    S: Sequence,
    S::Item: Clone,
{
    type Item = S::Item;
    type Cursor = DefaultIfEmptyCursor<S::Cursor>;

    fn name(&self) -> &'static str {
        "default_if_empty"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(DefaultIfEmptyCursor {
            inner: self.source.cursor()?,
            default: self.default.clone(),
            state: Fallback::Unknown,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        self.source.fast_count().map(|n| n.max(1))
    }

    fn is_non_empty(&self) -> SeqResult<bool> {
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fallback {
    Unknown,
    SourceHadItems,
    Exhausted,
}

pub struct DefaultIfEmptyCursor<C: Cursor> {
    inner: C,
    default: C::Item,
    state: Fallback,
}

impl<C> Cursor for DefaultIfEmptyCursor<C>
where
    C: Cursor,
    C::Item: Clone,
{
    type Item = C::Item;

    fn try_advance(&mut self) -> SeqResult<Option<C::Item>> {
        match self.state {
            Fallback::Exhausted => Ok(None),
            Fallback::SourceHadItems => self.inner.try_advance(),
            Fallback::Unknown => match self.inner.try_advance()? {
                Some(item) => {
                    self.state = Fallback::SourceHadItems;
                    Ok(Some(item))
                }
                None => {
                    self.state = Fallback::Exhausted;
                    Ok(Some(self.default.clone()))
                }
            },
        }
    }

    fn reset(&mut self) -> SeqResult<()> {
        self.inner.reset()?;
        self.state = Fallback::Unknown;
        Ok(())
    }
}

// ----- Concat -----

/// `first` then `second`. The second cursor is only opened once the first is
/// exhausted, and the first is dropped at that point.
#[derive(Debug, Clone)]
pub struct Concat<A, B> {
    first: A,
    second: B,
}

impl<A, B> Concat<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A, B> Sequence for Concat<A, B>
where
    A: Sequence,
    B: Sequence<Item = A::Item>,
{
    type Item = A::Item;
    type Cursor = ConcatCursor<A, B>;

    fn name(&self) -> &'static str {
        "concat"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(ConcatCursor {
            first: Some(self.first.cursor()?),
            second_source: self.second.clone(),
            second: None,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        self.first
            .fast_count()?
            .checked_add(self.second.fast_count()?)
    }

    fn is_non_empty(&self) -> SeqResult<bool> {
        Ok(self.first.is_non_empty()? || self.second.is_non_empty()?)
    }

    fn supports_random_access(&self) -> bool {
        self.first.supports_random_access()
            && self.second.supports_random_access()
            && self.first.fast_count().is_some()
    }

    fn get(&self, index: usize) -> SeqResult<A::Item> {
        let Some(n) = self.first.fast_count().filter(|_| self.supports_random_access()) else {
            return Err(SeqError::unsupported("get", self.name()));
        };
        if index < n {
            return self.first.get(index);
        }
        self.second.get(index - n).map_err(|e| match e {
            SeqError::IndexOutOfRange { len, .. } => SeqError::IndexOutOfRange {
                index,
                len: n + len,
            },
            other => other,
        })
    }
}

pub struct ConcatCursor<A: Sequence, B: Sequence> {
    first: Option<A::Cursor>,
    second_source: B,
    second: Option<B::Cursor>,
}

impl<A, B> Cursor for ConcatCursor<A, B>
where
    A: Sequence,
    B: Sequence<Item = A::Item>,
{
    type Item = A::Item;

    fn try_advance(&mut self) -> SeqResult<Option<A::Item>> {
        if let Some(first) = self.first.as_mut() {
            if let Some(item) = first.try_advance()? {
                return Ok(Some(item));
            }
            self.first = None;
            self.second = Some(self.second_source.cursor()?);
        }
        match self.second.as_mut() {
            Some(second) => second.try_advance(),
            None => Ok(None),
        }
    }
}
