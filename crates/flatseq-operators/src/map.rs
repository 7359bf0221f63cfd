//! Projection stages: `Select`, `SelectIndex`, `SelectMany`, and `Zip`.

use crate::traits::{Cursor, SeqError, SeqResult, Sequence};

// ----- Select -----

#[derive(Debug, Clone)]
pub struct Select<S, F> {
    source: S,
    project: F,
}

impl<S, F> Select<S, F> {
    pub fn new(source: S, project: F) -> Self {
        Self { source, project }
    }
}

impl<S, F, U> Sequence for Select<S, F>
where
    S: Sequence,
    F: Fn(S::Item) -> U + Clone,
{
    type Item = U;
    type Cursor = SelectCursor<S::Cursor, F>;

    fn name(&self) -> &'static str {
        "select"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(SelectCursor {
            inner: self.source.cursor()?,
            project: self.project.clone(),
        })
    }

    fn fast_count(&self) -> Option<usize> {
        self.source.fast_count()
    }

    fn is_non_empty(&self) -> SeqResult<bool> {
        self.source.is_non_empty()
    }

    fn supports_random_access(&self) -> bool {
        self.source.supports_random_access()
    }

    fn get(&self, index: usize) -> SeqResult<U> {
        if !self.source.supports_random_access() {
            return Err(SeqError::unsupported("get", self.name()));
        }
        Ok((self.project)(self.source.get(index)?))
    }
}

pub struct SelectCursor<C, F> {
    inner: C,
    project: F,
}

impl<C, F, U> Cursor for SelectCursor<C, F>
where
    C: Cursor,
    F: Fn(C::Item) -> U,
{
    type Item = U;

    fn try_advance(&mut self) -> SeqResult<Option<U>> {
        Ok(self.inner.try_advance()?.map(&self.project))
    }

    fn reset(&mut self) -> SeqResult<()> {
        self.inner.reset()
    }
}

// ----- SelectIndex -----

/// `Select` whose projector also receives the zero-based position.
#[derive(Debug, Clone)]
pub struct SelectIndex<S, F> {
    source: S,
    project: F,
}

impl<S, F> SelectIndex<S, F> {
    pub fn new(source: S, project: F) -> Self {
        Self { source, project }
    }
}

impl<S, F, U> Sequence for SelectIndex<S, F>
where
    S: Sequence,
    F: Fn(S::Item, usize) -> U + Clone,
{
    type Item = U;
    type Cursor = SelectIndexCursor<S::Cursor, F>;

    fn name(&self) -> &'static str {
        "select_index"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(SelectIndexCursor {
            inner: self.source.cursor()?,
            project: self.project.clone(),
            index: 0,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        self.source.fast_count()
    }

    fn is_non_empty(&self) -> SeqResult<bool> {
        self.source.is_non_empty()
    }

    fn supports_random_access(&self) -> bool {
        self.source.supports_random_access()
    }

    fn get(&self, index: usize) -> SeqResult<U> {
        if !self.source.supports_random_access() {
            return Err(SeqError::unsupported("get", self.name()));
        }
        Ok((self.project)(self.source.get(index)?, index))
    }
}

pub struct SelectIndexCursor<C, F> {
    inner: C,
    project: F,
    index: usize,
}

impl<C, F, U> Cursor for SelectIndexCursor<C, F>
where
    C: Cursor,
    F: Fn(C::Item, usize) -> U,
{
    type Item = U;

    fn try_advance(&mut self) -> SeqResult<Option<U>> {
        let Some(item) = self.inner.try_advance()? else {
            return Ok(None);
        };
        let index = self.index;
        self.index += 1;
        Ok(Some((self.project)(item, index)))
    }

    fn reset(&mut self) -> SeqResult<()> {
        self.inner.reset()?;
        self.index = 0;
        Ok(())
    }
}

// ----- SelectMany -----

/// Flattens one sub-sequence per upstream element.
///
/// The outer cursor only advances once the current inner cursor is exhausted,
/// and each inner cursor is dropped the moment it runs dry, so nested stages
/// that buffer release their memory per outer element.
#[derive(Debug, Clone)]
pub struct SelectMany<S, F> {
    source: S,
    project: F,
}

impl<S, F> SelectMany<S, F> {
    pub fn new(source: S, project: F) -> Self {
        Self { source, project }
    }
}

impl<S, F, I> Sequence for SelectMany<S, F>
where
    S: Sequence,
    F: Fn(S::Item) -> I + Clone,
    I: Sequence,
{
    type Item = I::Item;
    type Cursor = SelectManyCursor<S::Cursor, F, I>;

    fn name(&self) -> &'static str {
        "select_many"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(SelectManyCursor {
            outer: self.source.cursor()?,
            project: self.project.clone(),
            inner: None,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        match self.source.fast_count() {
            Some(0) => Some(0),
            _ => None,
        }
    }
}

pub struct SelectManyCursor<C, F, I: Sequence> {
    outer: C,
    project: F,
    inner: Option<I::Cursor>,
}

impl<C, F, I> Cursor for SelectManyCursor<C, F, I>
where
    C: Cursor,
    F: Fn(C::Item) -> I,
    I: Sequence,
{
    type Item = I::Item;

    fn try_advance(&mut self) -> SeqResult<Option<I::Item>> {
        loop {
            if let Some(inner) = self.inner.as_mut() {
                if let Some(item) = inner.try_advance()? {
                    return Ok(Some(item));
                }
                self.inner = None;
            }
            match self.outer.try_advance()? {
                Some(outer) => {
                    let sub = (self.project)(outer);
                    self.inner = Some(sub.cursor()?);
                }
                None => return Ok(None),
            }
        }
    }
}

// ----- Zip -----

/// Pairs elements from two sequences, stopping at the shorter one.
#[derive(Debug, Clone)]
pub struct Zip<A, B, F> {
    first: A,
    second: B,
    combine: F,
}

impl<A, B, F> Zip<A, B, F> {
    pub fn new(first: A, second: B, combine: F) -> Self {
        Self {
            first,
            second,
            combine,
        }
    }
}

impl<A, B, F, U> Sequence for Zip<A, B, F>
where
    A: Sequence,
    B: Sequence,
    F: Fn(A::Item, B::Item) -> U + Clone,
{
    type Item = U;
    type Cursor = ZipCursor<A::Cursor, B::Cursor, F>;

    fn name(&self) -> &'static str {
        "zip"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(ZipCursor {
            first: self.first.cursor()?,
            second: self.second.cursor()?,
            combine: self.combine.clone(),
            done: false,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        Some(self.first.fast_count()?.min(self.second.fast_count()?))
    }
}

pub struct ZipCursor<A, B, F> {
    first: A,
    second: B,
    combine: F,
    done: bool,
}

impl<A, B, F, U> Cursor for ZipCursor<A, B, F>
where
    A: Cursor,
    B: Cursor,
    F: Fn(A::Item, B::Item) -> U,
{
    type Item = U;

    fn try_advance(&mut self) -> SeqResult<Option<U>> {
        if self.done {
            return Ok(None);
        }
        let (Some(a), Some(b)) = (self.first.try_advance()?, self.second.try_advance()?) else {
            self.done = true;
            return Ok(None);
        };
        Ok(Some((self.combine)(a, b)))
    }
}
