//! Filtering stages: `Where`, `WhereIndex`, `TakeWhile`, `SkipWhile`, and the
//! `Negate` predicate wrapper.
//!
//! All of them are streaming pass-throughs: no buffering, no allocation, one
//! upstream pull per inspected element.

use crate::traits::{Cursor, SeqResult, Sequence};

/// Element predicate. Implemented by `Fn(&T) -> bool` closures and [`Negate`].
pub trait Predicate<T> {
    fn test(&self, item: &T) -> bool;
}

impl<T, F> Predicate<T> for F
where
    F: Fn(&T) -> bool,
{
    fn test(&self, item: &T) -> bool {
        self(item)
    }
}

/// Predicate with a zero-based running index. Implemented by
/// `Fn(&T, usize) -> bool` closures.
pub trait IndexPredicate<T> {
    fn test(&self, item: &T, index: usize) -> bool;
}

impl<T, F> IndexPredicate<T> for F
where
    F: Fn(&T, usize) -> bool,
{
    fn test(&self, item: &T, index: usize) -> bool {
        self(item, index)
    }
}

/// Inverts a predicate.
#[derive(Debug, Clone, Copy)]
pub struct Negate<P>(pub P);

impl<T, P: Predicate<T>> Predicate<T> for Negate<P> {
    fn test(&self, item: &T) -> bool {
        !self.0.test(item)
    }
}

impl<T, P: IndexPredicate<T>> IndexPredicate<T> for Negate<P> {
    fn test(&self, item: &T, index: usize) -> bool {
        !self.0.test(item, index)
    }
}

// ----- Where -----

#[derive(Debug, Clone)]
pub struct Where<S, P> {
    source: S,
    pred: P,
}

impl<S, P> Where<S, P> {
    pub fn new(source: S, pred: P) -> Self {
        Self { source, pred }
    }
}

impl<S, P> Sequence for Where<S, P>
where
    S: Sequence,
    P: Predicate<S::Item> + Clone,
{
    type Item = S::Item;
    type Cursor = WhereCursor<S::Cursor, P>;

    fn name(&self) -> &'static str {
        "where"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(WhereCursor {
            inner: self.source.cursor()?,
            pred: self.pred.clone(),
        })
    }

    fn fast_count(&self) -> Option<usize> {
        // An empty upstream stays empty.
        match self.source.fast_count() {
            Some(0) => Some(0),
            _ => None,
        }
    }
}

pub struct WhereCursor<C, P> {
    inner: C,
    pred: P,
}

impl<C, P> Cursor for WhereCursor<C, P>
where
    C: Cursor,
    P: Predicate<C::Item>,
{
    type Item = C::Item;

    fn try_advance(&mut self) -> SeqResult<Option<C::Item>> {
        while let Some(item) = self.inner.try_advance()? {
            if self.pred.test(&item) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    fn reset(&mut self) -> SeqResult<()> {
        self.inner.reset()
    }
}

// ----- WhereIndex -----

/// `Where` whose predicate also sees the element's upstream position.
#[derive(Debug, Clone)]
pub struct WhereIndex<S, P> {
    source: S,
    pred: P,
}

impl<S, P> WhereIndex<S, P> {
    pub fn new(source: S, pred: P) -> Self {
        Self { source, pred }
    }
}

impl<S, P> Sequence for WhereIndex<S, P>
where
    S: Sequence,
    P: IndexPredicate<S::Item> + Clone,
{
    type Item = S::Item;
    type Cursor = WhereIndexCursor<S::Cursor, P>;

    fn name(&self) -> &'static str {
        "where_index"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(WhereIndexCursor {
            inner: self.source.cursor()?,
            pred: self.pred.clone(),
            index: 0,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        match self.source.fast_count() {
            Some(0) => Some(0),
            _ => None,
        }
    }
}

pub struct WhereIndexCursor<C, P> {
    inner: C,
    pred: P,
    index: usize,
}

impl<C, P> Cursor for WhereIndexCursor<C, P>
where
    C: Cursor,
    P: IndexPredicate<C::Item>,
{
    type Item = C::Item;

    fn try_advance(&mut self) -> SeqResult<Option<C::Item>> {
        while let Some(item) = self.inner.try_advance()? {
            let index = self.index;
            self.index += 1;
            if self.pred.test(&item, index) {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    fn reset(&mut self) -> SeqResult<()> {
        self.inner.reset()?;
        self.index = 0;
        Ok(())
    }
}

// ----- TakeWhile -----

#[derive(Debug, Clone)]
pub struct TakeWhile<S, P> {
    source: S,
    pred: P,
}

impl<S, P> TakeWhile<S, P> {
    pub fn new(source: S, pred: P) -> Self {
        Self { source, pred }
    }
}

impl<S, P> Sequence for TakeWhile<S, P>
where
    S: Sequence,
    P: Predicate<S::Item> + Clone,
{
    type Item = S::Item;
    type Cursor = TakeWhileCursor<S::Cursor, P>;

    fn name(&self) -> &'static str {
        "take_while"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(TakeWhileCursor {
            inner: self.source.cursor()?,
            pred: self.pred.clone(),
            done: false,
        })
    }
}

pub struct TakeWhileCursor<C, P> {
    inner: C,
    pred: P,
    done: bool,
}

impl<C, P> Cursor for TakeWhileCursor<C, P>
where
    C: Cursor,
    P: Predicate<C::Item>,
{
    type Item = C::Item;

    fn try_advance(&mut self) -> SeqResult<Option<C::Item>> {
        if self.done {
            return Ok(None);
        }
        match self.inner.try_advance()? {
            Some(item) if self.pred.test(&item) => Ok(Some(item)),
            _ => {
                self.done = true;
                Ok(None)
            }
        }
    }

    fn reset(&mut self) -> SeqResult<()> {
        self.inner.reset()?;
        self.done = false;
        Ok(())
    }
}

// ----- SkipWhile -----

#[derive(Debug, Clone)]
pub struct SkipWhile<S, P> {
    source: S,
    pred: P,
}

impl<S, P> SkipWhile<S, P> {
    pub fn new(source: S, pred: P) -> Self {
        Self { source, pred }
    }
}

impl<S, P> Sequence for SkipWhile<S, P>
where
    S: Sequence,
    P: Predicate<S::Item> + Clone,
{
    type Item = S::Item;
    type Cursor = SkipWhileCursor<S::Cursor, P>;

    fn name(&self) -> &'static str {
        "skip_while"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(SkipWhileCursor {
            inner: self.source.cursor()?,
            pred: self.pred.clone(),
            skipping: true,
        })
    }
}

pub struct SkipWhileCursor<C, P> {
    inner: C,
    pred: P,
    skipping: bool,
}

impl<C, P> Cursor for SkipWhileCursor<C, P>
where
    C: Cursor,
    P: Predicate<C::Item>,
{
    type Item = C::Item;

    fn try_advance(&mut self) -> SeqResult<Option<C::Item>> {
        if !self.skipping {
            return self.inner.try_advance();
        }
        while let Some(item) = self.inner.try_advance()? {
            if !self.pred.test(&item) {
                self.skipping = false;
                return Ok(Some(item));
            }
        }
        self.skipping = false;
        Ok(None)
    }

    fn reset(&mut self) -> SeqResult<()> {
        self.inner.reset()?;
        self.skipping = true;
        Ok(())
    }
}
