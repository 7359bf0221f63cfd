//! Windowing stages.
//!
//! - `Skip`/`Take`: positional, streaming, no scratch memory.
//! - `SkipLast`/`TakeLast`: ring-buffered tails (`tail`).
//! - `Buffer`/`Reverse`: chunking and reversal (`chunk`).
//!
//! Counts are signed at the API boundary; a negative count means zero.

mod chunk;
mod tail;

pub use chunk::{Buffer, BufferCursor, Reverse, ReverseCursor};
pub use tail::{SkipLast, SkipLastCursor, TakeLast, TakeLastCursor};

use crate::traits::{clamp_count, Cursor, SeqError, SeqResult, Sequence};

// ----- Skip -----

/// Drops the first `n` elements. The skip happens eagerly when the cursor is
/// created and silently stops at exhaustion.
#[derive(Debug, Clone)]
pub struct Skip<S> {
    source: S,
    count: usize,
}

impl<S> Skip<S> {
    pub fn new(source: S, count: isize) -> Self {
        Self {
            source,
            count: clamp_count(count),
        }
    }
}

fn skip_ahead<C: Cursor>(cursor: &mut C, count: usize) -> SeqResult<()> {
    for _ in 0..count {
        if cursor.try_advance()?.is_none() {
            break;
        }
    }
    Ok(())
}

impl<S: Sequence> Sequence for Skip<S> {
    type Item = S::Item;
    type Cursor = SkipCursor<S::Cursor>;

    fn name(&self) -> &'static str {
        "skip"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        let mut inner = self.source.cursor()?;
        skip_ahead(&mut inner, self.count)?;
        Ok(SkipCursor {
            inner,
            count: self.count,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        self.source
            .fast_count()
            .map(|n| n.saturating_sub(self.count))
    }

    fn supports_random_access(&self) -> bool {
        self.source.supports_random_access()
    }

    fn get(&self, index: usize) -> SeqResult<S::Item> {
        if !self.source.supports_random_access() {
            return Err(SeqError::unsupported("get", self.name()));
        }
        if let Some(len) = self.fast_count() {
            if index >= len {
                return Err(SeqError::IndexOutOfRange { index, len });
            }
        }
        let shifted = index
            .checked_add(self.count)
            .ok_or(SeqError::IndexOutOfRange { index, len: 0 })?;
        self.source.get(shifted)
    }
}

pub struct SkipCursor<C> {
    inner: C,
    count: usize,
}

impl<C: Cursor> Cursor for SkipCursor<C> {
    type Item = C::Item;

    fn try_advance(&mut self) -> SeqResult<Option<C::Item>> {
        self.inner.try_advance()
    }

    fn reset(&mut self) -> SeqResult<()> {
        self.inner.reset()?;
        skip_ahead(&mut self.inner, self.count)
    }
}

// ----- Take -----

/// Yields at most `n` elements and stops pulling upstream after the last one.
#[derive(Debug, Clone)]
pub struct Take<S> {
    source: S,
    count: usize,
}

impl<S> Take<S> {
    pub fn new(source: S, count: isize) -> Self {
        Self {
            source,
            count: clamp_count(count),
        }
    }
}

impl<S: Sequence> Sequence for Take<S> {
    type Item = S::Item;
    type Cursor = TakeCursor<S::Cursor>;

    fn name(&self) -> &'static str {
        "take"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(TakeCursor {
            inner: self.source.cursor()?,
            count: self.count,
            remaining: self.count,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        if self.count == 0 {
            return Some(0);
        }
        self.source.fast_count().map(|n| n.min(self.count))
    }

    fn is_non_empty(&self) -> SeqResult<bool> {
        if self.count == 0 {
            return Ok(false);
        }
        self.source.is_non_empty()
    }

    fn supports_random_access(&self) -> bool {
        self.source.supports_random_access()
    }

    fn get(&self, index: usize) -> SeqResult<S::Item> {
        if !self.source.supports_random_access() {
            return Err(SeqError::unsupported("get", self.name()));
        }
        let len = self.fast_count().unwrap_or(self.count);
        if index >= len {
            return Err(SeqError::IndexOutOfRange { index, len });
        }
        self.source.get(index)
    }
}

pub struct TakeCursor<C> {
    inner: C,
    count: usize,
    remaining: usize,
}

impl<C: Cursor> Cursor for TakeCursor<C> {
    type Item = C::Item;

    fn try_advance(&mut self) -> SeqResult<Option<C::Item>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        match self.inner.try_advance()? {
            Some(item) => {
                self.remaining -= 1;
                Ok(Some(item))
            }
            None => {
                self.remaining = 0;
                Ok(None)
            }
        }
    }

    fn reset(&mut self) -> SeqResult<()> {
        self.inner.reset()?;
        self.remaining = self.count;
        Ok(())
    }
}
