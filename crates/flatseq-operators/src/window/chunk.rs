//! Chunking (`Buffer`) and reversal (`Reverse`).

use flatseq_mem::{Allocator, ArenaBuf};

use crate::materialize::{drain_into, BufCursor, DEFAULT_CAPACITY};
use crate::metrics;
use crate::traits::{Cursor, SeqError, SeqResult, Sequence};

// ----- Buffer -----

/// Exposes the source in chunks of exactly `size` elements; the final chunk
/// may be shorter. Each chunk is an owned buffer that the consumer drops.
#[derive(Debug, Clone)]
pub struct Buffer<S> {
    source: S,
    size: usize,
    alloc: Allocator,
}

impl<S> Buffer<S> {
    pub fn new(source: S, size: usize, alloc: &Allocator) -> Self {
        Self {
            source,
            size,
            alloc: alloc.clone(),
        }
    }
}

impl<S: Sequence> Sequence for Buffer<S> {
    type Item = ArenaBuf<S::Item>;
    type Cursor = BufferCursor<S::Cursor>;

    fn name(&self) -> &'static str {
        "buffer"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        if self.size == 0 {
            return Err(SeqError::unsupported("chunk size 0", self.name()));
        }
        Ok(BufferCursor {
            inner: self.source.cursor()?,
            size: self.size,
            remaining: self.source.fast_count(),
            alloc: self.alloc.clone(),
            done: false,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        if self.size == 0 {
            return None;
        }
        self.source.fast_count().map(|n| n.div_ceil(self.size))
    }

    fn is_non_empty(&self) -> SeqResult<bool> {
        self.source.is_non_empty()
    }
}

pub struct BufferCursor<C> {
    inner: C,
    size: usize,
    remaining: Option<usize>,
    alloc: Allocator,
    done: bool,
}

impl<C: Cursor> Cursor for BufferCursor<C> {
    type Item = ArenaBuf<C::Item>;

    fn try_advance(&mut self) -> SeqResult<Option<ArenaBuf<C::Item>>> {
        if self.done {
            return Ok(None);
        }
        // Pull before allocating so exhaustion never costs an empty chunk.
        let Some(first) = self.inner.try_advance()? else {
            self.done = true;
            return Ok(None);
        };

        let cap = match self.remaining {
            Some(n) => self.size.min(n),
            None => self.size.min(DEFAULT_CAPACITY),
        };
        let mut chunk = ArenaBuf::with_capacity(&self.alloc, cap.max(1), "buffer")?;
        chunk.push(first)?;
        while chunk.len() < self.size {
            match self.inner.try_advance()? {
                Some(item) => chunk.push(item)?,
                None => {
                    self.done = true;
                    break;
                }
            }
        }
        if let Some(n) = self.remaining.as_mut() {
            *n = n.saturating_sub(chunk.len());
        }
        Ok(Some(chunk))
    }
}

// ----- Reverse -----

/// Yields the source back to front.
///
/// A source with index-addressable storage and a known length is read
/// through mapped indices without materializing. Anything else is a blocking
/// stage: drained into a scratch buffer, swapped in place, then handed out.
#[derive(Debug, Clone)]
pub struct Reverse<S> {
    source: S,
    alloc: Allocator,
}

impl<S> Reverse<S> {
    pub fn new(source: S, alloc: &Allocator) -> Self {
        Self {
            source,
            alloc: alloc.clone(),
        }
    }
}

impl<S> Reverse<S>
where
    S: Sequence,
{
    fn indexed_len(&self) -> Option<usize> {
        if self.source.supports_random_access() {
            self.source.fast_count()
        } else {
            None
        }
    }
}

impl<S> Sequence for Reverse<S>
where
    S: Sequence,
    S::Item: Copy,
{
    type Item = S::Item;
    type Cursor = ReverseCursor<S>;

    fn name(&self) -> &'static str {
        "reverse"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        let state = match self.indexed_len() {
            Some(len) => ReverseState::Indexed {
                source: self.source.clone(),
                len,
                remaining: len,
            },
            None => ReverseState::Buffered {
                inner: self.source.cursor()?,
                hint: self.source.fast_count(),
                alloc: self.alloc.clone(),
                out: None,
            },
        };
        Ok(ReverseCursor { state })
    }

    fn fast_count(&self) -> Option<usize> {
        self.source.fast_count()
    }

    fn is_non_empty(&self) -> SeqResult<bool> {
        self.source.is_non_empty()
    }

    fn supports_random_access(&self) -> bool {
        self.indexed_len().is_some()
    }

    fn get(&self, index: usize) -> SeqResult<S::Item> {
        let Some(len) = self.indexed_len() else {
            return Err(SeqError::unsupported("get", self.name()));
        };
        if index >= len {
            return Err(SeqError::IndexOutOfRange { index, len });
        }
        self.source.get(len - 1 - index)
    }
}

pub struct ReverseCursor<S: Sequence> {
    state: ReverseState<S>,
}

enum ReverseState<S: Sequence> {
    Indexed {
        source: S,
        len: usize,
        remaining: usize,
    },
    Buffered {
        inner: S::Cursor,
        hint: Option<usize>,
        alloc: Allocator,
        out: Option<BufCursor<S::Item>>,
    },
}

impl<S> Cursor for ReverseCursor<S>
where
    S: Sequence,
    S::Item: Copy,
{
    type Item = S::Item;

    fn try_advance(&mut self) -> SeqResult<Option<S::Item>> {
        match &mut self.state {
            ReverseState::Indexed {
                source, remaining, ..
            } => {
                if *remaining == 0 {
                    return Ok(None);
                }
                *remaining -= 1;
                source.get(*remaining).map(Some)
            }
            ReverseState::Buffered {
                inner,
                hint,
                alloc,
                out,
            } => {
                if out.is_none() {
                    // Taken up front so a failed drain leaves an exhausted cursor.
                    *out = Some(BufCursor::empty());
                    let mut buf = drain_into(inner, alloc, *hint, "reverse")?;
                    buf.reverse();
                    metrics::stage_materialized("reverse", buf.len(), buf.accounted_bytes());
                    *out = Some(BufCursor::new(buf));
                }
                Ok(out.as_mut().and_then(BufCursor::next))
            }
        }
    }

    fn reset(&mut self) -> SeqResult<()> {
        match &mut self.state {
            ReverseState::Indexed { len, remaining, .. } => {
                *remaining = *len;
                Ok(())
            }
            ReverseState::Buffered { .. } => Err(SeqError::unsupported("reset", "reverse")),
        }
    }
}
