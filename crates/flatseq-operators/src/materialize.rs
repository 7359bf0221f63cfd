//! Materialization layer shared by every stage.
//!
//! Three entry points realize a pipeline, and all three produce the same
//! elements in the same order:
//! - [`copy_into`]: into a caller-owned destination slice;
//! - [`to_arena_buf`]: into a new buffer accounted against an allocator;
//! - [`to_vec`]: into a managed `Vec`.
//!
//! Blocking stages reuse [`drain_into`] and [`BufCursor`] for their own
//! scratch buffers.

use flatseq_mem::{Allocator, ArenaBuf};

use crate::metrics;
use crate::traits::{Cursor, SeqError, SeqResult, Sequence};

/// Initial capacity when the upstream count is unknown.
pub const DEFAULT_CAPACITY: usize = 16;

pub fn copy_into<S: Sequence>(seq: &S, dest: &mut [S::Item]) -> SeqResult<usize> {
    // Refuse up front when the overflow is known, so nothing is half-written.
    if let Some(n) = seq.fast_count() {
        if n > dest.len() {
            return Err(SeqError::IndexOutOfRange {
                index: dest.len(),
                len: dest.len(),
            });
        }
    }

    let mut cursor = seq.cursor()?;
    let mut written = 0;
    while let Some(item) = cursor.try_advance()? {
        let Some(slot) = dest.get_mut(written) else {
            return Err(SeqError::IndexOutOfRange {
                index: written,
                len: dest.len(),
            });
        };
        *slot = item;
        written += 1;
    }
    Ok(written)
}

pub fn to_arena_buf<S: Sequence>(seq: &S, alloc: &Allocator) -> SeqResult<ArenaBuf<S::Item>> {
    let mut cursor = seq.cursor()?;
    drain_into(&mut cursor, alloc, seq.fast_count(), "to_arena_buf")
}

pub fn to_vec<S: Sequence>(seq: &S) -> SeqResult<Vec<S::Item>> {
    let mut out = Vec::with_capacity(seq.fast_count().unwrap_or(0));
    let mut cursor = seq.cursor()?;
    while let Some(item) = cursor.try_advance()? {
        out.push(item);
    }
    Ok(out)
}

/// Pull every remaining element of `cursor` into a fresh arena buffer.
pub(crate) fn drain_into<C: Cursor>(
    cursor: &mut C,
    alloc: &Allocator,
    hint: Option<usize>,
    tag: &'static str,
) -> SeqResult<ArenaBuf<C::Item>> {
    let mut buf = ArenaBuf::with_capacity(alloc, hint.unwrap_or(DEFAULT_CAPACITY), tag)?;
    while let Some(item) = cursor.try_advance()? {
        buf.push(item)?;
    }
    Ok(buf)
}

/// Hands out an owned buffer front to back and drops it on exhaustion.
pub(crate) struct BufCursor<T> {
    buf: Option<ArenaBuf<T>>,
    pos: usize,
}

impl<T: Copy> BufCursor<T> {
    pub(crate) fn empty() -> Self {
        Self { buf: None, pos: 0 }
    }

    pub(crate) fn new(buf: ArenaBuf<T>) -> Self {
        Self {
            buf: Some(buf),
            pos: 0,
        }
    }

    pub(crate) fn next(&mut self) -> Option<T> {
        let buf = self.buf.as_ref()?;
        if let Some(&item) = buf.get(self.pos) {
            self.pos += 1;
            return Some(item);
        }
        self.release();
        None
    }

    fn release(&mut self) {
        if let Some(buf) = self.buf.take() {
            metrics::stage_released(buf.tag(), buf.accounted_bytes());
        }
    }
}
