//! Enumeration protocol: `Sequence` + `Cursor`, and the operator error type.
//!
//! A `Sequence` is a re-enterable, value-typed description of a run of
//! elements. Calling `cursor()` twice yields two independent cursors. A
//! sequence never holds arena memory itself; only cursors derived from it may,
//! and they allocate lazily on the first `try_advance`.
//!
//! Disposal is `Drop`: a cursor releases every byte it acquired when it goes
//! out of scope, whether it was exhausted, abandoned early, or failed.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeqError {
    #[error("unsupported operation '{op}' on {stage}")]
    Unsupported {
        op: &'static str,
        stage: &'static str,
    },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("'{op}' requires at least one element")]
    Empty { op: &'static str },

    #[error(transparent)]
    Alloc(#[from] flatseq_mem::Error),
}

impl SeqError {
    pub fn unsupported(op: &'static str, stage: &'static str) -> Self {
        SeqError::Unsupported { op, stage }
    }
}

pub type SeqResult<T> = std::result::Result<T, SeqError>;

/// Single-pass, forward-only iteration state.
///
/// `try_advance` is the canonical fused fetch-and-advance primitive: it moves
/// to the next element and hands it out, or returns `Ok(None)` once exhausted.
/// After `Ok(None)` every further call returns `Ok(None)` again. After an
/// error the cursor must not be relied on; drop it.
///
/// The split `advance()`/`current()` protocol is derived from this one by
/// [`Stepper`](crate::cursor::Stepper), so the two can never disagree on
/// where the sequence ends.
pub trait Cursor {
    type Item;

    fn try_advance(&mut self) -> SeqResult<Option<Self::Item>>;

    /// Rewind to the first element. Only cursors over re-readable storage
    /// support this; everything else is one-shot.
    fn reset(&mut self) -> SeqResult<()> {
        Err(SeqError::unsupported("reset", std::any::type_name::<Self>()))
    }
}

/// Capability bundle every source and every combinator exposes.
///
/// Invariants:
/// - `cursor()` never acquires arena memory; stages that buffer do so on the
///   first `try_advance` of the cursor.
/// - `fast_count` returns `Some` only when the exact count is known without
///   enumerating.
/// - `get` is only meaningful when `supports_random_access()` is true;
///   otherwise it fails with `Unsupported`.
pub trait Sequence: Clone {
    type Item;
    type Cursor: Cursor<Item = Self::Item>;

    /// Stable stage name used in errors and traces.
    fn name(&self) -> &'static str;

    /// Begin an iteration.
    fn cursor(&self) -> SeqResult<Self::Cursor>;

    /// Exact element count when cheaply known.
    fn fast_count(&self) -> Option<usize> {
        None
    }

    /// Whether at least one element would be produced.
    fn is_non_empty(&self) -> SeqResult<bool> {
        if let Some(n) = self.fast_count() {
            return Ok(n > 0);
        }
        Ok(self.cursor()?.try_advance()?.is_some())
    }

    fn supports_random_access(&self) -> bool {
        false
    }

    /// Random access by position.
    fn get(&self, index: usize) -> SeqResult<Self::Item> {
        let _ = index;
        Err(SeqError::unsupported("get", self.name()))
    }

    /// Bulk copy-out into a caller-owned destination. Returns the number of
    /// elements written. A destination that is too short is an
    /// `IndexOutOfRange` failure.
    fn copy_to(&self, dest: &mut [Self::Item]) -> SeqResult<usize> {
        crate::materialize::copy_into(self, dest)
    }
}

/// Normalize a signed element count: negatives mean zero.
pub(crate) fn clamp_count(n: isize) -> usize {
    usize::try_from(n).unwrap_or(0)
}
