//! Adapters over the fused `try_advance` primitive.
//!
//! - [`Stepper`]: the classic `advance()`/`current()` protocol. `current()`
//!   borrows a single slot that is invalidated by the next `advance()`.
//! - [`CursorIter`]: `Iterator<Item = SeqResult<T>>`, fused after exhaustion
//!   or the first error.

use crate::traits::{Cursor, SeqError, SeqResult};

/// Split-protocol view of a cursor.
///
/// Both protocols share the wrapped cursor's single state machine, so
/// `advance()` returns `false` exactly where `try_advance` returns `None`.
pub struct Stepper<C: Cursor> {
    cursor: C,
    slot: Option<C::Item>,
    exhausted: bool,
}

impl<C: Cursor> Stepper<C> {
    pub fn new(cursor: C) -> Self {
        Self {
            cursor,
            slot: None,
            exhausted: false,
        }
    }

    /// Move to the next element. `Ok(false)` once the sequence is exhausted.
    pub fn advance(&mut self) -> SeqResult<bool> {
        if self.exhausted {
            return Ok(false);
        }
        match self.cursor.try_advance() {
            Ok(Some(item)) => {
                self.slot = Some(item);
                Ok(true)
            }
            Ok(None) => {
                self.slot = None;
                self.exhausted = true;
                Ok(false)
            }
            Err(e) => {
                self.slot = None;
                Err(e)
            }
        }
    }

    /// The element produced by the last successful `advance()`.
    ///
    /// Calling this before the first `advance()`, after exhaustion, or after
    /// an error is a misuse and fails with `Unsupported`.
    pub fn current(&self) -> SeqResult<&C::Item> {
        self.slot
            .as_ref()
            .ok_or(SeqError::unsupported("current", "stepper without a current element"))
    }

    pub fn reset(&mut self) -> SeqResult<()> {
        self.cursor.reset()?;
        self.slot = None;
        self.exhausted = false;
        Ok(())
    }

    pub fn into_inner(self) -> C {
        self.cursor
    }
}

/// Iterator view of a cursor.
pub struct CursorIter<C> {
    cursor: C,
    done: bool,
}

impl<C: Cursor> CursorIter<C> {
    pub fn new(cursor: C) -> Self {
        Self {
            cursor,
            done: false,
        }
    }
}

impl<C: Cursor> Iterator for CursorIter<C> {
    type Item = SeqResult<C::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.cursor.try_advance() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<C: Cursor> std::iter::FusedIterator for CursorIter<C> {}
