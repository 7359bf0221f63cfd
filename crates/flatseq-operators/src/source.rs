//! Leaf sources: borrowed contiguous buffers, plus `empty` and `once`.
//!
//! Any host collection that can lend a `&[T]` becomes a source through
//! [`ToSequence`]; that gives it the inbound capabilities every combinator
//! relies on (cursor, fast count, emptiness, bulk copy-out).

use std::marker::PhantomData;

use flatseq_mem::ArenaBuf;

use crate::traits::{Cursor, SeqError, SeqResult, Sequence};

/// A borrowed contiguous buffer of fixed-layout values.
#[derive(Debug)]
pub struct SliceSeq<'a, T> {
    data: &'a [T],
}

impl<'a, T> Clone for SliceSeq<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for SliceSeq<'a, T> {}

impl<'a, T> SliceSeq<'a, T> {
    pub fn new(data: &'a [T]) -> Self {
        Self { data }
    }

    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }
}

pub fn from_slice<T: Copy>(data: &[T]) -> SliceSeq<'_, T> {
    SliceSeq::new(data)
}

impl<'a, T: Copy> Sequence for SliceSeq<'a, T> {
    type Item = T;
    type Cursor = SliceCursor<'a, T>;

    fn name(&self) -> &'static str {
        "slice"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(SliceCursor {
            data: self.data,
            pos: 0,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        Some(self.data.len())
    }

    fn supports_random_access(&self) -> bool {
        true
    }

    fn get(&self, index: usize) -> SeqResult<T> {
        self.data
            .get(index)
            .copied()
            .ok_or(SeqError::IndexOutOfRange {
                index,
                len: self.data.len(),
            })
    }

    fn copy_to(&self, dest: &mut [T]) -> SeqResult<usize> {
        let n = self.data.len();
        let Some(head) = dest.get_mut(..n) else {
            return Err(SeqError::IndexOutOfRange {
                index: dest.len(),
                len: dest.len(),
            });
        };
        head.copy_from_slice(self.data);
        Ok(n)
    }
}

pub struct SliceCursor<'a, T> {
    data: &'a [T],
    pos: usize,
}

impl<'a, T: Copy> Cursor for SliceCursor<'a, T> {
    type Item = T;

    fn try_advance(&mut self) -> SeqResult<Option<T>> {
        let item = self.data.get(self.pos).copied();
        if item.is_some() {
            self.pos += 1;
        }
        Ok(item)
    }

    fn reset(&mut self) -> SeqResult<()> {
        self.pos = 0;
        Ok(())
    }
}

/// Borrow a host collection as a source.
pub trait ToSequence<T> {
    fn as_seq(&self) -> SliceSeq<'_, T>;
}

impl<T: Copy> ToSequence<T> for [T] {
    fn as_seq(&self) -> SliceSeq<'_, T> {
        SliceSeq::new(self)
    }
}

impl<T: Copy> ToSequence<T> for Vec<T> {
    fn as_seq(&self) -> SliceSeq<'_, T> {
        SliceSeq::new(self)
    }
}

impl<T: Copy> ToSequence<T> for ArenaBuf<T> {
    fn as_seq(&self) -> SliceSeq<'_, T> {
        SliceSeq::new(self)
    }
}

/// A sequence with no elements.
#[derive(Debug)]
pub struct Empty<T>(PhantomData<fn() -> T>);

impl<T> Clone for Empty<T> {
    fn clone(&self) -> Self {
        Empty(PhantomData)
    }
}

pub fn empty<T>() -> Empty<T> {
    Empty(PhantomData)
}

impl<T> Sequence for Empty<T> {
    type Item = T;
    type Cursor = Empty<T>;

    fn name(&self) -> &'static str {
        "empty"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(Empty(PhantomData))
    }

    fn fast_count(&self) -> Option<usize> {
        Some(0)
    }

    fn supports_random_access(&self) -> bool {
        true
    }

    fn get(&self, index: usize) -> SeqResult<T> {
        Err(SeqError::IndexOutOfRange { index, len: 0 })
    }
}

impl<T> Cursor for Empty<T> {
    type Item = T;

    fn try_advance(&mut self) -> SeqResult<Option<T>> {
        Ok(None)
    }

    fn reset(&mut self) -> SeqResult<()> {
        Ok(())
    }
}

/// A sequence of exactly one element.
#[derive(Debug, Clone, Copy)]
pub struct Once<T> {
    value: T,
}

pub fn once<T: Copy>(value: T) -> Once<T> {
    Once { value }
}

impl<T: Copy> Sequence for Once<T> {
    type Item = T;
    type Cursor = OnceCursor<T>;

    fn name(&self) -> &'static str {
        "once"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(OnceCursor {
            value: self.value,
            taken: false,
        })
    }

    fn fast_count(&self) -> Option<usize> {
        Some(1)
    }

    fn supports_random_access(&self) -> bool {
        true
    }

    fn get(&self, index: usize) -> SeqResult<T> {
        if index == 0 {
            Ok(self.value)
        } else {
            Err(SeqError::IndexOutOfRange { index, len: 1 })
        }
    }
}

pub struct OnceCursor<T> {
    value: T,
    taken: bool,
}

impl<T: Copy> Cursor for OnceCursor<T> {
    type Item = T;

    fn try_advance(&mut self) -> SeqResult<Option<T>> {
        if self.taken {
            return Ok(None);
        }
        self.taken = true;
        Ok(Some(self.value))
    }

    fn reset(&mut self) -> SeqResult<()> {
        self.taken = false;
        Ok(())
    }
}
