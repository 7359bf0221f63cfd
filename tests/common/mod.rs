//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use flatseq_operators::filter::Where;
use flatseq_operators::{from_slice, Allocator, Cursor, SeqError, SeqResult, Sequence, SliceSeq};

/// Materialize a pipeline, failing the test on error.
pub fn collect<S: Sequence>(seq: &S) -> Vec<S::Item> {
    seq.cursor()
        .and_then(|mut c| {
            let mut out = Vec::new();
            while let Some(item) = c.try_advance()? {
                out.push(item);
            }
            Ok(out)
        })
        .expect("pipeline failed")
}

pub fn assert_released(alloc: &Allocator) {
    assert_eq!(alloc.used_bytes(), 0, "arena bytes leaked: {alloc:?}");
}

fn keep_all<T>(_: &T) -> bool {
    true
}

/// A slice source with its fast count and random access hidden, so stages
/// take their enumerate-and-buffer paths.
pub fn opaque<T: Copy>(data: &[T]) -> Where<SliceSeq<'_, T>, fn(&T) -> bool> {
    Where::new(from_slice(data), keep_all::<T> as fn(&T) -> bool)
}

/// Counts how often a source was opened and how many elements were pulled.
#[derive(Debug, Clone, Default)]
pub struct ProbeStats {
    opened: Rc<Cell<usize>>,
    pulled: Rc<Cell<usize>>,
}

impl ProbeStats {
    pub fn opened(&self) -> usize {
        self.opened.get()
    }

    pub fn pulled(&self) -> usize {
        self.pulled.get()
    }
}

/// Slice source that records its traffic in a shared [`ProbeStats`].
#[derive(Debug, Clone)]
pub struct Probe<'a, T> {
    data: &'a [T],
    stats: ProbeStats,
    fast_count: bool,
}

pub fn probe<T: Copy>(data: &[T]) -> (Probe<'_, T>, ProbeStats) {
    let stats = ProbeStats::default();
    let seq = Probe {
        data,
        stats: stats.clone(),
        fast_count: true,
    };
    (seq, stats)
}

/// Like [`probe`] but without a fast count.
pub fn opaque_probe<T: Copy>(data: &[T]) -> (Probe<'_, T>, ProbeStats) {
    let (mut seq, stats) = probe(data);
    seq.fast_count = false;
    (seq, stats)
}

pub struct ProbeCursor<'a, T> {
    data: &'a [T],
    pos: usize,
    stats: ProbeStats,
}

impl<'a, T: Copy> Sequence for Probe<'a, T> {
    type Item = T;
    type Cursor = ProbeCursor<'a, T>;

    fn name(&self) -> &'static str {
        "probe"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        self.stats.opened.set(self.stats.opened.get() + 1);
        Ok(ProbeCursor {
            data: self.data,
            pos: 0,
            stats: self.stats.clone(),
        })
    }

    fn fast_count(&self) -> Option<usize> {
        self.fast_count.then_some(self.data.len())
    }
}

impl<'a, T: Copy> Cursor for ProbeCursor<'a, T> {
    type Item = T;

    fn try_advance(&mut self) -> SeqResult<Option<T>> {
        let item = self.data.get(self.pos).copied();
        if item.is_some() {
            self.pos += 1;
            self.stats.pulled.set(self.stats.pulled.get() + 1);
        }
        Ok(item)
    }
}

/// Yields `data[..fail_at]` and then fails.
#[derive(Debug, Clone, Copy)]
pub struct FailAfter<'a, T> {
    data: &'a [T],
    fail_at: usize,
}

pub fn fail_after<T: Copy>(data: &[T], fail_at: usize) -> FailAfter<'_, T> {
    FailAfter { data, fail_at }
}

pub fn boom() -> SeqError {
    SeqError::unsupported("boom", "fail_after")
}

pub struct FailAfterCursor<'a, T> {
    data: &'a [T],
    fail_at: usize,
    pos: usize,
}

impl<'a, T: Copy> Sequence for FailAfter<'a, T> {
    type Item = T;
    type Cursor = FailAfterCursor<'a, T>;

    fn name(&self) -> &'static str {
        "fail_after"
    }

    fn cursor(&self) -> SeqResult<Self::Cursor> {
        Ok(FailAfterCursor {
            data: self.data,
            fail_at: self.fail_at,
            pos: 0,
        })
    }
}

impl<'a, T: Copy> Cursor for FailAfterCursor<'a, T> {
    type Item = T;

    fn try_advance(&mut self) -> SeqResult<Option<T>> {
        if self.pos == self.fail_at {
            return Err(boom());
        }
        let item = self.data.get(self.pos).copied();
        self.pos += 1;
        Ok(item)
    }
}

/// Deterministic pseudo-random values (xorshift), for property-style checks.
pub fn pseudo_random(seed: u64, len: usize, modulo: u64) -> Vec<u64> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state % modulo
        })
        .collect()
}
