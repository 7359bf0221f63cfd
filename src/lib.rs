#![forbid(unsafe_code)]
//! flatseq: allocation-disciplined query combinators over contiguous buffers.
//!
//! Re-exports the workspace crates:
//! - [`flatseq_core`]: allocator-handle traits and `PipelineConfig`;
//! - [`flatseq_mem`]: the `Allocator` handle and accounted buffers;
//! - [`flatseq_operators`]: sequences, cursors, and every combinator.

pub use flatseq_core;
pub use flatseq_mem;
pub use flatseq_operators;

pub use flatseq_core::config::PipelineConfig;
pub use flatseq_operators::{
    empty, from_slice, once, Allocator, ArenaBuf, Cursor, SeqError, SeqResult, Sequence,
    SequenceExt, ToSequence,
};
