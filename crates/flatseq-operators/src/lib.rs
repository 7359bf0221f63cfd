#![forbid(unsafe_code)]
//! flatseq-operators: pull-based combinators over contiguous buffers.
//!
//! Design intent:
//! - A pipeline is a static chain of value types; each stage owns its upstream.
//! - Nothing allocates until a cursor needs to buffer (group/join/sort/dedup/
//!   set ops/reverse/tail windows) or the caller materializes.
//! - All buffering goes through `flatseq-mem` (`ArenaBuf`/`RingBuf`) so the
//!   allocator cap holds and every byte is released when its cursor drops.
//! - Single-threaded and synchronous; no async, no callbacks.

pub mod boundary;
pub mod compare;
pub mod cursor;
pub mod element;
pub mod ext;
pub mod filter;
pub mod group;
pub mod join;
pub mod map;
pub mod materialize;
pub mod metrics;
pub mod set;
pub mod sort;
pub mod source;
pub mod traits;
pub mod window;

pub use compare::{
    Comparer, DefaultEq, EqualityComparer, KeyComparer, Natural, OrderingEq, Reversed, ThenBy,
};
pub use cursor::{CursorIter, Stepper};
pub use ext::SequenceExt;
pub use filter::{IndexPredicate, Negate, Predicate};
pub use group::{GroupBy, Grouping, GroupingTable, IntoGroups};
pub use join::{GroupJoinMatches, KeyMatch};
pub use materialize::{copy_into, to_arena_buf, to_vec};
pub use source::{empty, from_slice, once, SliceSeq, ToSequence};
pub use traits::{Cursor, SeqError, SeqResult, Sequence};

pub use flatseq_core::config::{Capacities, PipelineConfig};
pub use flatseq_mem::{Allocator, ArenaBuf, Growth};
