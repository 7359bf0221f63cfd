#![forbid(unsafe_code)]
//! flatseq-mem: hard-capped allocator handles and budget-accounted buffers.
//!
//! This crate provides the concrete implementation of the *interfaces* defined
//! in `flatseq-core::budget`. Every buffer a pipeline stage holds flows through
//! here so the cap is enforced with RAII guards and released on drop.

pub mod buf;
pub mod error;
pub mod guard;
pub mod ring;
pub mod tracking;

pub use buf::{ArenaBuf, Growth};
pub use error::{Error, Result};
pub use guard::{AllocGuard, Allocator};
pub use ring::RingBuf;
pub use tracking::PeakTracker;
