#![forbid(unsafe_code)]
//! flatseq-core: contracts shared by every flatseq crate.
//!
//! - `budget`: allocator-handle traits. The concrete arena lives in `flatseq-mem`.
//! - `config`: serializable pipeline configuration (env/JSON).
//! - `error`: core error type.
//!
//! Nothing in here allocates on behalf of a pipeline.

pub mod budget;
pub mod config;
pub mod error;
pub mod prelude;
