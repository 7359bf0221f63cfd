//! Ordering engine.

pub mod order;

pub use order::{OrderBy, OrderByCursor};
