//! Convenient re-exports for downstream crates.

pub use crate::budget::{BudgetGuard, MemoryBudget};
pub use crate::config::{Capacities, PipelineConfig};
pub use crate::error::{Error, Result};
