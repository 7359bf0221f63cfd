use thiserror::Error;

/// Result type local to flatseq-mem.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("memory budget exceeded for tag '{tag}': requested {requested} bytes, capacity {capacity}, used {used}")]
    BudgetExceeded {
        tag: &'static str,
        requested: usize,
        capacity: usize,
        used: usize,
    },

    #[error("allocation failed for {bytes} bytes (tag '{tag}')")]
    AllocFailed { tag: &'static str, bytes: usize },

    #[error("capacity overflow: {elements} elements of {elem_size} bytes (tag '{tag}')")]
    CapacityOverflow {
        tag: &'static str,
        elements: usize,
        elem_size: usize,
    },
}
