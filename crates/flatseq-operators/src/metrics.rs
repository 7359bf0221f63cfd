//! Tracing hooks for blocking stages.
//!
//! Compiles to nothing unless the `tracing` feature is on; wire a subscriber
//! in the binary layer.

#[cfg(feature = "tracing")]
pub fn stage_materialized(stage: &'static str, rows: usize, bytes: usize) {
    tracing::trace!(stage, rows, bytes, "stage materialized");
}

#[cfg(not(feature = "tracing"))]
pub fn stage_materialized(_stage: &'static str, _rows: usize, _bytes: usize) { /* no-op */
}

#[cfg(feature = "tracing")]
pub fn stage_released(stage: &'static str, bytes: usize) {
    tracing::trace!(stage, bytes, "stage released scratch");
}

#[cfg(not(feature = "tracing"))]
pub fn stage_released(_stage: &'static str, _bytes: usize) { /* no-op */
}
