//! Incremental settlement: direct cancellation, rerouting, residuals.

pub mod engine;
