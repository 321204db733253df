//! Structured logging for colsieve scans.
//!
//! Events are emitted through `tracing` with target "colsieve" and an
//! `event` field naming what happened.
//!
//! ## Library Integration
//!
//! colsieve never installs a global subscriber. Applications configure one
//! via `tracing_subscriber` or similar, e.g. `RUST_LOG=colsieve=debug`.
//!
//! ## Conventions
//!
//! - `event`: snake_case event name (required)
//! - `component`: subsystem emitting the event ("filter", "pruning", "parquet")
//! - Use `%` for Display, `?` for Debug formatting
//! - Per-block events are `debug`; per-scan summaries are `info`

/// Target for all colsieve log events.
pub(crate) const COLSIEVE_TARGET: &str = "colsieve";

/// Macro for info-level log events.
///
/// # Example
/// ```ignore
/// log_info!(
///     component = "filter",
///     event = "scan_finished",
///     blocks_pruned = metrics.blocks_pruned,
/// );
/// ```
macro_rules! log_info {
    ($($field:tt)*) => {
        ::tracing::info!(target: $crate::observability::COLSIEVE_TARGET, $($field)*)
    };
}

/// Macro for debug-level log events.
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::observability::COLSIEVE_TARGET, $($field)*)
    };
}

/// Macro for warn-level log events.
macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::observability::COLSIEVE_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_info;
pub(crate) use log_warn;
