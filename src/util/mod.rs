//! Shared utilities.

/// Wall-clock helpers.
pub mod clock;
/// Tracing/telemetry setup.
pub mod telemetry;

pub use clock::now_ms;
pub use telemetry::init_tracing;
