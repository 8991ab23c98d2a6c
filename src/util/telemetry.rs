//! Tracing setup for the simulation driver and tests.

/// Install the default `RUST_LOG`-filtered fmt subscriber, once.
///
/// A no-op when a subscriber is already in place, so embedding callers keep
/// whatever logging they configured.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
