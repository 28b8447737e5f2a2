//! Log output for hosts and tests.

/// Install the default `tracing` formatter on stdout.
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_logging() {
    if tracing_subscriber::fmt::try_init().is_ok() {
        tracing::debug!("logging initialized");
    }
}
