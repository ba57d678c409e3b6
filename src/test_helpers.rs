//! Shared setup for unit tests.

/// Route `log` output of the crate to the test harness. Only produces output
/// with the `log` feature and `RUST_LOG` set.
pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
