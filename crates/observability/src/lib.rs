//! Tracing and logging setup shared by every billing process.

/// Initialize process-wide logging with the default JSON output.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize process-wide logging with an explicit configuration.
pub fn init_with(config: &LogConfig) {
    tracing::init_with(config);
}

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{LogConfig, LogFormat};
