//! Tracing and logging setup shared by the binaries.

pub mod tracing;

pub use self::tracing::LogFormat;

/// Initialize process-wide logging using `LOG_FORMAT` (`json` or `pretty`).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    let format = std::env::var("LOG_FORMAT")
        .map(|v| LogFormat::parse(&v))
        .unwrap_or_default();
    tracing::init(format);
}
