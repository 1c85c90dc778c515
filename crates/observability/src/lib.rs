//! Process-wide logging setup shared by the binaries and test harnesses.

/// Install the global subscriber using `RUST_LOG` / `LOG_FORMAT`.
///
/// Safe to call multiple times; only the first call installs anything.
pub fn init() {
    tracing::init(&tracing::LogSettings::from_env());
}

/// Subscriber configuration (filter, output format).
pub mod tracing;
