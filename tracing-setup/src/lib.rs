//! Process-wide logging setup. Installed once at startup and treated as
//! read-only for the rest of the process's life.
use tracing_subscriber::{fmt, EnvFilter};

/// Installs a global `tracing` subscriber that writes structured,
/// timestamped log lines to stderr, filtered by `log_filter` (a standard
/// `tracing_subscriber::EnvFilter` directive string, e.g.
/// `"warn,gophermart=debug"`).
///
/// Panics if a subscriber has already been installed for this process.
pub fn initialize(log_filter: &str) {
    let env_filter = EnvFilter::try_new(log_filter)
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(env_filter)
        .with_timer(fmt::time::ChronoUtc::rfc3339())
        .init();
}
