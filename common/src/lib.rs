pub mod config;

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber for a stage executable.
///
/// The configured log level acts as the default directive; `RUST_LOG`
/// still wins when set, so operators can raise verbosity per deployment.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
