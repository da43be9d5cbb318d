use tracing_subscriber::EnvFilter;

/// `LISK_LOG_LEVEL` (trace|debug|info|warn|error) sets the default filter;
/// `RUST_LOG` still wins if set, matching `tracing_subscriber`'s own
/// precedence so operators can override per-module without a code change.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
