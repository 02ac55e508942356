use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Sets the logging (tracing) level using RUST_LOG, falling back to the supplied default log settings.
pub fn setup_logging(default_log_settings: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_log_settings))
        .with(tracing_subscriber::fmt::layer())
        .init()
}

/// Like `setup_logging`, but writes through the test harness and tolerates being called repeatedly.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::registry()
        .with(env_filter("core_smap=debug,worker_smap=debug"))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

fn env_filter(default_log_settings: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_log_settings.into())
}
