use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

static LOGGING: OnceCell<()> = OnceCell::new();

/// Install the global stderr subscriber. Later calls are no-ops.
///
/// An unparsable filter falls back to `info` rather than failing startup.
pub fn init_logging(config: &AppConfig) {
    LOGGING.get_or_init(|| {
        let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|err| {
            eprintln!("Invalid log filter '{}': {}", config.log_filter, err);
            EnvFilter::new("info")
        });

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();

        tracing::debug!(filter = %config.log_filter, "logging initialized");
    });
}
