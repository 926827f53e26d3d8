//! tracing subscriber setup

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber.
///
/// The filter comes from the config file, not the environment. An invalid
/// directive falls back to `info`; the returned flag tells the caller so it
/// can be reported once logging works.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let (filter, valid) = match EnvFilter::try_new(&config.level) {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new("info"), false),
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
    valid
}
