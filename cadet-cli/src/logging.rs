use cadet_core::LoggingSettings;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` when set, otherwise `[logging].level`.
pub fn log_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level))
}
