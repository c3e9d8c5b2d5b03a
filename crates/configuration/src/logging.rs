use crate::error::ConfigError;
use crate::settings::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global tracing subscriber.
///
/// Console output is always on. When `settings.directory` is set, a second,
/// non-blocking layer writes to a daily rolling `meridian.log` in that directory;
/// the returned guard must be held for as long as the process wants file logs
/// flushed.
pub fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    let (file_layer, guard) = if settings.directory.is_empty() {
        (None, None)
    } else {
        let appender = tracing_appender::rolling::daily(&settings.directory, "meridian.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = fmt::layer().with_writer(writer).with_ansi(false);
        (Some(layer), Some(guard))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    tracing::debug!(filter = %settings.filter, "Tracing initialised.");
    Ok(guard)
}
