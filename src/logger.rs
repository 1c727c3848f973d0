use std::result::Result;

use snafu::ResultExt;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{registry, EnvFilter, Layer};

use crate::config::Config;
use crate::error::{ApplicationError, InitializeLoggerSnafu};

/// Installs the global subscriber: a pretty console layer and a JSON file layer rolled daily.
///
/// The returned guard flushes the file layer when dropped and must be held until exit.
pub fn init(config: &Config) -> Result<WorkerGuard, ApplicationError> {
    let (file_layer, guard) = {
        let file_appender = tracing_appender::rolling::daily(&config.log_dir, "channel-growth.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let layer = layer()
            .with_ansi(false)
            .json()
            .with_writer(non_blocking)
            .with_filter(EnvFilter::new("debug"));

        (layer, guard)
    };

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let console_layer = layer()
        .pretty()
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let subscriber = registry().with(console_layer).with(file_layer);
    tracing::subscriber::set_global_default(subscriber).context(InitializeLoggerSnafu)?;

    Ok(guard)
}
