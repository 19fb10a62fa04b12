use crate::config::Config;
use crate::constants::LOG_FILE;
use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, time::SystemTime},
    prelude::*,
    EnvFilter,
};

/// Installs the global subscriber. `RUST_LOG` takes precedence over the configured level.
pub fn setup_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("invalid log level {:?}", config.log_level))?;

    match &config.log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)
                .with_context(|| format!("failed to create log directory {:?}", log_dir))?;
            let file_appender = RollingFileAppender::new(Rotation::NEVER, log_dir, LOG_FILE);
            let file_layer = fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_timer(SystemTime)
                .with_writer(file_appender);
            let subscriber = tracing_subscriber::registry().with(filter).with(file_layer);
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set tracing subscriber")?;
            tracing::info!("Logging to {:?}", log_dir.join(LOG_FILE));
        }
        None => {
            let stderr_layer = fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            let subscriber = tracing_subscriber::registry().with(filter).with(stderr_layer);
            tracing::subscriber::set_global_default(subscriber)
                .context("Failed to set tracing subscriber")?;
        }
    }
    Ok(())
}
