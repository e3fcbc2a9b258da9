use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, Layer};

use crate::error::{ClientError, Result};

/// Subscriber setup for binaries and tests. The library itself only emits events.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: tracing::Level,
    pub logger_name: String,
    /// When set, events are also written to an hourly rolling file in this directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            logger_name: "llama_server_client".to_string(),
            log_dir: None,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    pub fn logger_name<S: Into<String>>(mut self, logger_name: S) -> Self {
        self.logger_name = logger_name.into();
        self
    }

    pub fn log_dir<P: Into<PathBuf>>(mut self, log_dir: P) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }

    /// Installs the subscriber for the current thread until the guard is dropped.
    /// `RUST_LOG` directives are layered over the configured level.
    pub fn init(&self) -> Result<tracing::subscriber::DefaultGuard> {
        let filter = tracing_subscriber::EnvFilter::builder()
            .with_default_directive(self.level.into())
            .from_env_lossy();

        let terminal_layer = tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_writer(std::io::stderr);

        let file_layer = match &self.log_dir {
            Some(log_dir) => {
                std::fs::create_dir_all(log_dir).map_err(|e| ClientError::InvalidConfig {
                    field: "log_dir",
                    reason: format!("could not create {}: {e}", log_dir.display()),
                })?;
                let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
                    .rotation(tracing_appender::rolling::Rotation::HOURLY)
                    .max_log_files(6)
                    .filename_prefix(&self.logger_name)
                    .filename_suffix("log")
                    .build(log_dir)
                    .map_err(|e| ClientError::InvalidConfig {
                        field: "log_dir",
                        reason: e.to_string(),
                    })?;
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(file_appender)
                        .boxed(),
                )
            }
            None => None,
        };

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(terminal_layer)
            .with(file_layer);

        Ok(tracing::subscriber::set_default(subscriber))
    }
}
