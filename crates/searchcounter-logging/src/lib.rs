//! Structured logging for the search counter
//!
//! Thin setup layer over `tracing-subscriber`: library crates only emit
//! `tracing` events, and the binary installs a subscriber built here.
//!
//! # Features
//!
//! - **JSONL Output**: Structured JSON lines for log aggregation (default)
//! - **Pretty Console**: Human-readable output on stderr for the CLI
//! - **File Rotation**: Daily/hourly log rotation via tracing-appender
//! - **RUST_LOG**: Overrides the configured default level
//!
//! # Quick Start
//!
//! ```ignore
//! use searchcounter_logging::{LogConfig, SubscriberBuilder};
//!
//! // JSONL to console
//! let _guard = SubscriberBuilder::new().init()?;
//!
//! // Pretty output on stderr, as the CLI does
//! let _guard = SubscriberBuilder::new()
//!     .with_config(LogConfig::cli())
//!     .init()?;
//! ```

pub mod config;

pub use config::{ConsoleConfig, FileConfig, JsonlConfig, LogConfig, RotationStrategy};

use thiserror::Error;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Errors raised while installing the subscriber
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file appender: {0}")]
    FileAppender(String),

    #[error("A global subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

type FilteredRegistry = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<FilteredRegistry> + Send + Sync>;

/// Builder for configuring and initializing the logging subscriber
///
/// By default, console output uses JSONL format. Use `LogConfig::cli()` for
/// human-readable output on stderr.
pub struct SubscriberBuilder {
    config: LogConfig,
}

impl SubscriberBuilder {
    /// Create a new subscriber builder with default configuration
    ///
    /// Default: JSONL output to console
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    /// Use a specific configuration
    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Enable or disable console output
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    /// Configure file output
    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    /// The configuration this builder will apply
    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Build the subscriber without installing it
    ///
    /// The returned guard flushes file output when dropped; keep it alive
    /// for as long as the subscriber is in use.
    pub fn build(self) -> Result<(impl Subscriber + Send + Sync, Option<WorkerGuard>), LoggingError> {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.config.default_level));

        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut guard = None;

        if self.config.console.enabled {
            layers.push(self.console_layer());
        }

        if let Some(file_config) = &self.config.file {
            let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender(file_config)?);
            guard = Some(file_guard);

            let jsonl = &self.config.jsonl;
            let file_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(jsonl.include_spans)
                .flatten_event(jsonl.flatten_events)
                .with_file(jsonl.include_location)
                .with_line_number(jsonl.include_location)
                .with_writer(non_blocking)
                .boxed();
            layers.push(file_layer);
        }

        let subscriber = Registry::default().with(env_filter).with(layers);
        Ok((subscriber, guard))
    }

    /// Initialize the subscriber globally
    ///
    /// Returns a guard that must be kept alive for the duration of the
    /// program when file output is enabled.
    ///
    /// # Errors
    ///
    /// Fails if the log file cannot be opened or a global subscriber has
    /// already been set.
    pub fn init(self) -> Result<Option<WorkerGuard>, LoggingError> {
        let (subscriber, guard) = self.build()?;
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;
        Ok(guard)
    }

    fn console_layer(&self) -> BoxedLayer {
        let console = &self.config.console;
        let jsonl = &self.config.jsonl;

        match (console.pretty, console.stderr) {
            (true, true) => tracing_subscriber::fmt::layer()
                .with_ansi(console.ansi)
                .with_target(true)
                .with_writer(std::io::stderr)
                .boxed(),
            (true, false) => tracing_subscriber::fmt::layer()
                .with_ansi(console.ansi)
                .with_target(true)
                .boxed(),
            (false, true) => tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(jsonl.include_spans)
                .flatten_event(jsonl.flatten_events)
                .with_file(jsonl.include_location)
                .with_line_number(jsonl.include_location)
                .with_writer(std::io::stderr)
                .boxed(),
            (false, false) => tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(jsonl.include_spans)
                .flatten_event(jsonl.flatten_events)
                .with_file(jsonl.include_location)
                .with_line_number(jsonl.include_location)
                .boxed(),
        }
    }
}

impl Default for SubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn file_appender(config: &FileConfig) -> Result<RollingFileAppender, LoggingError> {
    let rotation = match config.rotation {
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
        RotationStrategy::Never => Rotation::NEVER,
    };

    RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(&config.prefix)
        .filename_suffix("log")
        .build(&config.directory)
        .map_err(|e| LoggingError::FileAppender(e.to_string()))
}
