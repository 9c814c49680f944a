//! Subscriber construction.

use tracing_subscriber::EnvFilter;

use crate::error::{LogError, LogResult};

/// Fluent configuration for the global tracing subscriber.
///
/// ```rust,no_run
/// use vela_log::LoggerBuilder;
///
/// LoggerBuilder::new()
///     .filter("info,vela_error=trace")
///     .json(true)
///     .try_init()
///     .expect("logger");
/// ```
#[derive(Debug, Clone)]
pub struct LoggerBuilder {
    filter: String,
    json: bool,
    ansi: bool,
    with_target: bool,
}

impl LoggerBuilder {
    /// Builder with the `info` filter, human-readable output.
    pub fn new() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
            ansi: true,
            with_target: true,
        }
    }

    /// Set the filter expression (`tracing_subscriber::EnvFilter` syntax).
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Emit newline-delimited JSON instead of human-readable lines.
    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Toggle ANSI colors (human-readable output only).
    pub fn ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Toggle the event's target in the output.
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }

    /// Install the configured subscriber globally.
    pub fn try_init(self) -> LogResult<()> {
        let filter = EnvFilter::try_new(&self.filter).map_err(|e| LogError::Filter {
            filter: self.filter.clone(),
            reason: e.to_string(),
        })?;

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(self.ansi)
            .with_target(self.with_target);

        let installed = if self.json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        installed.map_err(|e| LogError::Init(e.to_string()))
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
