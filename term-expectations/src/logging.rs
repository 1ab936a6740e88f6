//! Logging configuration for expectation evaluation.
//!
//! Evaluation emits `tracing` spans and events from the validator. Result
//! formatting and aggregation never log. [`LogConfig`] controls how much detail
//! the validator adds, and [`setup`] wires a `tracing-subscriber` registry for
//! applications that do not bring their own.

use tracing::Level;

/// Controls what the validator logs while evaluating expectations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Base log level for validator events
    pub base_level: Level,
    /// Whether to log per-expectation evaluation details (counts, timing)
    pub log_expectation_details: bool,
    /// Whether to log a sample of unexpected values
    pub log_unexpected_values: bool,
    /// Maximum length for logged field values
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_expectation_details: false,
            log_unexpected_values: false,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Logs everything, with long value renderings.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_expectation_details: true,
            log_unexpected_values: true,
            max_field_length: 1024,
        }
    }

    /// Warnings only. Unexpected values are never logged.
    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_expectation_details: false,
            log_unexpected_values: false,
            max_field_length: 128,
        }
    }

    /// Expectation details without value samples.
    pub fn balanced() -> Self {
        Self {
            log_expectation_details: true,
            ..Self::default()
        }
    }

    /// Sets the base level.
    pub fn with_base_level(mut self, level: Level) -> Self {
        self.base_level = level;
        self
    }

    /// Enables or disables unexpected value samples.
    pub fn with_unexpected_values(mut self, enabled: bool) -> Self {
        self.log_unexpected_values = enabled;
        self
    }
}

/// Debug logging that is skipped entirely when the base level is above DEBUG.
#[macro_export]
macro_rules! perf_debug {
    ($config:expr, $($arg:tt)*) => {
        if $config.base_level >= tracing::Level::DEBUG {
            tracing::debug!($($arg)*);
        }
    };
}

/// Debug logging gated by [`LogConfig::log_expectation_details`].
#[macro_export]
macro_rules! log_expectation {
    ($config:expr, $($arg:tt)*) => {
        if $config.log_expectation_details {
            tracing::debug!($($arg)*);
        }
    };
}

/// Truncates a rendered value to at most `max_length` bytes, on a character
/// boundary.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        return value.to_string();
    }
    let mut end = max_length;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...(truncated)", &value[..end])
}

/// Subscriber setup for applications and tests.
pub mod setup {
    use crate::error::{Result, TermError};
    use tracing::Level;

    /// Configuration for installing a global subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for everything outside this crate
        pub level: Level,
        /// Log level for `term_expectations`
        pub crate_level: Level,
        /// Emit JSON lines instead of human-readable output
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                crate_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        /// JSON output, warnings from dependencies, info from this crate.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                crate_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        /// Human-readable debug output.
        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                crate_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_crate_level(mut self, level: Level) -> Self {
            self.crate_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter directive.
        pub fn env_filter(&self) -> String {
            match &self.env_filter {
                Some(filter) => filter.clone(),
                None => format!(
                    "{},term_expectations={}",
                    self.level.as_str().to_lowercase(),
                    self.crate_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs a global subscriber. `RUST_LOG` takes precedence over the
    /// configured filter.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use term_expectations::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    ///
    /// # Errors
    ///
    /// `Configuration` when the filter does not parse or a global subscriber is
    /// already installed.
    pub fn init_logging(config: LoggingConfig) -> Result<()> {
        use tracing_subscriber::{
            layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
        };

        let env_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(config.env_filter()).map_err(|e| {
                TermError::Configuration(format!("invalid log filter: {e}"))
            })?,
        };

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TermError::Configuration(format!("failed to install subscriber: {e}")))
    }
}
