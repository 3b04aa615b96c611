//! Configuration management for the transform processor.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - CLI argument overrides
//! - Validation and defaults

use crate::core::{Result, TransformError};
use serde::{Deserialize, Serialize};

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transform statements and evaluation behaviour
    pub transform: TransformConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Debug mode
    #[serde(skip)]
    pub debug: bool,
}

/// Transform configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Statements applied to every metrics batch, in order
    pub metric_statements: Vec<String>,
    /// How skipped invocations are reported
    pub mismatch_policy: MismatchPolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Structured logging format
    pub structured: bool,
}

/// Reporting of invocations skipped because a record did not fit the function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Count only, trace-level log
    #[default]
    Silent,
    /// Count and log at warn level
    Log,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-record detail, including silent skips
    Trace,
    /// Per-batch summaries
    Debug,
    /// Startup and lifecycle messages
    Info,
    /// Logged skips and recoverable problems
    Warn,
    /// Failures only
    Error,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            structured: false,
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (index, statement) in self.transform.metric_statements.iter().enumerate() {
            if statement.trim().is_empty() {
                return Err(TransformError::config(format!(
                    "metric_statements[{}] must not be blank",
                    index
                )));
            }
        }

        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: Config,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| TransformError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Append one statement
    pub fn statement<S: Into<String>>(mut self, statement: S) -> Self {
        self.config.transform.metric_statements.push(statement.into());
        self
    }

    /// Replace the statement list
    pub fn statements<I, S>(mut self, statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.transform.metric_statements = statements.into_iter().map(Into::into).collect();
        self
    }

    /// Set mismatch policy
    pub fn mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.config.transform.mismatch_policy = policy;
        self
    }

    /// Set log level
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set debug mode
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
