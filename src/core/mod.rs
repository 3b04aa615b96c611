//! Error handling and configuration shared by the whole crate.

#![warn(missing_docs)]

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{Config, ConfigBuilder, LogLevel, LoggingConfig, MismatchPolicy, TransformConfig};
pub use error::{Result, TransformError};
