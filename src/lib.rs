//! otel-transform - statement-driven transformation of OpenTelemetry metrics.
//!
//! A small statement language selects and rewrites metric records. Each
//! statement names an editor function and an optional `where` condition:
//!
//! ```text
//! set(attributes["env"], "prod") where metric.name == "http.server.duration"
//! delete_matching_keys(attributes, "^internal\\.")
//! convert_summary_count_val_to_sum("delta", true) where metric.type == "Summary"
//! ```
//!
//! # Architecture
//!
//! - `model`: resource → scope → metric → data point telemetry model
//! - `transform`: parser, compiler, function library and execution engine
//! - `core`: errors and configuration
//! - `cli`: command-line interface
//!
//! # Example
//!
//! ```no_run
//! use otel_transform::model::MetricsBatch;
//! use otel_transform::transform::{TransformProcessor, DEFAULT_FUNCTIONS};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let processor = TransformProcessor::new(
//!         &[r#"set(metric.unit, "ms") where metric.name == "latency""#],
//!         &DEFAULT_FUNCTIONS,
//!     )?;
//!
//!     let mut batch: MetricsBatch = serde_json::from_str(r#"{"resource_metrics": []}"#)?;
//!     let stats = processor.process(&mut batch);
//!     println!("applied {} edits", stats.applied);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
pub mod core;
pub mod model;
pub mod transform;

// Re-export core types for convenience
pub use crate::core::{Config, Result, TransformError};
pub use crate::model::MetricsBatch;
pub use crate::transform::{ProcessStats, TransformProcessor};
