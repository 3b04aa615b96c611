//! Statement-driven transformation of metrics.
//!
//! Statements look like `function(args) where condition`:
//!
//! ```text
//! set(attributes["env"], "prod") where resource.attributes["host.name"] == "web-1"
//! keep_keys(attributes, "route", "status")
//! convert_summary_sum_val_to_sum("delta", true) where IsMatch(metric.name, "rpc_.*")
//! ```
//!
//! A [`TransformProcessor`] compiles a statement list once and can then be
//! shared across threads to process any number of batches.

pub mod ast;
pub mod compiler;
pub mod context;
pub mod executor;
pub mod expression;
pub mod functions;
pub mod parser;
pub mod path;
pub mod value;

use crate::core::{Config, MismatchPolicy, Result};
use crate::model::MetricsBatch;
use tracing::debug;

pub use compiler::{compile_statement, compile_statements, CompiledStatement};
pub use context::{Outcome, TransformContext};
pub use executor::{ProcessStats, StatementExecutor};
pub use functions::{Function, FunctionRegistry, DEFAULT_FUNCTIONS};
pub use parser::parse_statement;
pub use path::{ExecutionUnit, Path};
pub use value::Value;

/// High-level transform API
#[derive(Debug)]
pub struct TransformProcessor {
    executor: StatementExecutor,
}

impl TransformProcessor {
    /// Compile statements against a function registry.
    ///
    /// Fails on the first statement that does not compile; nothing is
    /// activated in that case.
    pub fn new<S: AsRef<str>>(statements: &[S], registry: &FunctionRegistry) -> Result<Self> {
        let compiled = compile_statements(statements, registry)?;
        debug!(statements = compiled.len(), "Compiled metric statements");
        Ok(Self {
            executor: StatementExecutor::new(compiled, MismatchPolicy::default()),
        })
    }

    /// Build from configuration with the default function set
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let processor = Self::new(&config.transform.metric_statements, &DEFAULT_FUNCTIONS)?;
        Ok(processor.with_mismatch_policy(config.transform.mismatch_policy))
    }

    /// Log skipped invocations according to `policy`
    pub fn with_mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.executor.set_mismatch_policy(policy);
        self
    }

    /// Apply every statement to the batch in place
    pub fn process(&self, batch: &mut MetricsBatch) -> ProcessStats {
        self.executor.execute(batch)
    }

    /// Compiled statements, in execution order
    pub fn statements(&self) -> &[CompiledStatement] {
        self.executor.statements()
    }

    /// Number of statements
    pub fn len(&self) -> usize {
        self.statements().len()
    }

    /// True when no statements were configured
    pub fn is_empty(&self) -> bool {
        self.statements().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConfigBuilder, TransformError};

    #[test]
    fn test_processor_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TransformProcessor>();
    }

    #[test]
    fn test_from_config() {
        let config = ConfigBuilder::new()
            .statement(r#"set(metric.unit, "ms")"#)
            .mismatch_policy(MismatchPolicy::Log)
            .build()
            .unwrap();

        let processor = TransformProcessor::from_config(&config).unwrap();
        assert_eq!(processor.len(), 1);
        assert_eq!(processor.executor.mismatch_policy(), MismatchPolicy::Log);
    }

    #[test]
    fn test_rejects_whole_list() {
        let statements = vec![r#"set(metric.unit, "ms")"#.to_string(), "bogus".to_string()];
        let err = TransformProcessor::new(&statements, &DEFAULT_FUNCTIONS).unwrap_err();
        assert!(matches!(err, TransformError::Statement { index: 1, .. }));
    }

    #[test]
    fn test_empty_processor_leaves_batch_alone() {
        let processor = TransformProcessor::new::<&str>(&[], &DEFAULT_FUNCTIONS).unwrap();
        let mut batch = MetricsBatch::default();
        let stats = processor.process(&mut batch);
        assert!(processor.is_empty());
        assert_eq!(stats, ProcessStats::default());
    }
}
