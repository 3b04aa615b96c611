//! Configuration system tests.

use otel_transform::core::{Config, ConfigBuilder, LogLevel, MismatchPolicy, TransformError};
use otel_transform::transform::TransformProcessor;
use std::io::Write;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert!(config.transform.metric_statements.is_empty());
    assert_eq!(config.transform.mismatch_policy, MismatchPolicy::Silent);
    assert_eq!(config.logging.level, LogLevel::Info);
    assert!(!config.debug);
}

#[test]
fn test_config_builder() {
    let config = ConfigBuilder::new()
        .statement(r#"set(metric.unit, "ms")"#)
        .statement(r#"keep_keys(attributes, "route")"#)
        .mismatch_policy(MismatchPolicy::Log)
        .log_level(LogLevel::Trace)
        .debug(true)
        .build()
        .unwrap();

    assert_eq!(config.transform.metric_statements.len(), 2);
    assert_eq!(config.transform.mismatch_policy, MismatchPolicy::Log);
    assert_eq!(config.logging.level, LogLevel::Trace);
    assert!(config.debug);
}

#[test]
fn test_yaml_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
transform:
  metric_statements:
    - 'set(attributes["env"], "prod") where resource.attributes["host.name"] == "myhost"'
    - 'convert_summary_sum_val_to_sum("delta", true) where metric.type == "Summary"'
  mismatch_policy: log
logging:
  level: debug
  structured: true
"#
    )
    .unwrap();

    let yaml = std::fs::read_to_string(file.path()).unwrap();
    let config = ConfigBuilder::new().from_yaml(&yaml).unwrap().build().unwrap();

    assert_eq!(config.transform.metric_statements.len(), 2);
    assert_eq!(config.transform.mismatch_policy, MismatchPolicy::Log);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert!(config.logging.structured);

    let processor = TransformProcessor::from_config(&config).unwrap();
    assert_eq!(processor.len(), 2);
}

#[test]
fn test_partial_yaml_uses_defaults() {
    let config = ConfigBuilder::new()
        .from_yaml("transform:\n  metric_statements: ['set(metric.unit, \"s\")']\n")
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(config.transform.mismatch_policy, MismatchPolicy::Silent);
    assert_eq!(config.logging.level, LogLevel::Info);
}

#[test]
fn test_invalid_config_validation() {
    let result = ConfigBuilder::new().statement("").build();
    assert!(matches!(result, Err(TransformError::Config(_))));

    let result = ConfigBuilder::new().from_yaml("transform:\n  mismatch_policy: loud\n");
    assert!(result.is_err());
}

#[test]
fn test_bad_statement_rejected_by_processor() {
    let config = ConfigBuilder::new()
        .statement(r#"set(metric.unit, "ms")"#)
        .statement(r#"set(metric.unit, "ms") where"#)
        .build()
        .unwrap();

    match TransformProcessor::from_config(&config) {
        Err(TransformError::Statement { index, .. }) => assert_eq!(index, 1),
        other => panic!("Expected statement error, got {:?}", other),
    }
}
