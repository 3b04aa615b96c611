//! Engine driver that runs compiled statements over a metrics batch.
//!
//! Statements run in order, each completing a full pass over the batch
//! before the next one starts. Within a pass the walk is resource groups,
//! then scopes, then metrics, then data points, all in stored order. How
//! often the editor fires depends on its [`ExecutionUnit`]:
//!
//! - `Point`: once per data point whose context satisfies the condition
//! - `Instrument`: once per metric, on the first point that satisfies it;
//!   later matching points of the same metric are not visited
//! - `Resource`: once per resource group, on the first record that satisfies it

use super::compiler::CompiledStatement;
use super::context::{Outcome, TransformContext};
use super::path::ExecutionUnit;
use crate::core::MismatchPolicy;
use crate::model::{MetricsBatch, ResourceMetrics, ScopeMetrics};
use serde::Serialize;
use tracing::{debug, trace, warn};

/// Counters for one `process` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessStats {
    /// Statements executed
    pub statements: usize,
    /// Record contexts the condition was evaluated against
    pub evaluated: usize,
    /// Contexts that satisfied the condition
    pub matched: usize,
    /// Editor invocations that changed or inspected the record
    pub applied: usize,
    /// Editor invocations that did not fit the record
    pub skipped: usize,
    /// Metrics appended by conversion functions
    pub emitted_metrics: usize,
}

/// Runs a fixed list of compiled statements against batches
#[derive(Debug)]
pub struct StatementExecutor {
    statements: Vec<CompiledStatement>,
    mismatch_policy: MismatchPolicy,
}

impl StatementExecutor {
    /// Create an executor for an already compiled statement list
    pub fn new(statements: Vec<CompiledStatement>, mismatch_policy: MismatchPolicy) -> Self {
        Self {
            statements,
            mismatch_policy,
        }
    }

    /// Compiled statements, in execution order
    pub fn statements(&self) -> &[CompiledStatement] {
        &self.statements
    }

    /// Current skip reporting policy
    pub fn mismatch_policy(&self) -> MismatchPolicy {
        self.mismatch_policy
    }

    /// Change how skipped invocations are logged
    pub fn set_mismatch_policy(&mut self, policy: MismatchPolicy) {
        self.mismatch_policy = policy;
    }

    /// Apply every statement to the batch, in place
    pub fn execute(&self, batch: &mut MetricsBatch) -> ProcessStats {
        let mut stats = ProcessStats::default();

        for (index, statement) in self.statements.iter().enumerate() {
            let before = stats;
            self.execute_statement(statement, batch, &mut stats);
            stats.statements += 1;
            trace!(
                index,
                statement = statement.source(),
                unit = ?statement.unit(),
                matched = stats.matched - before.matched,
                applied = stats.applied - before.applied,
                skipped = stats.skipped - before.skipped,
                "Statement pass complete"
            );
        }

        debug!(
            statements = stats.statements,
            evaluated = stats.evaluated,
            matched = stats.matched,
            applied = stats.applied,
            skipped = stats.skipped,
            emitted_metrics = stats.emitted_metrics,
            "Processed metrics batch"
        );
        stats
    }

    fn execute_statement(
        &self,
        statement: &CompiledStatement,
        batch: &mut MetricsBatch,
        stats: &mut ProcessStats,
    ) {
        let unit = statement.unit();

        for resource_metrics in &mut batch.resource_metrics {
            let ResourceMetrics {
                resource,
                scope_metrics,
            } = resource_metrics;
            let mut resource_done = false;

            for scope_metrics in scope_metrics {
                let ScopeMetrics { scope, metrics } = scope_metrics;
                let mut emitted = Vec::new();

                for metric in metrics.iter_mut() {
                    if resource_done {
                        break;
                    }

                    // Per-source buffer: same-named metrics never share a converted Sum
                    let mut converted = Vec::new();
                    for point in cursor(unit, metric.point_count()) {
                        let mut ctx = TransformContext::new(resource, scope, metric, point, &mut converted);
                        stats.evaluated += 1;
                        if !statement.matches(&ctx) {
                            continue;
                        }
                        stats.matched += 1;

                        match statement.editor().apply(&mut ctx) {
                            Outcome::Applied => stats.applied += 1,
                            Outcome::Skipped(reason) => {
                                stats.skipped += 1;
                                self.report_skip(statement, &ctx, reason);
                            },
                        }

                        match unit {
                            ExecutionUnit::Point => {},
                            ExecutionUnit::Instrument => break,
                            ExecutionUnit::Resource => {
                                resource_done = true;
                                break;
                            },
                        }
                    }
                    emitted.append(&mut converted);
                }

                // New metrics join the scope only after the pass over it
                stats.emitted_metrics += emitted.len();
                metrics.append(&mut emitted);

                if resource_done {
                    break;
                }
            }
        }
    }

    fn report_skip(&self, statement: &CompiledStatement, ctx: &TransformContext<'_>, reason: &str) {
        let metric = ctx.metric().name.as_str();
        let point = ctx.point_index();
        match self.mismatch_policy {
            MismatchPolicy::Silent => trace!(
                statement = statement.source(),
                metric,
                point = ?point,
                reason,
                "Skipped invocation"
            ),
            MismatchPolicy::Log => warn!(
                statement = statement.source(),
                metric,
                point = ?point,
                reason,
                "Skipped invocation"
            ),
        }
    }
}

/// Point positions to visit in a metric. Non-point units still visit a
/// metric without points once, with no point under the cursor.
fn cursor(unit: ExecutionUnit, count: usize) -> impl Iterator<Item = Option<usize>> {
    let pointless = unit != ExecutionUnit::Point && count == 0;
    (0..count).map(Some).chain(pointless.then_some(None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Attributes, Gauge, Metric, MetricData, NumberDataPoint, NumberValue, Resource, Sum, Summary,
        SummaryDataPoint,
    };
    use crate::transform::compiler::compile_statements;
    use crate::transform::functions::DEFAULT_FUNCTIONS;

    fn executor(statements: &[&str]) -> StatementExecutor {
        let compiled = compile_statements(statements, &DEFAULT_FUNCTIONS).unwrap();
        StatementExecutor::new(compiled, MismatchPolicy::Silent)
    }

    fn gauge(name: &str, points: usize) -> Metric {
        let data_points = (0..points)
            .map(|i| NumberDataPoint {
                attributes: [("index", i as i64)].into_iter().collect(),
                value: Some(NumberValue::Int(i as i64)),
                ..Default::default()
            })
            .collect();
        Metric::new(name, MetricData::Gauge(Gauge { data_points }))
    }

    fn batch(groups: Vec<Vec<Metric>>) -> MetricsBatch {
        MetricsBatch {
            resource_metrics: groups
                .into_iter()
                .map(|metrics| ResourceMetrics {
                    resource: Resource {
                        attributes: Attributes::new(),
                    },
                    scope_metrics: vec![ScopeMetrics {
                        metrics,
                        ..Default::default()
                    }],
                })
                .collect(),
        }
    }

    #[test]
    fn test_cursor_positions() {
        assert_eq!(cursor(ExecutionUnit::Point, 2).collect::<Vec<_>>(), vec![Some(0), Some(1)]);
        assert_eq!(cursor(ExecutionUnit::Point, 0).count(), 0);
        assert_eq!(cursor(ExecutionUnit::Instrument, 0).collect::<Vec<_>>(), vec![None]);
    }

    #[test]
    fn test_point_unit_fires_per_point() {
        let exec = executor(&[r#"set(attributes["seen"], true)"#]);
        let mut batch = batch(vec![vec![gauge("a", 3), gauge("b", 0)]]);

        let stats = exec.execute(&mut batch);
        assert_eq!(stats.evaluated, 3);
        assert_eq!(stats.applied, 3);
    }

    #[test]
    fn test_instrument_unit_fires_once() {
        let exec = executor(&[r#"set(metric.description, "x") where attributes["index"] != 0"#]);
        let mut batch = batch(vec![vec![gauge("a", 3), gauge("b", 0)]]);

        let stats = exec.execute(&mut batch);
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.applied, 2);
        let metrics = &batch.resource_metrics[0].scope_metrics[0].metrics;
        assert_eq!(metrics[0].description, "x");
        // Absent != 0 holds for a metric without points
        assert_eq!(metrics[1].description, "x");
    }

    #[test]
    fn test_instrument_unit_reads_first_matching_point() {
        let exec = executor(&[r#"set(metric.description, attributes["tag"]) where attributes["index"] != 0"#]);
        let mut metric = gauge("a", 3);
        for i in 0..3 {
            if let Some(attributes) = metric.point_attributes_mut(i) {
                attributes.insert("tag", format!("point-{}", i));
            }
        }
        let mut batch = batch(vec![vec![metric]]);

        let stats = exec.execute(&mut batch);
        assert_eq!(stats.evaluated, 2);
        assert_eq!(stats.applied, 1);
        assert_eq!(batch.resource_metrics[0].scope_metrics[0].metrics[0].description, "point-1");
    }

    #[test]
    fn test_same_named_summaries_convert_separately() {
        let summary = |unit: &str, sum: f64| {
            let mut metric = Metric::new(
                "latency",
                MetricData::Summary(Summary {
                    data_points: vec![SummaryDataPoint {
                        count: 1,
                        sum,
                        ..Default::default()
                    }],
                }),
            );
            metric.unit = unit.to_string();
            metric
        };
        let exec = executor(&[r#"convert_summary_sum_val_to_sum("delta", false)"#]);
        let mut batch = batch(vec![vec![summary("ms", 1.0), summary("s", 2.0)]]);

        let stats = exec.execute(&mut batch);
        assert_eq!(stats.emitted_metrics, 2);

        let metrics = &batch.resource_metrics[0].scope_metrics[0].metrics;
        assert_eq!(metrics.len(), 4);
        for (metric, unit) in metrics[2..].iter().zip(["ms", "s"]) {
            assert_eq!(metric.name, "latency_sum");
            assert_eq!(metric.unit, unit);
            assert_eq!(metric.point_count(), 1);
        }
    }

    #[test]
    fn test_resource_unit_fires_once_per_group() {
        let exec = executor(&[r#"set(resource.attributes["touched"], "yes")"#]);
        let mut batch = batch(vec![vec![gauge("a", 2), gauge("b", 2)], vec![], vec![gauge("c", 1)]]);

        let stats = exec.execute(&mut batch);
        assert_eq!(stats.applied, 2);
        assert!(batch.resource_metrics[0].resource.attributes.contains_key("touched"));
        assert!(!batch.resource_metrics[1].resource.attributes.contains_key("touched"));
        assert!(batch.resource_metrics[2].resource.attributes.contains_key("touched"));
    }

    #[test]
    fn test_skips_are_counted() {
        let exec = executor(&[r#"replace_pattern(attributes["index"], "0", "zero")"#]);
        let mut batch = batch(vec![vec![gauge("a", 2)]]);

        let stats = exec.execute(&mut batch);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.applied, 0);
    }

    #[test]
    fn test_emitted_metrics_visible_to_next_statement() {
        let summary = Metric::new(
            "latency",
            MetricData::Summary(Summary {
                data_points: vec![SummaryDataPoint {
                    count: 3,
                    sum: 1.5,
                    ..Default::default()
                }],
            }),
        );
        let exec = executor(&[
            r#"convert_summary_count_val_to_sum("cumulative", false)"#,
            r#"set(metric.unit, "1") where metric.type == "Sum""#,
        ]);
        let mut batch = batch(vec![vec![summary]]);

        let stats = exec.execute(&mut batch);
        assert_eq!(stats.emitted_metrics, 1);

        let metrics = &batch.resource_metrics[0].scope_metrics[0].metrics;
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[1].name, "latency_count");
        assert_eq!(metrics[1].unit, "1");
        match &metrics[1].data {
            MetricData::Sum(Sum { data_points, .. }) => {
                assert_eq!(data_points[0].value, Some(NumberValue::Int(3)));
            },
            other => panic!("Expected sum, got {:?}", other),
        }
    }
}
