//! Common test utilities and fixtures.

#![allow(dead_code)]

use chrono::{Duration, TimeZone, Utc};
use otel_transform::model::{
    unix_nanos, Attributes, Buckets, ExponentialHistogram, ExponentialHistogramDataPoint,
    Histogram, HistogramDataPoint, Metric, MetricData, MetricsBatch, NumberDataPoint,
    NumberValue, Resource, ResourceMetrics, ScopeMetrics, Sum, Summary, SummaryDataPoint,
    ValueAtQuantile,
};
use otel_transform::transform::{TransformProcessor, DEFAULT_FUNCTIONS};

/// Start timestamp shared by every fixture point: 2020-02-11T20:26:12.000000321Z
pub fn start_timestamp() -> u64 {
    let start = Utc.with_ymd_and_hms(2020, 2, 11, 20, 26, 12).unwrap() + Duration::nanoseconds(321);
    unix_nanos(start)
}

/// Attribute set carried by every fixture point
pub fn point_attributes() -> Attributes {
    [("attr1", "test1"), ("attr2", "test2"), ("attr3", "test3")]
        .into_iter()
        .collect()
}

/// One resource (`host.name=myhost`) with one scope holding, in order:
/// operationA (Sum), operationB (Histogram), operationC
/// (ExponentialHistogram) and operationD (Summary).
pub fn construct_metrics() -> MetricsBatch {
    MetricsBatch {
        resource_metrics: vec![ResourceMetrics {
            resource: Resource {
                attributes: [("host.name", "myhost")].into_iter().collect(),
            },
            scope_metrics: vec![ScopeMetrics {
                metrics: vec![
                    metric_one(),
                    metric_two(),
                    metric_three(),
                    metric_four(),
                ],
                ..Default::default()
            }],
        }],
    }
}

fn described(name: &str, data: MetricData) -> Metric {
    let mut metric = Metric::new(name, data);
    metric.description = format!("{} description", name);
    metric.unit = format!("{} unit", name);
    metric
}

pub fn metric_one() -> Metric {
    let dp0 = NumberDataPoint {
        attributes: point_attributes(),
        start_time_unix_nano: start_timestamp(),
        value: Some(NumberValue::Double(1.0)),
        ..Default::default()
    };
    let dp1 = NumberDataPoint {
        attributes: point_attributes(),
        start_time_unix_nano: start_timestamp(),
        ..Default::default()
    };
    described(
        "operationA",
        MetricData::Sum(Sum {
            data_points: vec![dp0, dp1],
            ..Default::default()
        }),
    )
}

pub fn metric_two() -> Metric {
    let dp0 = HistogramDataPoint {
        attributes: point_attributes(),
        start_time_unix_nano: start_timestamp(),
        count: 1,
        ..Default::default()
    };
    let dp1 = HistogramDataPoint {
        attributes: point_attributes(),
        start_time_unix_nano: start_timestamp(),
        ..Default::default()
    };
    described(
        "operationB",
        MetricData::Histogram(Histogram {
            data_points: vec![dp0, dp1],
            ..Default::default()
        }),
    )
}

pub fn metric_three() -> Metric {
    let dp0 = ExponentialHistogramDataPoint {
        attributes: point_attributes(),
        start_time_unix_nano: start_timestamp(),
        count: 1,
        scale: 1,
        zero_count: 1,
        positive: Buckets {
            offset: 1,
            ..Default::default()
        },
        negative: Buckets {
            offset: 1,
            ..Default::default()
        },
        ..Default::default()
    };
    let dp1 = ExponentialHistogramDataPoint {
        attributes: point_attributes(),
        start_time_unix_nano: start_timestamp(),
        ..Default::default()
    };
    described(
        "operationC",
        MetricData::ExponentialHistogram(ExponentialHistogram {
            data_points: vec![dp0, dp1],
            ..Default::default()
        }),
    )
}

pub fn metric_four() -> Metric {
    let dp0 = SummaryDataPoint {
        attributes: point_attributes(),
        start_time_unix_nano: start_timestamp(),
        time_unix_nano: start_timestamp(),
        count: 1234,
        sum: 12.34,
        quantile_values: vec![
            ValueAtQuantile {
                quantile: 0.99,
                value: 123.0,
            },
            ValueAtQuantile {
                quantile: 0.95,
                value: 321.0,
            },
        ],
    };
    described(
        "operationD",
        MetricData::Summary(Summary {
            data_points: vec![dp0],
        }),
    )
}

/// Compile `statements`, run them over a fresh fixture batch and return it
pub fn run(statements: &[&str]) -> MetricsBatch {
    let processor = TransformProcessor::new(statements, &DEFAULT_FUNCTIONS).unwrap();
    let mut batch = construct_metrics();
    processor.process(&mut batch);
    batch
}

/// Metrics of the single fixture scope
pub fn metrics(batch: &MetricsBatch) -> &Vec<Metric> {
    &batch.resource_metrics[0].scope_metrics[0].metrics
}

pub fn metrics_mut(batch: &mut MetricsBatch) -> &mut Vec<Metric> {
    &mut batch.resource_metrics[0].scope_metrics[0].metrics
}

/// Attributes of point `point` of metric `metric` in the fixture scope
pub fn point_attributes_mut(batch: &mut MetricsBatch, metric: usize, point: usize) -> &mut Attributes {
    metrics_mut(batch)[metric].point_attributes_mut(point).unwrap()
}

/// Apply `f` to the attributes of every point of every fixture metric
pub fn for_each_point(batch: &mut MetricsBatch, mut f: impl FnMut(&mut Attributes)) {
    for metric in metrics_mut(batch) {
        for index in 0..metric.point_count() {
            if let Some(attributes) = metric.point_attributes_mut(index) {
                f(attributes);
            }
        }
    }
}

/// Macro for asserting a statement list turns the fixture into the expected batch.
#[macro_export]
macro_rules! assert_transform {
    ([$($statement:expr),+ $(,)?], |$expected:ident| $want:block) => {{
        let actual = common::run(&[$($statement),+]);
        let mut $expected = common::construct_metrics();
        $want
        pretty_assertions::assert_eq!($expected, actual);
    }};
}
