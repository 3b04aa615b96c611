//! Resource → scope → metric → data point hierarchy.

use super::Attributes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Batch of metrics handed to the processor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsBatch {
    /// One group per producing resource
    pub resource_metrics: Vec<ResourceMetrics>,
}

/// Metrics produced by one resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetrics {
    /// Producing entity
    #[serde(default)]
    pub resource: Resource,
    /// Metrics grouped by instrumentation scope
    #[serde(default)]
    pub scope_metrics: Vec<ScopeMetrics>,
}

/// Entity producing telemetry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource attributes such as `host.name`
    #[serde(default)]
    pub attributes: Attributes,
}

/// Metrics produced by one instrumentation scope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScopeMetrics {
    /// Recording library
    #[serde(default)]
    pub scope: InstrumentationScope,
    /// Instruments in stored order
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

/// Library or component that recorded the metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentationScope {
    /// Scope name
    #[serde(default)]
    pub name: String,
    /// Scope version, empty if unknown
    #[serde(default)]
    pub version: String,
}

/// A named instrument and its data points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Instrument name. Not unique within a scope.
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Unit of measure
    #[serde(default)]
    pub unit: String,
    /// Kind and data points
    pub data: MetricData,
}

/// Kind-specific metric payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricData {
    /// Summed counter
    Sum(Sum),
    /// Last-value instrument
    Gauge(Gauge),
    /// Explicit-bucket histogram
    Histogram(Histogram),
    /// Base-2 exponential histogram
    ExponentialHistogram(ExponentialHistogram),
    /// Precomputed quantiles
    Summary(Summary),
}

/// Instrument kind, without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MetricKind {
    Sum,
    Gauge,
    Histogram,
    ExponentialHistogram,
    Summary,
}

impl MetricKind {
    /// Name used by `metric.type`
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Sum => "Sum",
            MetricKind::Gauge => "Gauge",
            MetricKind::Histogram => "Histogram",
            MetricKind::ExponentialHistogram => "ExponentialHistogram",
            MetricKind::Summary => "Summary",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether values are cumulative or reset each interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationTemporality {
    /// Not set by the producer
    #[default]
    Unspecified,
    /// Each point covers only its own interval
    Delta,
    /// Each point accumulates from a fixed start time
    Cumulative,
}

impl AggregationTemporality {
    /// Numeric form used in statements (0, 1, 2)
    pub fn as_i64(self) -> i64 {
        match self {
            AggregationTemporality::Unspecified => 0,
            AggregationTemporality::Delta => 1,
            AggregationTemporality::Cumulative => 2,
        }
    }

    /// Inverse of [`as_i64`](Self::as_i64)
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(AggregationTemporality::Unspecified),
            1 => Some(AggregationTemporality::Delta),
            2 => Some(AggregationTemporality::Cumulative),
            _ => None,
        }
    }

    /// Parse `"delta"` or `"cumulative"`, ignoring case
    pub fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("delta") {
            Some(AggregationTemporality::Delta)
        } else if name.eq_ignore_ascii_case("cumulative") {
            Some(AggregationTemporality::Cumulative)
        } else {
            None
        }
    }
}

/// Sum payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sum {
    /// Delta or cumulative
    #[serde(default)]
    pub aggregation_temporality: AggregationTemporality,
    /// True when the sum never decreases
    #[serde(default)]
    pub is_monotonic: bool,
    /// Points in stored order
    #[serde(default)]
    pub data_points: Vec<NumberDataPoint>,
}

/// Gauge payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    /// Points in stored order
    #[serde(default)]
    pub data_points: Vec<NumberDataPoint>,
}

/// Histogram payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Delta or cumulative
    #[serde(default)]
    pub aggregation_temporality: AggregationTemporality,
    /// Points in stored order
    #[serde(default)]
    pub data_points: Vec<HistogramDataPoint>,
}

/// Exponential histogram payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExponentialHistogram {
    /// Delta or cumulative
    #[serde(default)]
    pub aggregation_temporality: AggregationTemporality,
    /// Points in stored order
    #[serde(default)]
    pub data_points: Vec<ExponentialHistogramDataPoint>,
}

/// Summary payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Points in stored order
    #[serde(default)]
    pub data_points: Vec<SummaryDataPoint>,
}

/// Scalar value of a Sum or Gauge point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberValue {
    /// Integer value, read by `value_int`
    Int(i64),
    /// Floating point value, read by `value_double`
    Double(f64),
}

/// Sum or Gauge point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberDataPoint {
    /// Point attributes
    #[serde(default)]
    pub attributes: Attributes,
    /// Interval start, nanoseconds since the Unix epoch
    #[serde(default)]
    pub start_time_unix_nano: u64,
    /// Observation time, nanoseconds since the Unix epoch
    #[serde(default)]
    pub time_unix_nano: u64,
    /// `None` when the producer never set a value
    #[serde(default)]
    pub value: Option<NumberValue>,
}

/// Explicit-bucket histogram point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistogramDataPoint {
    /// Point attributes
    #[serde(default)]
    pub attributes: Attributes,
    /// Interval start, nanoseconds since the Unix epoch
    #[serde(default)]
    pub start_time_unix_nano: u64,
    /// Observation time, nanoseconds since the Unix epoch
    #[serde(default)]
    pub time_unix_nano: u64,
    /// Number of recorded values
    #[serde(default)]
    pub count: u64,
    /// Sum of recorded values, if known
    #[serde(default)]
    pub sum: Option<f64>,
    /// One count per bucket, `explicit_bounds.len() + 1` entries
    #[serde(default)]
    pub bucket_counts: Vec<u64>,
    /// Upper bucket bounds
    #[serde(default)]
    pub explicit_bounds: Vec<f64>,
    #[serde(default)]
    #[allow(missing_docs)]
    pub min: Option<f64>,
    #[serde(default)]
    #[allow(missing_docs)]
    pub max: Option<f64>,
}

/// Exponential histogram point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExponentialHistogramDataPoint {
    /// Point attributes
    #[serde(default)]
    pub attributes: Attributes,
    /// Interval start, nanoseconds since the Unix epoch
    #[serde(default)]
    pub start_time_unix_nano: u64,
    /// Observation time, nanoseconds since the Unix epoch
    #[serde(default)]
    pub time_unix_nano: u64,
    /// Number of recorded values
    #[serde(default)]
    pub count: u64,
    /// Sum of recorded values, if known
    #[serde(default)]
    pub sum: Option<f64>,
    /// Bucket resolution; bucket bounds grow by `2^(2^-scale)`
    #[serde(default)]
    pub scale: i32,
    /// Values that fell into the zero bucket
    #[serde(default)]
    pub zero_count: u64,
    /// Buckets for positive values
    #[serde(default)]
    pub positive: Buckets,
    /// Buckets for negative values
    #[serde(default)]
    pub negative: Buckets,
}

/// Exponential histogram bucket range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Buckets {
    /// Index of the first bucket
    #[serde(default)]
    pub offset: i32,
    /// Consecutive bucket counts from `offset`
    #[serde(default)]
    pub bucket_counts: Vec<u64>,
}

/// Summary point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryDataPoint {
    /// Point attributes
    #[serde(default)]
    pub attributes: Attributes,
    /// Interval start, nanoseconds since the Unix epoch
    #[serde(default)]
    pub start_time_unix_nano: u64,
    /// Observation time, nanoseconds since the Unix epoch
    #[serde(default)]
    pub time_unix_nano: u64,
    /// Number of recorded values
    #[serde(default)]
    pub count: u64,
    /// Sum of recorded values
    #[serde(default)]
    pub sum: f64,
    /// Quantile snapshot
    #[serde(default)]
    pub quantile_values: Vec<ValueAtQuantile>,
}

/// One quantile of a summary point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueAtQuantile {
    /// Quantile in `[0.0, 1.0]`
    pub quantile: f64,
    /// Value at that quantile
    pub value: f64,
}

impl Metric {
    /// Create a metric with empty description and unit
    pub fn new<S: Into<String>>(name: S, data: MetricData) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            unit: String::new(),
            data,
        }
    }

    /// Kind of this metric
    pub fn kind(&self) -> MetricKind {
        match &self.data {
            MetricData::Sum(_) => MetricKind::Sum,
            MetricData::Gauge(_) => MetricKind::Gauge,
            MetricData::Histogram(_) => MetricKind::Histogram,
            MetricData::ExponentialHistogram(_) => MetricKind::ExponentialHistogram,
            MetricData::Summary(_) => MetricKind::Summary,
        }
    }

    /// Number of data points, whatever the kind
    pub fn point_count(&self) -> usize {
        match &self.data {
            MetricData::Sum(sum) => sum.data_points.len(),
            MetricData::Gauge(gauge) => gauge.data_points.len(),
            MetricData::Histogram(hist) => hist.data_points.len(),
            MetricData::ExponentialHistogram(hist) => hist.data_points.len(),
            MetricData::Summary(summary) => summary.data_points.len(),
        }
    }

    /// Aggregation temporality, for kinds that carry one
    pub fn aggregation_temporality(&self) -> Option<AggregationTemporality> {
        match &self.data {
            MetricData::Sum(sum) => Some(sum.aggregation_temporality),
            MetricData::Histogram(hist) => Some(hist.aggregation_temporality),
            MetricData::ExponentialHistogram(hist) => Some(hist.aggregation_temporality),
            MetricData::Gauge(_) | MetricData::Summary(_) => None,
        }
    }

    /// Mutable aggregation temporality, for kinds that carry one
    pub fn aggregation_temporality_mut(&mut self) -> Option<&mut AggregationTemporality> {
        match &mut self.data {
            MetricData::Sum(sum) => Some(&mut sum.aggregation_temporality),
            MetricData::Histogram(hist) => Some(&mut hist.aggregation_temporality),
            MetricData::ExponentialHistogram(hist) => Some(&mut hist.aggregation_temporality),
            MetricData::Gauge(_) | MetricData::Summary(_) => None,
        }
    }

    /// Attributes of the point at `index`
    pub fn point_attributes(&self, index: usize) -> Option<&Attributes> {
        match &self.data {
            MetricData::Sum(sum) => sum.data_points.get(index).map(|dp| &dp.attributes),
            MetricData::Gauge(gauge) => gauge.data_points.get(index).map(|dp| &dp.attributes),
            MetricData::Histogram(hist) => hist.data_points.get(index).map(|dp| &dp.attributes),
            MetricData::ExponentialHistogram(hist) => {
                hist.data_points.get(index).map(|dp| &dp.attributes)
            },
            MetricData::Summary(summary) => {
                summary.data_points.get(index).map(|dp| &dp.attributes)
            },
        }
    }

    /// Mutable attributes of the point at `index`
    pub fn point_attributes_mut(&mut self, index: usize) -> Option<&mut Attributes> {
        match &mut self.data {
            MetricData::Sum(sum) => sum.data_points.get_mut(index).map(|dp| &mut dp.attributes),
            MetricData::Gauge(gauge) => {
                gauge.data_points.get_mut(index).map(|dp| &mut dp.attributes)
            },
            MetricData::Histogram(hist) => {
                hist.data_points.get_mut(index).map(|dp| &mut dp.attributes)
            },
            MetricData::ExponentialHistogram(hist) => {
                hist.data_points.get_mut(index).map(|dp| &mut dp.attributes)
            },
            MetricData::Summary(summary) => {
                summary.data_points.get_mut(index).map(|dp| &mut dp.attributes)
            },
        }
    }

    /// `(start_time_unix_nano, time_unix_nano)` of the point at `index`
    pub fn point_timestamps(&self, index: usize) -> Option<(u64, u64)> {
        match &self.data {
            MetricData::Sum(sum) => sum.data_points.get(index).map(|dp| (dp.start_time_unix_nano, dp.time_unix_nano)),
            MetricData::Gauge(gauge) => gauge.data_points.get(index).map(|dp| (dp.start_time_unix_nano, dp.time_unix_nano)),
            MetricData::Histogram(hist) => hist.data_points.get(index).map(|dp| (dp.start_time_unix_nano, dp.time_unix_nano)),
            MetricData::ExponentialHistogram(hist) => hist.data_points.get(index).map(|dp| (dp.start_time_unix_nano, dp.time_unix_nano)),
            MetricData::Summary(summary) => summary.data_points.get(index).map(|dp| (dp.start_time_unix_nano, dp.time_unix_nano)),
        }
    }

    /// Mutable `(start_time_unix_nano, time_unix_nano)` of the point at `index`
    pub fn point_timestamps_mut(&mut self, index: usize) -> Option<(&mut u64, &mut u64)> {
        match &mut self.data {
            MetricData::Sum(sum) => sum.data_points.get_mut(index).map(|dp| (&mut dp.start_time_unix_nano, &mut dp.time_unix_nano)),
            MetricData::Gauge(gauge) => gauge.data_points.get_mut(index).map(|dp| (&mut dp.start_time_unix_nano, &mut dp.time_unix_nano)),
            MetricData::Histogram(hist) => hist.data_points.get_mut(index).map(|dp| (&mut dp.start_time_unix_nano, &mut dp.time_unix_nano)),
            MetricData::ExponentialHistogram(hist) => hist.data_points.get_mut(index).map(|dp| (&mut dp.start_time_unix_nano, &mut dp.time_unix_nano)),
            MetricData::Summary(summary) => summary.data_points.get_mut(index).map(|dp| (&mut dp.start_time_unix_nano, &mut dp.time_unix_nano)),
        }
    }
}

impl MetricsBatch {
    /// Total number of metrics across all resources and scopes
    pub fn metric_count(&self) -> usize {
        self.resource_metrics
            .iter()
            .flat_map(|rm| rm.scope_metrics.iter())
            .map(|sm| sm.metrics.len())
            .sum()
    }

    /// Total number of data points
    pub fn data_point_count(&self) -> usize {
        self.resource_metrics
            .iter()
            .flat_map(|rm| rm.scope_metrics.iter())
            .flat_map(|sm| sm.metrics.iter())
            .map(Metric::point_count)
            .sum()
    }
}

/// Convert a UTC timestamp to Unix nanoseconds, clamping pre-epoch times to 0
pub fn unix_nanos(time: DateTime<Utc>) -> u64 {
    time.timestamp_nanos_opt()
        .and_then(|nanos| u64::try_from(nanos).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_temporality_conversions() {
        assert_eq!(AggregationTemporality::from_i64(1), Some(AggregationTemporality::Delta));
        assert_eq!(AggregationTemporality::from_i64(7), None);
        assert_eq!(AggregationTemporality::Cumulative.as_i64(), 2);
        assert_eq!(AggregationTemporality::parse("DELTA"), Some(AggregationTemporality::Delta));
        assert_eq!(AggregationTemporality::parse("Cumulative"), Some(AggregationTemporality::Cumulative));
        assert_eq!(AggregationTemporality::parse("unspecified"), None);
    }

    #[test]
    fn test_metric_accessors() {
        let metric = Metric::new(
            "requests",
            MetricData::Histogram(Histogram {
                aggregation_temporality: AggregationTemporality::Cumulative,
                data_points: vec![HistogramDataPoint::default(), HistogramDataPoint::default()],
            }),
        );

        assert_eq!(metric.kind(), MetricKind::Histogram);
        assert_eq!(metric.kind().to_string(), "Histogram");
        assert_eq!(metric.point_count(), 2);
        assert_eq!(metric.aggregation_temporality(), Some(AggregationTemporality::Cumulative));
        assert!(metric.point_attributes(2).is_none());
    }

    #[test]
    fn test_unix_nanos() {
        let time = Utc.with_ymd_and_hms(2020, 2, 11, 20, 26, 12).unwrap();
        assert_eq!(unix_nanos(time), 1_581_452_772_000_000_000);
        let before_epoch = Utc.with_ymd_and_hms(1960, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(unix_nanos(before_epoch), 0);
    }

    #[test]
    fn test_batch_from_json() {
        let json = r#"{
            "resource_metrics": [{
                "resource": {"attributes": [{"key": "host.name", "value": "myhost"}]},
                "scope_metrics": [{
                    "metrics": [{
                        "name": "requests",
                        "data": {"sum": {"aggregation_temporality": "cumulative", "is_monotonic": true,
                                 "data_points": [{"value": {"int": 3}}]}}
                    }]
                }]
            }]
        }"#;

        let batch: MetricsBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.metric_count(), 1);
        assert_eq!(batch.data_point_count(), 1);
        match &batch.resource_metrics[0].scope_metrics[0].metrics[0].data {
            MetricData::Sum(sum) => {
                assert!(sum.is_monotonic);
                assert_eq!(sum.data_points[0].value, Some(NumberValue::Int(3)));
            },
            other => panic!("Expected sum, got {:?}", other),
        }
    }
}
