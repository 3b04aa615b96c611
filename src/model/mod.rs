//! In-memory OpenTelemetry metrics data model.
//!
//! A [`MetricsBatch`] is owned by the caller and mutated in place by the
//! transform processor. Every type is serde-serializable so batches can be
//! read from and written to JSON by the CLI.

pub mod attributes;
pub mod types;

pub use attributes::{AttributeValue, Attributes, KeyValue};
pub use types::{
    unix_nanos, AggregationTemporality, Buckets, ExponentialHistogram,
    ExponentialHistogramDataPoint, Gauge, Histogram, HistogramDataPoint, InstrumentationScope,
    Metric, MetricData, MetricKind, MetricsBatch, NumberDataPoint, NumberValue, Resource,
    ResourceMetrics, ScopeMetrics, Sum, Summary, SummaryDataPoint, ValueAtQuantile,
};
