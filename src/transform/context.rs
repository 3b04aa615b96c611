//! Record context: a transient view of one data point (or one instrument)
//! together with its enclosing metric, scope and resource.

use super::path::{Accessor, Path};
use super::value::Value;
use crate::model::{
    AggregationTemporality, Attributes, ExponentialHistogramDataPoint, HistogramDataPoint,
    InstrumentationScope, Metric, MetricData, NumberDataPoint, NumberValue, Resource,
    SummaryDataPoint,
};

/// Result of one editor invocation against one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The editor ran against the record
    Applied,
    /// The record did not fit the function; nothing changed
    Skipped(&'static str),
}

/// View over one record, borrowed from the batch for a single invocation.
///
/// `point` is `None` when an instrument has no data points; point-level
/// paths then read as Absent and cannot be written.
pub struct TransformContext<'a> {
    resource: &'a mut Resource,
    scope: &'a InstrumentationScope,
    metric: &'a mut Metric,
    point: Option<usize>,
    emitted: &'a mut Vec<Metric>,
}

impl<'a> TransformContext<'a> {
    /// Cursor at `point` of `metric`. New metrics go to `emitted`.
    pub fn new(
        resource: &'a mut Resource,
        scope: &'a InstrumentationScope,
        metric: &'a mut Metric,
        point: Option<usize>,
        emitted: &'a mut Vec<Metric>,
    ) -> Self {
        Self {
            resource,
            scope,
            metric,
            point,
            emitted,
        }
    }

    #[allow(missing_docs)]
    pub fn resource(&self) -> &Resource {
        self.resource
    }

    #[allow(missing_docs)]
    pub fn scope(&self) -> &InstrumentationScope {
        self.scope
    }

    #[allow(missing_docs)]
    pub fn metric(&self) -> &Metric {
        self.metric
    }

    /// Position of the point under the cursor, `None` for a metric without points
    pub fn point_index(&self) -> Option<usize> {
        self.point
    }

    /// Metrics produced on behalf of the metric under the cursor. They join
    /// the enclosing scope once the current pass over it finishes.
    pub fn emitted_mut(&mut self) -> &mut Vec<Metric> {
        self.emitted
    }

    /// Attribute map addressed by a map accessor
    pub fn attributes(&self, accessor: Accessor) -> Option<&Attributes> {
        match accessor {
            Accessor::ResourceAttributes => Some(&self.resource.attributes),
            Accessor::Attributes => self.point.and_then(|i| self.metric.point_attributes(i)),
            _ => None,
        }
    }

    /// Mutable attribute map addressed by a map accessor
    pub fn attributes_mut(&mut self, accessor: Accessor) -> Option<&mut Attributes> {
        match accessor {
            Accessor::ResourceAttributes => Some(&mut self.resource.attributes),
            Accessor::Attributes => {
                let index = self.point?;
                self.metric.point_attributes_mut(index)
            },
            _ => None,
        }
    }

    /// Read the value at `path`. Missing data reads as Absent.
    pub fn get(&self, path: &Path) -> Value {
        let accessor = path.accessor();
        match accessor {
            Accessor::ResourceAttributes | Accessor::Attributes => match path.key() {
                Some(key) => Value::from(self.attributes(accessor).and_then(|a| a.get(key))),
                None => Value::Absent,
            },
            Accessor::MetricName => Value::String(self.metric.name.clone()),
            Accessor::MetricDescription => Value::String(self.metric.description.clone()),
            Accessor::MetricUnit => Value::String(self.metric.unit.clone()),
            Accessor::MetricType => Value::from(self.metric.kind().as_str()),
            Accessor::MetricAggregationTemporality => self
                .metric
                .aggregation_temporality()
                .map_or(Value::Absent, |t| Value::Int(t.as_i64())),
            Accessor::MetricIsMonotonic => match &self.metric.data {
                MetricData::Sum(sum) => Value::Bool(sum.is_monotonic),
                _ => Value::Absent,
            },
            Accessor::StartTimeUnixNano => self
                .timestamps()
                .map_or(Value::Absent, |(start, _)| Value::from(start)),
            Accessor::TimeUnixNano => self
                .timestamps()
                .map_or(Value::Absent, |(_, time)| Value::from(time)),
            Accessor::ValueInt => match self.number_point().and_then(|dp| dp.value) {
                Some(NumberValue::Int(i)) => Value::Int(i),
                _ => Value::Absent,
            },
            Accessor::ValueDouble => match self.number_point().and_then(|dp| dp.value) {
                Some(NumberValue::Double(d)) => Value::Double(d),
                _ => Value::Absent,
            },
            Accessor::Count => {
                if let Some(dp) = self.histogram_point() {
                    Value::from(dp.count)
                } else if let Some(dp) = self.exp_histogram_point() {
                    Value::from(dp.count)
                } else if let Some(dp) = self.summary_point() {
                    Value::from(dp.count)
                } else {
                    Value::Absent
                }
            },
            Accessor::Sum => {
                if let Some(dp) = self.histogram_point() {
                    dp.sum.map_or(Value::Absent, Value::Double)
                } else if let Some(dp) = self.exp_histogram_point() {
                    dp.sum.map_or(Value::Absent, Value::Double)
                } else if let Some(dp) = self.summary_point() {
                    Value::Double(dp.sum)
                } else {
                    Value::Absent
                }
            },
            Accessor::Scale => self
                .exp_histogram_point()
                .map_or(Value::Absent, |dp| Value::Int(i64::from(dp.scale))),
            Accessor::ZeroCount => self
                .exp_histogram_point()
                .map_or(Value::Absent, |dp| Value::from(dp.zero_count)),
            Accessor::PositiveOffset => self
                .exp_histogram_point()
                .map_or(Value::Absent, |dp| Value::Int(i64::from(dp.positive.offset))),
            Accessor::NegativeOffset => self
                .exp_histogram_point()
                .map_or(Value::Absent, |dp| Value::Int(i64::from(dp.negative.offset))),
        }
    }

    /// Write `value` at `path`. Absent values and values of the wrong kind
    /// for the slot leave the record unchanged.
    pub fn set(&mut self, path: &Path, value: Value) -> Outcome {
        if value.is_absent() {
            return Outcome::Skipped("absent value");
        }

        let accessor = path.accessor();
        match accessor {
            Accessor::ResourceAttributes | Accessor::Attributes => {
                let Some(key) = path.key() else {
                    return Outcome::Skipped("whole map is not writable");
                };
                let Some(attribute) = value.into_attribute() else {
                    return Outcome::Skipped("absent value");
                };
                match self.attributes_mut(accessor) {
                    Some(attributes) => {
                        attributes.insert(key, attribute);
                        Outcome::Applied
                    },
                    None => Outcome::Skipped("no data point"),
                }
            },
            Accessor::MetricName => set_string(&mut self.metric.name, value),
            Accessor::MetricDescription => set_string(&mut self.metric.description, value),
            Accessor::MetricUnit => set_string(&mut self.metric.unit, value),
            Accessor::MetricType => Outcome::Skipped("metric.type is read-only"),
            Accessor::MetricAggregationTemporality => {
                let temporality = match &value {
                    Value::Int(i) => AggregationTemporality::from_i64(*i),
                    Value::String(s) => AggregationTemporality::parse(s),
                    _ => None,
                };
                match (temporality, self.metric.aggregation_temporality_mut()) {
                    (Some(t), Some(slot)) => {
                        *slot = t;
                        Outcome::Applied
                    },
                    (None, _) => Outcome::Skipped("invalid aggregation temporality"),
                    (_, None) => Outcome::Skipped("metric kind has no aggregation temporality"),
                }
            },
            Accessor::MetricIsMonotonic => match (&mut self.metric.data, value.as_bool()) {
                (MetricData::Sum(sum), Some(b)) => {
                    sum.is_monotonic = b;
                    Outcome::Applied
                },
                (MetricData::Sum(_), None) => Outcome::Skipped("type mismatch"),
                _ => Outcome::Skipped("metric kind has no is_monotonic"),
            },
            Accessor::StartTimeUnixNano | Accessor::TimeUnixNano => {
                let Some(nanos) = value.as_i64().and_then(|i| u64::try_from(i).ok()) else {
                    return Outcome::Skipped("type mismatch");
                };
                let Some(index) = self.point else {
                    return Outcome::Skipped("no data point");
                };
                match self.metric.point_timestamps_mut(index) {
                    Some((start, time)) => {
                        if accessor == Accessor::StartTimeUnixNano {
                            *start = nanos;
                        } else {
                            *time = nanos;
                        }
                        Outcome::Applied
                    },
                    None => Outcome::Skipped("no data point"),
                }
            },
            Accessor::ValueInt => match (value.as_i64(), self.number_point_mut()) {
                (Some(i), Some(dp)) => {
                    dp.value = Some(NumberValue::Int(i));
                    Outcome::Applied
                },
                (None, _) => Outcome::Skipped("type mismatch"),
                (_, None) => Outcome::Skipped("metric kind has no value_int"),
            },
            Accessor::ValueDouble => match (value.as_f64(), self.number_point_mut()) {
                (Some(d), Some(dp)) => {
                    dp.value = Some(NumberValue::Double(d));
                    Outcome::Applied
                },
                (None, _) => Outcome::Skipped("type mismatch"),
                (_, None) => Outcome::Skipped("metric kind has no value_double"),
            },
            Accessor::Count => {
                let Some(count) = value.as_i64().and_then(|i| u64::try_from(i).ok()) else {
                    return Outcome::Skipped("type mismatch");
                };
                let Some(index) = self.point else {
                    return Outcome::Skipped("no data point");
                };
                let slot = match &mut self.metric.data {
                    MetricData::Histogram(h) => h.data_points.get_mut(index).map(|dp| &mut dp.count),
                    MetricData::ExponentialHistogram(h) => {
                        h.data_points.get_mut(index).map(|dp| &mut dp.count)
                    },
                    MetricData::Summary(s) => s.data_points.get_mut(index).map(|dp| &mut dp.count),
                    _ => return Outcome::Skipped("metric kind has no count"),
                };
                match slot {
                    Some(slot) => {
                        *slot = count;
                        Outcome::Applied
                    },
                    None => Outcome::Skipped("no data point"),
                }
            },
            Accessor::Sum => {
                let Some(sum) = value.as_f64() else {
                    return Outcome::Skipped("type mismatch");
                };
                let Some(index) = self.point else {
                    return Outcome::Skipped("no data point");
                };
                let applied = match &mut self.metric.data {
                    MetricData::Histogram(h) => {
                        h.data_points.get_mut(index).map(|dp| dp.sum = Some(sum)).is_some()
                    },
                    MetricData::ExponentialHistogram(h) => {
                        h.data_points.get_mut(index).map(|dp| dp.sum = Some(sum)).is_some()
                    },
                    MetricData::Summary(s) => {
                        s.data_points.get_mut(index).map(|dp| dp.sum = sum).is_some()
                    },
                    _ => return Outcome::Skipped("metric kind has no sum"),
                };
                if applied {
                    Outcome::Applied
                } else {
                    Outcome::Skipped("no data point")
                }
            },
            Accessor::Scale | Accessor::PositiveOffset | Accessor::NegativeOffset => {
                let Some(int) = value.as_i64().and_then(|i| i32::try_from(i).ok()) else {
                    return Outcome::Skipped("type mismatch");
                };
                let Some(dp) = self.exp_histogram_point_mut() else {
                    return Outcome::Skipped("metric kind is not an exponential histogram");
                };
                match accessor {
                    Accessor::Scale => dp.scale = int,
                    Accessor::PositiveOffset => dp.positive.offset = int,
                    _ => dp.negative.offset = int,
                }
                Outcome::Applied
            },
            Accessor::ZeroCount => {
                let Some(zero_count) = value.as_i64().and_then(|i| u64::try_from(i).ok()) else {
                    return Outcome::Skipped("type mismatch");
                };
                match self.exp_histogram_point_mut() {
                    Some(dp) => {
                        dp.zero_count = zero_count;
                        Outcome::Applied
                    },
                    None => Outcome::Skipped("metric kind is not an exponential histogram"),
                }
            },
        }
    }

    fn timestamps(&self) -> Option<(u64, u64)> {
        self.point.and_then(|i| self.metric.point_timestamps(i))
    }

    fn number_point(&self) -> Option<&NumberDataPoint> {
        let index = self.point?;
        match &self.metric.data {
            MetricData::Sum(sum) => sum.data_points.get(index),
            MetricData::Gauge(gauge) => gauge.data_points.get(index),
            _ => None,
        }
    }

    fn number_point_mut(&mut self) -> Option<&mut NumberDataPoint> {
        let index = self.point?;
        match &mut self.metric.data {
            MetricData::Sum(sum) => sum.data_points.get_mut(index),
            MetricData::Gauge(gauge) => gauge.data_points.get_mut(index),
            _ => None,
        }
    }

    fn histogram_point(&self) -> Option<&HistogramDataPoint> {
        let index = self.point?;
        match &self.metric.data {
            MetricData::Histogram(hist) => hist.data_points.get(index),
            _ => None,
        }
    }

    fn exp_histogram_point(&self) -> Option<&ExponentialHistogramDataPoint> {
        let index = self.point?;
        match &self.metric.data {
            MetricData::ExponentialHistogram(hist) => hist.data_points.get(index),
            _ => None,
        }
    }

    fn exp_histogram_point_mut(&mut self) -> Option<&mut ExponentialHistogramDataPoint> {
        let index = self.point?;
        match &mut self.metric.data {
            MetricData::ExponentialHistogram(hist) => hist.data_points.get_mut(index),
            _ => None,
        }
    }

    /// Summary point under the cursor, for conversion functions
    pub fn summary_point(&self) -> Option<&SummaryDataPoint> {
        let index = self.point?;
        match &self.metric.data {
            MetricData::Summary(summary) => summary.data_points.get(index),
            _ => None,
        }
    }
}

fn set_string(slot: &mut String, value: Value) -> Outcome {
    match value {
        Value::String(s) => {
            *slot = s;
            Outcome::Applied
        },
        _ => Outcome::Skipped("type mismatch"),
    }
}
