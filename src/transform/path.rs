//! Static table of recognised paths.
//!
//! Every path string accepted in a statement maps to one [`Accessor`] at
//! compile time. Reads and writes then switch on the accessor and the
//! metric kind, so evaluation never inspects field names.

use super::ast::PathExpr;
use crate::core::{Result, TransformError};
use std::fmt;

/// Field addressed by a path, without its map key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    /// `resource.attributes`
    ResourceAttributes,
    /// `attributes` of the point under the cursor
    Attributes,
    /// `metric.name`
    MetricName,
    /// `metric.description`
    MetricDescription,
    /// `metric.unit`
    MetricUnit,
    /// `metric.type`, read-only kind name such as `"Sum"`
    MetricType,
    /// `metric.aggregation_temporality`, 0 to 2. Gauge and Summary read Absent.
    MetricAggregationTemporality,
    /// `metric.is_monotonic`, Sum only
    MetricIsMonotonic,
    /// `start_time_unix_nano`
    StartTimeUnixNano,
    /// `time_unix_nano`
    TimeUnixNano,
    /// `value_int` of a Sum or Gauge point
    ValueInt,
    /// `value_double` of a Sum or Gauge point
    ValueDouble,
    /// `count` of a histogram or summary point
    Count,
    /// `sum` of a histogram or summary point
    Sum,
    /// `scale` of an exponential histogram point
    Scale,
    /// `zero_count` of an exponential histogram point
    ZeroCount,
    /// `positive.offset` of an exponential histogram point
    PositiveOffset,
    /// `negative.offset` of an exponential histogram point
    NegativeOffset,
}

/// Granularity at which an editor targeting a path runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionUnit {
    /// Once per matching data point
    Point,
    /// Once per instrument with at least one matching record. The editor
    /// sees the first matching point; later points are not evaluated, so
    /// `set(metric.description, attributes["v"])` takes the first point's value.
    Instrument,
    /// Once per resource group with at least one matching record
    Resource,
}

const PATH_TABLE: &[(&str, Accessor)] = &[
    ("resource.attributes", Accessor::ResourceAttributes),
    ("attributes", Accessor::Attributes),
    ("metric.name", Accessor::MetricName),
    ("metric.description", Accessor::MetricDescription),
    ("metric.unit", Accessor::MetricUnit),
    ("metric.type", Accessor::MetricType),
    ("metric.aggregation_temporality", Accessor::MetricAggregationTemporality),
    ("metric.is_monotonic", Accessor::MetricIsMonotonic),
    ("start_time_unix_nano", Accessor::StartTimeUnixNano),
    ("time_unix_nano", Accessor::TimeUnixNano),
    ("value_int", Accessor::ValueInt),
    ("value_double", Accessor::ValueDouble),
    ("count", Accessor::Count),
    ("sum", Accessor::Sum),
    ("scale", Accessor::Scale),
    ("zero_count", Accessor::ZeroCount),
    ("positive.offset", Accessor::PositiveOffset),
    ("negative.offset", Accessor::NegativeOffset),
];

impl Accessor {
    /// True for attribute maps, which accept a `["key"]` suffix
    pub fn is_map(self) -> bool {
        matches!(self, Accessor::ResourceAttributes | Accessor::Attributes)
    }

    /// Execution unit of an editor writing this field
    pub fn unit(self) -> ExecutionUnit {
        match self {
            Accessor::ResourceAttributes => ExecutionUnit::Resource,
            Accessor::MetricName
            | Accessor::MetricDescription
            | Accessor::MetricUnit
            | Accessor::MetricType
            | Accessor::MetricAggregationTemporality
            | Accessor::MetricIsMonotonic => ExecutionUnit::Instrument,
            _ => ExecutionUnit::Point,
        }
    }

    /// `metric.type` is derived from the payload variant and cannot be set
    pub fn is_writable(self) -> bool {
        !matches!(self, Accessor::MetricType)
    }

    /// Path string as written in statements
    pub fn as_str(self) -> &'static str {
        PATH_TABLE
            .iter()
            .find(|(_, accessor)| *accessor == self)
            .map_or("<unknown>", |(name, _)| name)
    }
}

/// Compiled path: accessor plus optional map key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    accessor: Accessor,
    key: Option<String>,
}

impl Path {
    /// Resolve a parsed path against the table
    pub fn compile(expr: &PathExpr) -> Result<Self> {
        let joined = expr.fields.join(".");
        let accessor = PATH_TABLE
            .iter()
            .find(|(name, _)| *name == joined)
            .map(|(_, accessor)| *accessor)
            .ok_or_else(|| TransformError::UnknownPath(expr.to_string()))?;

        if expr.key.is_some() && !accessor.is_map() {
            return Err(TransformError::UnknownPath(expr.to_string()));
        }

        Ok(Self {
            accessor,
            key: expr.key.clone(),
        })
    }

    /// Field addressed
    pub fn accessor(&self) -> Accessor {
        self.accessor
    }

    /// Map key, for `attributes["k"]` style paths
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Whole attribute map, without a key
    pub fn is_map(&self) -> bool {
        self.accessor.is_map() && self.key.is_none()
    }

    /// Whether `set` may target this path. Whole maps are not writable.
    pub fn is_writable(&self) -> bool {
        self.accessor.is_writable() && !self.is_map()
    }

    /// See [`Accessor::unit`]
    pub fn unit(&self) -> ExecutionUnit {
        self.accessor.unit()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.accessor.as_str())?;
        if let Some(key) = &self.key {
            write!(f, "[{:?}]", key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::parser::parse_statement;
    use crate::transform::ast::Expr;

    fn compile(text: &str) -> Result<Path> {
        let stmt = parse_statement(&format!("f({})", text)).unwrap();
        match &stmt.invocation.arguments[0] {
            Expr::Path(expr) => Path::compile(expr),
            other => panic!("Expected path, got {:?}", other),
        }
    }

    #[test]
    fn test_known_paths() {
        let path = compile(r#"resource.attributes["host.name"]"#).unwrap();
        assert_eq!(path.accessor(), Accessor::ResourceAttributes);
        assert_eq!(path.key(), Some("host.name"));
        assert_eq!(path.unit(), ExecutionUnit::Resource);
        assert!(path.is_writable());

        let path = compile("positive.offset").unwrap();
        assert_eq!(path.accessor(), Accessor::PositiveOffset);
        assert_eq!(path.unit(), ExecutionUnit::Point);

        let path = compile("metric.unit").unwrap();
        assert_eq!(path.unit(), ExecutionUnit::Instrument);
        assert_eq!(path.to_string(), "metric.unit");
    }

    #[test]
    fn test_maps_and_writability() {
        let map = compile("attributes").unwrap();
        assert!(map.is_map());
        assert!(!map.is_writable());

        let entry = compile(r#"attributes["a"]"#).unwrap();
        assert!(!entry.is_map());
        assert!(entry.is_writable());
        assert_eq!(entry.to_string(), r#"attributes["a"]"#);

        assert!(!compile("metric.type").unwrap().is_writable());
    }

    #[test]
    fn test_unknown_paths() {
        assert!(matches!(compile("metric.bogus"), Err(TransformError::UnknownPath(_))));
        assert!(matches!(compile("name"), Err(TransformError::UnknownPath(_))));
        assert!(matches!(compile(r#"metric.name["x"]"#), Err(TransformError::UnknownPath(_))));
    }
}
