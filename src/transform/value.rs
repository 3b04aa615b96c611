//! Runtime values shared by literals, paths and function results.

use crate::model::{AttributeValue, NumberValue};
use std::fmt;

/// Tagged value produced by evaluating an expression
#[derive(Debug, Clone, PartialEq, Default)]
#[allow(missing_docs)]
pub enum Value {
    String(String),
    Bool(bool),
    Int(i64),
    Double(f64),
    /// Path or key not present
    #[default]
    Absent,
}

impl Value {
    /// Name of the variant, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Absent => "absent",
        }
    }

    /// True for [`Value::Absent`]
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Truthiness: only `Bool(true)` is true
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Bool(true))
    }

    /// Borrow a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Int only; doubles are not truncated
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Int widens to double
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Bool only
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String form used by pattern matching; `None` for Absent
    pub fn to_match_string(&self) -> Option<String> {
        match self {
            Value::Absent => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Equality used by `==`: Int and Double compare numerically,
    /// Absent equals only Absent, other mixed kinds are unequal.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Absent, Value::Absent) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Int(_) | Value::Double(_), Value::Int(_) | Value::Double(_)) => {
                self.as_f64() == other.as_f64()
            },
            _ => false,
        }
    }

    /// Convert into an attribute value; Absent has no attribute form
    pub fn into_attribute(self) -> Option<AttributeValue> {
        match self {
            Value::String(s) => Some(AttributeValue::String(s)),
            Value::Bool(b) => Some(AttributeValue::Bool(b)),
            Value::Int(i) => Some(AttributeValue::Int(i)),
            Value::Double(d) => Some(AttributeValue::Double(d)),
            Value::Absent => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::Absent => f.write_str("<absent>"),
        }
    }
}

impl From<&AttributeValue> for Value {
    fn from(value: &AttributeValue) -> Self {
        match value {
            AttributeValue::String(s) => Value::String(s.clone()),
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::Int(i) => Value::Int(*i),
            AttributeValue::Double(d) => Value::Double(*d),
        }
    }
}

impl From<Option<&AttributeValue>> for Value {
    fn from(value: Option<&AttributeValue>) -> Self {
        value.map_or(Value::Absent, Value::from)
    }
}

impl From<NumberValue> for Value {
    fn from(value: NumberValue) -> Self {
        match value {
            NumberValue::Int(i) => Value::Int(i),
            NumberValue::Double(d) => Value::Double(d),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

/// Unsigned counters read as Int, saturating at `i64::MAX`
impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert!(Value::Int(1).loose_eq(&Value::Double(1.0)));
        assert!(Value::Double(2.0).loose_eq(&Value::Int(2)));
        assert!(!Value::Int(1).loose_eq(&Value::Double(1.5)));
        assert!(!Value::Int(1).loose_eq(&Value::String("1".to_string())));
    }

    #[test]
    fn test_absent_equality() {
        assert!(Value::Absent.loose_eq(&Value::Absent));
        assert!(!Value::Absent.loose_eq(&Value::Bool(false)));
        assert!(!Value::String(String::new()).loose_eq(&Value::Absent));
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Bool(true).is_true());
        assert!(!Value::Bool(false).is_true());
        assert!(!Value::Absent.is_true());
        assert!(!Value::Int(1).is_true());
    }

    #[test]
    fn test_match_string() {
        assert_eq!(Value::from("abc").to_match_string().as_deref(), Some("abc"));
        assert_eq!(Value::Int(42).to_match_string().as_deref(), Some("42"));
        assert_eq!(Value::Absent.to_match_string(), None);
    }

    #[test]
    fn test_unsigned_saturates() {
        assert_eq!(Value::from(u64::MAX), Value::Int(i64::MAX));
        assert_eq!(Value::from(1234u64), Value::Int(1234));
    }
}
