//! Ordered attribute maps with unique keys.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// A single attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// UTF-8 string
    String(String),
    /// Boolean
    Bool(bool),
    /// Signed 64-bit integer
    Int(i64),
    /// 64-bit float
    Double(f64),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => f.write_str(s),
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::Double(d) => write!(f, "{}", d),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Double(value)
    }
}

/// Key/value pair stored in an [`Attributes`] map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Attribute name
    pub key: String,
    /// Attribute value
    pub value: AttributeValue,
}

/// Attribute map preserving insertion order.
///
/// Most telemetry carries only a handful of attributes, so entries live
/// inline until the fifth key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(SmallVec<[KeyValue; 4]>);

impl Attributes {
    /// Create an empty map
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the map holds no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a value by key
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.iter().find(|kv| kv.key == key).map(|kv| &kv.value)
    }

    /// True when `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or overwrite. New keys are appended at the end.
    pub fn insert<K: Into<String>, V: Into<AttributeValue>>(&mut self, key: K, value: V) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|kv| kv.key == key) {
            Some(existing) => existing.value = value,
            None => self.0.push(KeyValue { key, value }),
        }
    }

    /// Remove a key, returning its value if it was present
    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        let index = self.0.iter().position(|kv| kv.key == key)?;
        Some(self.0.remove(index).value)
    }

    /// Keep only the entries for which `keep` returns true
    pub fn retain<F: FnMut(&KeyValue) -> bool>(&mut self, mut keep: F) {
        self.0.retain(|kv| keep(kv));
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &KeyValue> {
        self.0.iter()
    }

    /// Iterate entries mutably in insertion order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut KeyValue> {
        self.0.iter_mut()
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.insert(key, value);
        }
        attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_keys_unique() {
        let mut attrs = Attributes::new();
        attrs.insert("a", "1");
        attrs.insert("b", 2i64);
        attrs.insert("a", "3");

        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get("a"), Some(&AttributeValue::String("3".to_string())));
        let keys: Vec<_> = attrs.iter().map(|kv| kv.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_remove_and_retain() {
        let mut attrs: Attributes = [("a", "x"), ("b", "y"), ("c", "z")].into_iter().collect();

        assert_eq!(attrs.remove("b"), Some(AttributeValue::from("y")));
        assert_eq!(attrs.remove("missing"), None);

        attrs.retain(|kv| kv.key != "a");
        assert!(!attrs.contains_key("a"));
        assert!(attrs.contains_key("c"));
    }

    #[test]
    fn test_untagged_values_deserialize() {
        let attrs: Attributes = serde_json::from_str(
            r#"[{"key":"s","value":"v"},{"key":"i","value":3},{"key":"d","value":1.5},{"key":"b","value":true}]"#,
        )
        .unwrap();

        assert_eq!(attrs.get("s"), Some(&AttributeValue::from("v")));
        assert_eq!(attrs.get("i"), Some(&AttributeValue::Int(3)));
        assert_eq!(attrs.get("d"), Some(&AttributeValue::Double(1.5)));
        assert_eq!(attrs.get("b"), Some(&AttributeValue::Bool(true)));
    }
}
