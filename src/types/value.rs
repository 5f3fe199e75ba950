//! Values stored in configuration scopes

use crate::context::{label, Context, DictConfig, IntervalConfig};
use crate::types::{ConfigError, Key, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// A clipped interval returned by span queries
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub begin: i64,
    pub end: i64,
    pub value: ConfigValue,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<ConfigValue>),
    Segments(Vec<Segment>),
    Dict(DictConfig),
    Ranges(IntervalConfig),
}

impl ConfigValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::List(_) => "list",
            ConfigValue::Segments(_) => "segments",
            ConfigValue::Dict(_) => "dict config",
            ConfigValue::Ranges(_) => "interval config",
        }
    }

    /// An empty table reads back from disk without its variant. Let the key
    /// about to be used on it decide: labels and integer shapes make it an
    /// interval config, plain names a dict config.
    pub(crate) fn settle_for(&mut self, key: &Key) {
        let range_keyed = match key {
            Key::Name(name) => label::is_label(name),
            _ => true,
        };
        let settled = match self {
            ConfigValue::Dict(dict) if dict.is_empty() && range_keyed => {
                ConfigValue::Ranges(IntervalConfig::new())
            }
            ConfigValue::Ranges(ranges) if ranges.is_empty() && !range_keyed => {
                ConfigValue::Dict(DictConfig::new())
            }
            _ => return,
        };
        *self = settled;
    }

    pub fn as_context(&self) -> Option<&dyn Context> {
        match self {
            ConfigValue::Dict(dict) => Some(dict as &dyn Context),
            ConfigValue::Ranges(ranges) => Some(ranges as &dyn Context),
            _ => None,
        }
    }

    pub fn as_context_mut(&mut self) -> Option<&mut dyn Context> {
        match self {
            ConfigValue::Dict(dict) => Some(dict as &mut dyn Context),
            ConfigValue::Ranges(ranges) => Some(ranges as &mut dyn Context),
            _ => None,
        }
    }

    pub fn as_ranges(&self) -> Option<&IntervalConfig> {
        match self {
            ConfigValue::Ranges(ranges) => Some(ranges),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Convert from JSON.
    ///
    /// Objects whose keys are all labels (including empty objects) become
    /// interval configs; other objects become dict configs.
    pub fn from_json(value: Value) -> Result<Self> {
        Ok(match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Integer(i),
                None => ConfigValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ConfigValue::String(s),
            Value::Array(items) => ConfigValue::List(
                items
                    .into_iter()
                    .map(ConfigValue::from_json)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Object(map) => {
                if map.keys().all(|k| label::is_label(k)) {
                    ConfigValue::Ranges(IntervalConfig::from_json_table(map)?)
                } else {
                    ConfigValue::Dict(DictConfig::from_json_table(map)?)
                }
            }
        })
    }

    pub fn to_json(&self) -> Value {
        match self {
            ConfigValue::Null => Value::Null,
            ConfigValue::Bool(b) => Value::Bool(*b),
            ConfigValue::Integer(i) => Value::Number((*i).into()),
            ConfigValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            ConfigValue::String(s) => Value::String(s.clone()),
            ConfigValue::List(items) => Value::Array(items.iter().map(|v| v.to_json()).collect()),
            ConfigValue::Segments(segments) => Value::Array(
                segments
                    .iter()
                    .map(|s| Value::Array(vec![s.begin.into(), s.end.into(), s.value.to_json()]))
                    .collect(),
            ),
            ConfigValue::Dict(dict) => dict.to_json(),
            ConfigValue::Ranges(ranges) => {
                let table: Map<String, Value> = ranges
                    .to_label_map()
                    .into_iter()
                    .map(|(label, value)| (label, value.to_json()))
                    .collect();
                Value::Object(table)
            }
        }
    }

    pub(crate) fn into_list(self, key: &str) -> Result<Vec<ConfigValue>> {
        match self {
            ConfigValue::List(items) => Ok(items),
            other => Err(ConfigError::type_mismatch(
                format!("list of values for {}", key),
                other.type_name(),
            )),
        }
    }
}

// Serialized through the JSON data model so any serde format round-trips the
// same shapes the loader reads.
impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ConfigValue::from_json(value).map_err(serde::de::Error::custom)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Integer(i)
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        ConfigValue::Float(f)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(items: Vec<T>) -> Self {
        ConfigValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<DictConfig> for ConfigValue {
    fn from(dict: DictConfig) -> Self {
        ConfigValue::Dict(dict)
    }
}

impl From<IntervalConfig> for ConfigValue {
    fn from(ranges: IntervalConfig) -> Self {
        ConfigValue::Ranges(ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_tables_become_ranges() {
        let value = ConfigValue::from_json(json!({"0-10": "x", "10-20": "y"})).unwrap();
        let ranges = value.as_ranges().expect("label table should load as ranges");
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges.value_at(15).unwrap(), ConfigValue::from("y"));
    }

    #[test]
    fn test_mixed_tables_become_dicts() {
        let value = ConfigValue::from_json(json!({"0-10": "x", "name": "y"})).unwrap();
        assert!(matches!(value, ConfigValue::Dict(_)));
    }

    #[test]
    fn test_json_round_trip_preserves_nesting() {
        let source = json!({
            "name": "detector",
            "gain": 1.5,
            "ranges": {"0-10": 1, "10-20": [1, 2]},
        });
        let value = ConfigValue::from_json(source.clone()).unwrap();
        assert_eq!(value.to_json(), source);
    }

    #[test]
    fn test_empty_table_settles_on_first_key() {
        let mut value = ConfigValue::from_json(json!({})).unwrap();
        assert!(value.as_ranges().is_some());

        value.settle_for(&Key::name("gain"));
        assert!(matches!(value, ConfigValue::Dict(_)));
        value.settle_for(&Key::Point(3));
        assert!(value.as_ranges().is_some());
        value.settle_for(&Key::name("0-10"));
        assert!(value.as_ranges().is_some());
    }

    #[test]
    fn test_populated_tables_keep_their_variant() {
        let mut ranges = ConfigValue::from_json(json!({"0-10": "x"})).unwrap();
        ranges.settle_for(&Key::name("gain"));
        assert!(ranges.as_ranges().is_some());

        let mut dict = ConfigValue::from_json(json!({"gain": 1})).unwrap();
        dict.settle_for(&Key::Point(3));
        assert!(matches!(dict, ConfigValue::Dict(_)));
    }
}
