use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Largest magnitude at which every whole f64 is exactly representable.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A runtime value: either something received from a provider, or an
/// example generated from a matcher tree.
///
/// Numbers are doubles so that NaN and the infinities survive long enough to
/// be rejected by the JSON serialisability checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum AnyData {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<AnyData>),
    /// Key order is insertion order.
    Object(Vec<(String, AnyData)>),
}

impl AnyData {
    pub fn type_name(&self) -> &'static str {
        match self {
            AnyData::Null => "null",
            AnyData::Bool(_) => "boolean",
            AnyData::Number(_) => "number",
            AnyData::String(_) => "string",
            AnyData::Array(_) => "array",
            AnyData::Object(_) => "object",
        }
    }

    /// Type name with its indefinite article, for prose messages.
    pub fn described_type(&self) -> &'static str {
        match self {
            AnyData::Null => "null",
            AnyData::Bool(_) => "a boolean",
            AnyData::Number(_) => "a number",
            AnyData::String(_) => "a string",
            AnyData::Array(_) => "an array",
            AnyData::Object(_) => "an object",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnyData::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AnyData::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AnyData]> {
        match self {
            AnyData::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, AnyData)]> {
        match self {
            AnyData::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Looks up a key on an object. Always `None` for non-objects.
    pub fn get(&self, key: &str) -> Option<&AnyData> {
        self.as_object()
            .and_then(|fields| fields.iter().find(|(k, _)| k == key).map(|(_, v)| v))
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyData::String(s) => write!(f, "{}", Value::String(s.clone())),
            other => write!(f, "{other}"),
        }
    }
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        format!("{n}")
    }
}

impl fmt::Display for AnyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyData::Null => f.write_str("null"),
            AnyData::Bool(b) => write!(f, "{b}"),
            AnyData::Number(n) => f.write_str(&format_number(*n)),
            AnyData::String(s) => f.write_str(s),
            AnyData::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    item.fmt_nested(f)?;
                }
                f.write_str("]")
            }
            AnyData::Object(fields) => {
                f.write_str("{")?;
                for (i, (key, item)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:", Value::String(key.clone()))?;
                    item.fmt_nested(f)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<Value> for AnyData {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => AnyData::Null,
            Value::Bool(b) => AnyData::Bool(b),
            Value::Number(n) => AnyData::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => AnyData::String(s),
            Value::Array(items) => AnyData::Array(items.into_iter().map(AnyData::from).collect()),
            Value::Object(map) => {
                AnyData::Object(map.into_iter().map(|(k, v)| (k, AnyData::from(v))).collect())
            }
        }
    }
}

/// Whole numbers become JSON integers; non-finite numbers become `null`.
impl From<AnyData> for Value {
    fn from(data: AnyData) -> Self {
        match data {
            AnyData::Null => Value::Null,
            AnyData::Bool(b) => Value::Bool(b),
            AnyData::Number(n) => number_to_json(n),
            AnyData::String(s) => Value::String(s),
            AnyData::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            AnyData::Object(fields) => {
                Value::Object(fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

pub(crate) fn number_to_json(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

impl From<f64> for AnyData {
    fn from(n: f64) -> Self {
        AnyData::Number(n)
    }
}

impl From<i64> for AnyData {
    fn from(n: i64) -> Self {
        AnyData::Number(n as f64)
    }
}

impl From<bool> for AnyData {
    fn from(b: bool) -> Self {
        AnyData::Bool(b)
    }
}

impl From<&str> for AnyData {
    fn from(s: &str) -> Self {
        AnyData::String(s.to_string())
    }
}

impl From<String> for AnyData {
    fn from(s: String) -> Self {
        AnyData::String(s)
    }
}

/// Comma-separated list of quoted keys, used in structural descriptions.
pub(crate) fn quoted_keys<'a>(keys: impl IntoIterator<Item = &'a String>) -> String {
    keys.into_iter().map(|k| format!("'{k}'")).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn display_matches_loose_rendering() {
        assert_eq!(AnyData::Number(1.0).to_string(), "1");
        assert_eq!(AnyData::Number(1.5).to_string(), "1.5");
        assert_eq!(AnyData::Number(f64::NAN).to_string(), "NaN");
        assert_eq!(AnyData::Number(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(AnyData::from("plain").to_string(), "plain");
        let nested = AnyData::from(json!({"a": ["x", 1, null]}));
        assert_eq!(nested.to_string(), r#"{"a":["x",1,null]}"#);
    }

    #[test]
    fn json_conversion_keeps_key_order_and_integers() {
        let data = AnyData::from(json!({"z": 1, "a": 2.5}));
        let keys: Vec<_> = data.as_object().unwrap().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["z", "a"]);
        assert_eq!(Value::from(data), json!({"z": 1, "a": 2.5}));
    }

    #[test]
    fn non_finite_numbers_become_null() {
        assert_eq!(Value::from(AnyData::Number(f64::INFINITY)), Value::Null);
    }

    #[test]
    fn get_only_works_on_objects() {
        let data = AnyData::from(json!({"a": true}));
        assert_eq!(data.get("a"), Some(&AnyData::Bool(true)));
        assert_eq!(data.get("b"), None);
        assert_eq!(AnyData::Null.get("a"), None);
    }
}
