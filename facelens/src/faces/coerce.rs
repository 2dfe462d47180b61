use serde::Serialize;
use serde_json::{Map, Value};

/// Comparator output in its response shape.
///
/// `success` and `match` are strict booleans; every other field the engine
/// reported is passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub success: bool,
    #[serde(rename = "match")]
    pub is_match: bool,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

const FALSE_LITERALS: &[&str] = &["false", "0", "no", "off", "none", "null"];

/// Boolean reading of an arbitrary JSON value.
///
/// A one-element array is read as its only element, so `[true]` and `["0"]`
/// behave like the wrapped scalar.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            !s.is_empty() && !FALSE_LITERALS.iter().any(|lit| s.eq_ignore_ascii_case(lit))
        }
        Value::Array(items) if items.len() == 1 => truthy(&items[0]),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Coerce a comparator's raw output.
///
/// A missing `match` is `false`; a missing `success` is `true`.
pub fn coerce_comparison(mut raw: Map<String, Value>) -> ComparisonResult {
    let is_match = raw.remove("match").is_some_and(|v| truthy(&v));
    let success = raw.remove("success").map_or(true, |v| truthy(&v));

    ComparisonResult {
        success,
        is_match,
        details: raw,
    }
}
