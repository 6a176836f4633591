//! Serialization utilities
//!
//! This module converts between [`Value`] and `serde_json::Value`, used when
//! rows are exported from a result collection and when records are built
//! from serializable data.

use crate::types::Value;
use serde::Serialize;

/// Convert a single value to JSON
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Uuid(u) => serde_json::Value::String(u.to_string()),
        Value::Timestamp(t) => serde_json::Value::String(t.to_rfc3339()),
        Value::Json(j) => j.clone(),
        Value::Null => serde_json::Value::Null,
    }
}

/// Convert ordered `(name, value)` pairs to a JSON object
pub fn values_to_json_object<'a, I>(pairs: I) -> serde_json::Value
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let map = pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value_to_json(value)))
        .collect::<serde_json::Map<_, _>>();
    serde_json::Value::Object(map)
}

/// Convert a JSON value to the closest [`Value`] shape
pub fn value_from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::String(s) => Value::Text(s),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Json(serde_json::Value::Number(n))
            }
        }
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Null => Value::Null,
        other => Value::Json(other),
    }
}

/// Flatten serializable data into ordered `(field, value)` pairs.
///
/// Non-object data yields an empty list.
pub fn serialize_to_fields<T: Serialize>(data: &T) -> Vec<(String, Value)> {
    match serde_json::to_value(data) {
        Ok(serde_json::Value::Object(map)) => map
            .into_iter()
            .map(|(key, value)| (key, value_from_json(value)))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_to_json() {
        assert_eq!(value_to_json(&Value::from("a")), json!("a"));
        assert_eq!(value_to_json(&Value::from(3)), json!(3));
        assert_eq!(value_to_json(&Value::Null), json!(null));
        assert_eq!(value_to_json(&Value::Float(f64::NAN)), json!(null));
    }

    #[test]
    fn test_value_from_json() {
        assert_eq!(value_from_json(json!(12)), Value::Integer(12));
        assert_eq!(value_from_json(json!(1.25)), Value::Float(1.25));
        assert_eq!(value_from_json(json!([1, 2])), Value::Json(json!([1, 2])));
    }

    #[test]
    fn test_serialize_to_fields() {
        #[derive(Serialize)]
        struct User {
            name: String,
            age: i64,
        }

        let fields = serialize_to_fields(&User {
            name: "Ann".to_string(),
            age: 30,
        });
        assert_eq!(fields.len(), 2);
        assert!(fields.contains(&("name".to_string(), Value::from("Ann"))));
        assert!(fields.contains(&("age".to_string(), Value::Integer(30))));
    }
}
