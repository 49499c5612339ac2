//! Path-based access into JSON documents
//!
//! Paths use '/' as separator ("/fields/attachment"). Reading flattens
//! through arrays; writing creates intermediate objects as needed. Request
//! builders write with `set_by_path`, response handling reads with
//! `extract_by_path` / `extract_list`.

use serde_json::{Map, Value};

fn split_path(path: &str) -> Vec<&str> {
    path.trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect()
}

/// Extract a value from JSON using a path expression.
///
/// When an array is reached before the path ends, the remaining path is
/// applied to each element and the non-null results are collected.
///
/// # Returns
/// The extracted value, or Value::Null if not found
pub fn extract_by_path(json: &Value, path: &str) -> Value {
    extract_by_parts(json, &split_path(path))
}

fn extract_by_parts(json: &Value, parts: &[&str]) -> Value {
    let Some((part, remaining)) = parts.split_first() else {
        return json.clone();
    };

    match json {
        Value::Object(map) => map
            .get(*part)
            .map(|value| extract_by_parts(value, remaining))
            .unwrap_or(Value::Null),
        Value::Array(arr) => {
            let mut results: Vec<Value> = arr
                .iter()
                .map(|item| extract_by_parts(item, parts))
                .filter(|v| !v.is_null())
                .collect();

            match results.len() {
                0 => Value::Null,
                1 => results.remove(0),
                _ => Value::Array(results),
            }
        }
        _ => Value::Null,
    }
}

/// Extract a list of records from a response.
///
/// An array yields its elements, an object yields itself, null yields
/// nothing. An empty path addresses the response root.
pub fn extract_list(json: &Value, path: &str) -> Vec<Value> {
    match extract_by_path(json, path) {
        Value::Array(arr) => arr,
        Value::Null => vec![],
        other => vec![other],
    }
}

/// Write `value` at `path`, creating objects along the way.
///
/// A non-object found on the way is replaced by an object.
pub fn set_by_path(target: &mut Value, path: &str, value: Value) {
    let parts = split_path(path);
    let Some((last, parents)) = parts.split_last() else {
        *target = value;
        return;
    };

    let mut current = target;
    for part in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
            _ => return,
        };
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    if let Value::Object(map) = current {
        map.insert(last.to_string(), value);
    }
}

/// Render a JSON value for a query string
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(value_to_string).collect::<Vec<_>>().join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// True for values that must not be sent: null, empty strings, empty lists
/// and empty objects
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}
