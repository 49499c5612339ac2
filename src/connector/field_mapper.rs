//! Declarative request mapping
//!
//! A `FieldMapping` says where a collected value goes (a body path or a
//! query parameter) and how it is reshaped on the way. Create and update
//! operations share the same tables; only values that are present and
//! non-empty are written, so an update never sends explicit nulls.

use super::path_extractor::{is_empty_value, set_by_path, value_to_string};
use crate::error::{ConnectorError, Result};
use crate::http::HttpRequest;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// '/'-separated path inside the JSON body
    Body(&'static str),
    /// Query string parameter
    Query(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Value as given
    Identity,
    /// `{"id": value}`
    WrapId,
    /// `{"name": value}`
    WrapName,
    /// `{"key": VALUE}` with the value upper-cased
    ParentKey,
    /// `{"$id": value}` with numeric strings turned into numbers
    DollarId,
    /// Comma separated string or list to a JSON array of strings
    List,
    /// Comma separated ids to `[{"id": ..}, ..]`
    IdObjects,
    /// `[value]`
    Singleton,
    /// Raw JSON text parsed into a value
    Json,
    /// Numeric string to a number
    Number,
    /// Boolean `true` becomes `{}` and `false` is dropped
    EmptyObjectFlag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    /// Key in the collected values
    pub source: &'static str,
    pub target: Target,
    pub transform: Transform,
}

impl FieldMapping {
    pub const fn body(source: &'static str, path: &'static str) -> Self {
        Self {
            source,
            target: Target::Body(path),
            transform: Transform::Identity,
        }
    }

    pub const fn query(source: &'static str, param: &'static str) -> Self {
        Self {
            source,
            target: Target::Query(param),
            transform: Transform::Identity,
        }
    }

    pub const fn with(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }
}

/// Apply a transform; `Ok(None)` means the value should not be sent
pub fn apply_transform(source: &str, value: &Value, transform: Transform) -> Result<Option<Value>> {
    let out = match transform {
        Transform::Identity => value.clone(),
        Transform::WrapId => json!({ "id": value }),
        Transform::WrapName => json!({ "name": value }),
        Transform::ParentKey => match value.as_str() {
            Some(s) => json!({ "key": s.trim().to_uppercase() }),
            None => json!({ "key": value }),
        },
        Transform::DollarId => json!({ "$id": numeric_or_string(value) }),
        Transform::List => Value::Array(
            super::params::value_to_list(Some(value))
                .into_iter()
                .map(Value::String)
                .collect(),
        ),
        Transform::IdObjects => Value::Array(
            super::params::value_to_list(Some(value))
                .into_iter()
                .map(|id| json!({ "id": id }))
                .collect(),
        ),
        Transform::Singleton => json!([value]),
        Transform::Json => match super::params::parse_json_value(source, Some(value))? {
            Some(v) => v,
            None => return Ok(None),
        },
        Transform::Number => numeric_or_string(value),
        Transform::EmptyObjectFlag => match value.as_bool() {
            Some(true) => json!({}),
            _ => return Ok(None),
        },
    };
    Ok(Some(out))
}

fn numeric_or_string(value: &Value) -> Value {
    match value {
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| value.clone()),
        _ => value.clone(),
    }
}

/// Write every present value named by `mappings` into the request
pub fn apply_field_mappings(
    mappings: &[FieldMapping],
    values: &Map<String, Value>,
    request: &mut HttpRequest,
) -> Result<()> {
    for mapping in mappings {
        let Some(value) = values.get(mapping.source) else {
            continue;
        };
        if is_empty_value(value) {
            continue;
        }
        let Some(value) = apply_transform(mapping.source, value, mapping.transform)? else {
            continue;
        };
        match mapping.target {
            Target::Body(path) => set_by_path(request.json_body_mut(), path, value),
            Target::Query(param) => request.set_query(param, value_to_string(&value)),
        }
    }
    Ok(())
}

/// Fail when the values contain keys no mapping knows about
pub fn ensure_mapped(mappings: &[FieldMapping], values: &Map<String, Value>, extra: &[&str]) -> Result<()> {
    for key in values.keys() {
        let known = mappings.iter().any(|m| m.source == key) || extra.contains(&key.as_str());
        if !known {
            return Err(ConnectorError::validation(format!(
                "field '{}' cannot be mapped onto the request",
                key
            )));
        }
    }
    Ok(())
}

/// Copy an object minus the listed keys
pub fn without_keys(values: &Map<String, Value>, skip: &[&str]) -> Map<String, Value> {
    values
        .iter()
        .filter(|(k, _)| !skip.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Rename object keys using a lookup, keeping unknown keys unchanged
pub fn rename_keys(value: &Value, names: &Map<String, Value>) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let key = names
                        .get(k)
                        .and_then(|n| n.as_str())
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| k.clone());
                    (key, v.clone())
                })
                .collect(),
        ),
        other => other.clone(),
    }
}
