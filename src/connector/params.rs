//! Resolved operation parameters
//!
//! `Params` wraps the validated field values for one record and offers typed
//! accessors. Empty strings count as absent everywhere.

use super::pagination::Limit;
use crate::error::{ConnectorError, Result};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Non-empty string value
    pub fn str(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn required_str(&self, name: &str) -> Result<&str> {
        self.str(name).ok_or_else(|| ConnectorError::missing(name))
    }

    pub fn bool(&self, name: &str) -> bool {
        self.0.get(name).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    pub fn u64(&self, name: &str) -> Option<u64> {
        self.0.get(name).and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64))
        })
    }

    /// Object value of a collection field; empty when absent
    pub fn collection(&self, name: &str) -> Map<String, Value> {
        self.0
            .get(name)
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default()
    }

    /// Entries of one group inside a fixed collection
    pub fn group_entries(&self, name: &str, group: &str) -> Vec<Map<String, Value>> {
        match self.0.get(name).and_then(|v| v.get(group)) {
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(|e| e.as_object().cloned())
                .collect(),
            Some(Value::Object(entry)) => vec![entry.clone()],
            _ => Vec::new(),
        }
    }

    /// String list from a multi-options field or a comma separated string
    pub fn list(&self, name: &str) -> Vec<String> {
        value_to_list(self.0.get(name))
    }

    /// Raw JSON parameter: parses text, passes JSON values through
    pub fn json(&self, name: &str) -> Result<Option<Value>> {
        parse_json_value(name, self.0.get(name))
    }

    /// `returnAll` / `limit` pair
    pub fn limit(&self) -> Limit {
        if self.bool("returnAll") {
            Limit::All
        } else {
            Limit::Max(self.u64("limit").unwrap_or(50) as usize)
        }
    }
}

/// Comma separated string or array of strings to a list
pub fn value_to_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s
            .split(',')
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(|p| p.to_string())
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse a raw-JSON parameter, failing validation on malformed text
pub fn parse_json_value(name: &str, value: Option<&Value>) -> Result<Option<Value>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => serde_json::from_str(text).map(Some).map_err(|e| {
            ConnectorError::validation(format!("parameter '{}' is not valid JSON: {}", name, e))
        }),
        Some(other) => Ok(Some(other.clone())),
    }
}
