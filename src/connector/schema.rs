//! Field schema definitions
//!
//! Every operation owns an ordered list of `FieldSpec`s. A field is visible
//! when all of its display conditions hold against the values of its
//! siblings; `resolve` uses that to turn raw caller input into validated
//! `Params` with defaults filled in and hidden fields dropped.

use super::params::Params;
use crate::error::{ConnectorError, Result};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    /// Single choice from `options`
    Options,
    /// Any subset of `options`
    MultiOptions,
    /// Object whose keys are optional child fields
    Collection,
    /// Named groups of child fields, each group a list when `multiple`
    FixedCollection,
    /// Raw JSON, given as text or as a JSON value
    Json,
}

/// Literal used for defaults and display conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Str(&'static str),
    Bool(bool),
    Num(f64),
}

impl Literal {
    pub fn to_value(self) -> Value {
        match self {
            Literal::Str(s) => Value::String(s.to_string()),
            Literal::Bool(b) => Value::Bool(b),
            Literal::Num(n) => Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
        }
    }

    fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (Literal::Str(s), Value::String(v)) => s == v,
            (Literal::Bool(b), Value::Bool(v)) => b == *v,
            (Literal::Num(n), Value::Number(v)) => v.as_f64() == Some(n),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionSpec {
    pub name: &'static str,
    pub value: &'static str,
}

/// Show the field only when `field` currently holds one of `any_of`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub field: &'static str,
    pub any_of: Vec<Literal>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: &'static str,
    pub display_name: &'static str,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Literal>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSpec>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub multiple: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub show_when: Vec<Condition>,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub description: &'static str,
}

impl FieldSpec {
    pub fn new(name: &'static str, display_name: &'static str, kind: FieldType) -> Self {
        Self {
            name,
            display_name,
            kind,
            default: None,
            required: false,
            min: None,
            max: None,
            options: Vec::new(),
            fields: Vec::new(),
            multiple: false,
            show_when: Vec::new(),
            description: "",
        }
    }

    pub fn string(name: &'static str, display_name: &'static str) -> Self {
        Self::new(name, display_name, FieldType::String)
    }

    pub fn number(name: &'static str, display_name: &'static str) -> Self {
        Self::new(name, display_name, FieldType::Number)
    }

    pub fn boolean(name: &'static str, display_name: &'static str) -> Self {
        Self::new(name, display_name, FieldType::Boolean).default(Literal::Bool(false))
    }

    pub fn options(
        name: &'static str,
        display_name: &'static str,
        options: &[(&'static str, &'static str)],
    ) -> Self {
        let mut spec = Self::new(name, display_name, FieldType::Options);
        spec.options = option_list(options);
        spec
    }

    pub fn multi_options(
        name: &'static str,
        display_name: &'static str,
        options: &[(&'static str, &'static str)],
    ) -> Self {
        let mut spec = Self::new(name, display_name, FieldType::MultiOptions);
        spec.options = option_list(options);
        spec
    }

    pub fn json(name: &'static str, display_name: &'static str) -> Self {
        Self::new(name, display_name, FieldType::Json)
    }

    pub fn collection(
        name: &'static str,
        display_name: &'static str,
        fields: Vec<FieldSpec>,
    ) -> Self {
        let mut spec = Self::new(name, display_name, FieldType::Collection);
        spec.fields = fields;
        spec
    }

    /// Group container; each child is itself a `Collection` describing one group
    pub fn fixed_collection(
        name: &'static str,
        display_name: &'static str,
        groups: Vec<FieldSpec>,
    ) -> Self {
        let mut spec = Self::new(name, display_name, FieldType::FixedCollection);
        spec.fields = groups;
        spec
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, value: Literal) -> Self {
        self.default = Some(value);
        self
    }

    pub fn default_str(self, value: &'static str) -> Self {
        self.default(Literal::Str(value))
    }

    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn show_when(mut self, field: &'static str, any_of: &[Literal]) -> Self {
        self.show_when.push(Condition {
            field,
            any_of: any_of.to_vec(),
        });
        self
    }

    pub fn show_when_str(self, field: &'static str, any_of: &[&'static str]) -> Self {
        let values: Vec<Literal> = any_of.iter().map(|v| Literal::Str(*v)).collect();
        self.show_when(field, &values)
    }

    pub fn show_when_bool(self, field: &'static str, value: bool) -> Self {
        self.show_when(field, &[Literal::Bool(value)])
    }
}

fn option_list(options: &[(&'static str, &'static str)]) -> Vec<OptionSpec> {
    options
        .iter()
        .map(|&(name, value)| OptionSpec { name, value })
        .collect()
}

/// Standard `returnAll` / `limit` pair used by list operations
pub fn return_all_and_limit(default_limit: f64, max_limit: Option<f64>) -> Vec<FieldSpec> {
    let mut limit = FieldSpec::number("limit", "Limit")
        .default(Literal::Num(default_limit))
        .min(1.0)
        .show_when_bool("returnAll", false)
        .describe("Max number of results to return");
    limit.max = max_limit;
    vec![
        FieldSpec::boolean("returnAll", "Return All")
            .describe("Whether to return all results or only up to a given limit"),
        limit,
    ]
}

/// Value a field currently holds: explicit input first, then its default
fn effective_value(field: &FieldSpec, raw: &Map<String, Value>) -> Option<Value> {
    raw.get(field.name)
        .filter(|v| !v.is_null())
        .cloned()
        .map(|v| coerce(field.kind, v))
        .or_else(|| field.default.map(Literal::to_value))
}

fn is_visible(field: &FieldSpec, fields: &[FieldSpec], raw: &Map<String, Value>) -> bool {
    field.show_when.iter().all(|cond| {
        let current = fields
            .iter()
            .find(|f| f.name == cond.field)
            .and_then(|f| effective_value(f, raw))
            .or_else(|| raw.get(cond.field).cloned());
        match current {
            Some(value) => cond.any_of.iter().any(|lit| lit.matches(&value)),
            None => false,
        }
    })
}

/// Fields visible for the given raw input, in declaration order
pub fn visible_fields<'a>(fields: &'a [FieldSpec], raw: &Map<String, Value>) -> Vec<&'a FieldSpec> {
    fields
        .iter()
        .filter(|f| is_visible(f, fields, raw))
        .collect()
}

/// Validate raw input against the schema and produce resolved parameters
///
/// Hidden fields are dropped, defaults are applied, strings given for
/// numbers or booleans are coerced, and required/bounds/option constraints
/// are enforced.
pub fn resolve(fields: &[FieldSpec], raw: &Map<String, Value>) -> Result<Params> {
    let mut resolved = Map::new();

    for field in visible_fields(fields, raw) {
        let value = match effective_value(field, raw) {
            Some(v) => v,
            None => {
                if field.required {
                    return Err(ConnectorError::missing(field.name));
                }
                continue;
            }
        };

        if field.required && is_blank(&value) {
            return Err(ConnectorError::missing(field.name));
        }

        let value = check_value(field, value, field.name)?;
        resolved.insert(field.name.to_string(), value);
    }

    for key in raw.keys() {
        if !resolved.contains_key(key) {
            debug!("Ignoring parameter '{}' (hidden or unknown)", key);
        }
    }

    Ok(Params::new(resolved))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// Loosen string input for typed fields (CLI `--set key=value` produces strings)
fn coerce(kind: FieldType, value: Value) -> Value {
    match (kind, &value) {
        (FieldType::Number, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|n| {
                if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
                    Some(Value::Number(Number::from(n as i64)))
                } else {
                    Number::from_f64(n).map(Value::Number)
                }
            })
            .unwrap_or(value),
        (FieldType::Boolean, Value::String(s)) => match s.trim() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => value,
        },
        (FieldType::Collection | FieldType::FixedCollection, Value::String(s)) => {
            serde_json::from_str::<Value>(s)
                .ok()
                .filter(|v| v.is_object())
                .unwrap_or(value)
        }
        _ => value,
    }
}

fn check_value(field: &FieldSpec, value: Value, path: &str) -> Result<Value> {
    let type_error = |expected: &str| {
        ConnectorError::validation(format!("parameter '{}' must be {}", path, expected))
    };

    match field.kind {
        FieldType::String => match value {
            Value::String(_) => Ok(value),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            _ => Err(type_error("a string")),
        },
        FieldType::Number => {
            let n = value.as_f64().ok_or_else(|| type_error("a number"))?;
            if let Some(min) = field.min {
                if n < min {
                    return Err(ConnectorError::validation(format!(
                        "parameter '{}' must be at least {}",
                        path, min
                    )));
                }
            }
            if let Some(max) = field.max {
                if n > max {
                    return Err(ConnectorError::validation(format!(
                        "parameter '{}' must be at most {}",
                        path, max
                    )));
                }
            }
            Ok(value)
        }
        FieldType::Boolean => match value {
            Value::Bool(_) => Ok(value),
            _ => Err(type_error("a boolean")),
        },
        FieldType::Options => {
            let s = value.as_str().ok_or_else(|| type_error("a string"))?;
            if field.options.is_empty() || field.options.iter().any(|o| o.value == s) {
                Ok(value)
            } else {
                Err(ConnectorError::validation(format!(
                    "parameter '{}' has unsupported value '{}' (allowed: {})",
                    path,
                    s,
                    field
                        .options
                        .iter()
                        .map(|o| o.value)
                        .collect::<Vec<_>>()
                        .join(", ")
                )))
            }
        }
        FieldType::MultiOptions => {
            let items: Vec<Value> = match value {
                Value::Array(items) => items,
                Value::String(s) => s
                    .split(',')
                    .map(|p| p.trim())
                    .filter(|p| !p.is_empty())
                    .map(|p| Value::String(p.to_string()))
                    .collect(),
                _ => return Err(type_error("a list")),
            };
            for item in &items {
                let s = item.as_str().ok_or_else(|| type_error("a list of strings"))?;
                if !field.options.is_empty() && !field.options.iter().any(|o| o.value == s) {
                    return Err(ConnectorError::validation(format!(
                        "parameter '{}' has unsupported value '{}'",
                        path, s
                    )));
                }
            }
            Ok(Value::Array(items))
        }
        FieldType::Json => Ok(value),
        FieldType::Collection => {
            let map = match value {
                Value::Object(map) => map,
                _ => return Err(type_error("an object")),
            };
            check_children(&field.fields, map, path).map(Value::Object)
        }
        FieldType::FixedCollection => {
            let map = match value {
                Value::Object(map) => map,
                _ => return Err(type_error("an object")),
            };
            let mut out = Map::new();
            for (group_name, group_value) in map {
                let group = field
                    .fields
                    .iter()
                    .find(|g| g.name == group_name)
                    .ok_or_else(|| {
                        ConnectorError::validation(format!(
                            "parameter '{}' has no group '{}'",
                            path, group_name
                        ))
                    })?;
                let group_path = format!("{}.{}", path, group_name);
                let checked = if group.multiple {
                    let entries = match group_value {
                        Value::Array(entries) => entries,
                        single @ Value::Object(_) => vec![single],
                        _ => return Err(type_error("a list of objects")),
                    };
                    let mut checked = Vec::with_capacity(entries.len());
                    for entry in entries {
                        match entry {
                            Value::Object(entry) => checked.push(Value::Object(check_children(
                                &group.fields,
                                entry,
                                &group_path,
                            )?)),
                            _ => return Err(type_error("a list of objects")),
                        }
                    }
                    Value::Array(checked)
                } else {
                    match group_value {
                        Value::Object(entry) => {
                            Value::Object(check_children(&group.fields, entry, &group_path)?)
                        }
                        _ => return Err(type_error("an object")),
                    }
                };
                out.insert(group_name, checked);
            }
            Ok(Value::Object(out))
        }
    }
}

/// Validate the keys of a collection; only supplied keys are kept
fn check_children(children: &[FieldSpec], map: Map<String, Value>, path: &str) -> Result<Map<String, Value>> {
    let mut out = Map::new();
    for (key, value) in map {
        let child = children.iter().find(|c| c.name == key).ok_or_else(|| {
            ConnectorError::validation(format!("parameter '{}' has no option '{}'", path, key))
        })?;
        if value.is_null() {
            continue;
        }
        let child_path = format!("{}.{}", path, key);
        let value = check_value(child, coerce(child.kind, value), &child_path)?;
        out.insert(key, value);
    }
    for child in children.iter().filter(|c| c.required) {
        if !out.contains_key(child.name) {
            return Err(ConnectorError::missing(&format!("{}.{}", path, child.name)));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn document_fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::string("indexId", "Index ID").required(),
            FieldSpec::options(
                "dataToSend",
                "Data to Send",
                &[
                    ("Define Below", "defineBelow"),
                    ("Auto-Map Input Data", "autoMapInputData"),
                ],
            )
            .default_str("defineBelow"),
            FieldSpec::string("inputsToIgnore", "Inputs to Ignore")
                .show_when_str("dataToSend", &["autoMapInputData"]),
            FieldSpec::fixed_collection(
                "fieldsUi",
                "Fields",
                vec![FieldSpec::collection(
                    "fieldValues",
                    "Field",
                    vec![
                        FieldSpec::string("fieldId", "Field Name").required(),
                        FieldSpec::string("fieldValue", "Field Value"),
                    ],
                )
                .multiple()],
            )
            .show_when_str("dataToSend", &["defineBelow"]),
        ]
    }

    #[test]
    fn test_discriminator_selects_one_group() {
        let fields = document_fields();
        let input = raw(json!({
            "indexId": "books",
            "dataToSend": "autoMapInputData",
            "inputsToIgnore": "secret",
            "fieldsUi": {"fieldValues": [{"fieldId": "title", "fieldValue": "Dune"}]}
        }));

        let params = resolve(&fields, &input).unwrap();
        assert!(params.contains("inputsToIgnore"));
        assert!(!params.contains("fieldsUi"));

        let input = raw(json!({
            "indexId": "books",
            "inputsToIgnore": "secret",
            "fieldsUi": {"fieldValues": [{"fieldId": "title", "fieldValue": "Dune"}]}
        }));
        let params = resolve(&fields, &input).unwrap();
        assert!(!params.contains("inputsToIgnore"));
        assert!(params.contains("fieldsUi"));
        assert_eq!(params.str("dataToSend"), Some("defineBelow"));
    }

    #[test]
    fn test_required_field_missing() {
        let fields = document_fields();
        let err = resolve(&fields, &raw(json!({}))).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("indexId"));

        let err = resolve(&fields, &raw(json!({"indexId": "  "}))).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_nested_required_child() {
        let fields = document_fields();
        let input = raw(json!({
            "indexId": "books",
            "fieldsUi": {"fieldValues": [{"fieldValue": "Dune"}]}
        }));
        let err = resolve(&fields, &input).unwrap_err();
        assert!(err.to_string().contains("fieldsUi.fieldValues.fieldId"));
    }

    #[test]
    fn test_limit_bounds_and_visibility() {
        let fields = return_all_and_limit(50.0, Some(100.0));

        let params = resolve(&fields, &raw(json!({}))).unwrap();
        assert_eq!(params.u64("limit"), Some(50));

        let params = resolve(&fields, &raw(json!({"returnAll": true, "limit": 500}))).unwrap();
        assert!(!params.contains("limit"));

        let err = resolve(&fields, &raw(json!({"limit": 500}))).unwrap_err();
        assert!(err.to_string().contains("at most 100"));

        let err = resolve(&fields, &raw(json!({"limit": 0}))).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_string_inputs_are_coerced() {
        let fields = return_all_and_limit(50.0, None);
        let params = resolve(&fields, &raw(json!({"returnAll": "false", "limit": "7"}))).unwrap();
        assert!(!params.bool("returnAll"));
        assert_eq!(params.u64("limit"), Some(7));
    }

    #[test]
    fn test_unknown_option_rejected() {
        let fields = document_fields();
        let err = resolve(&fields, &raw(json!({"indexId": "x", "dataToSend": "magic"}))).unwrap_err();
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn test_unknown_collection_key_rejected() {
        let fields = vec![FieldSpec::collection(
            "additionalFields",
            "Additional Fields",
            vec![FieldSpec::string("title", "Title")],
        )];
        let err = resolve(&fields, &raw(json!({"additionalFields": {"titel": "x"}}))).unwrap_err();
        assert!(err.to_string().contains("titel"));
    }

    #[test]
    fn test_multi_options_from_csv() {
        let fields = vec![FieldSpec::multi_options(
            "expand",
            "Expand",
            &[("Groups", "groups"), ("Application Roles", "applicationRoles")],
        )];
        let params = resolve(&fields, &raw(json!({"expand": "groups, applicationRoles"}))).unwrap();
        assert_eq!(params.get("expand"), Some(&json!(["groups", "applicationRoles"])));
    }

    #[test]
    fn test_schema_serializes_for_describe() {
        let fields = return_all_and_limit(50.0, None);
        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(value[0]["name"], "returnAll");
        assert_eq!(value[0]["type"], "boolean");
        assert_eq!(value[1]["showWhen"][0]["field"], "returnAll");
        assert_eq!(value[1]["showWhen"][0]["anyOf"][0], false);
    }
}
