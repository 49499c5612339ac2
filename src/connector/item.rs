//! Input and output records

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Binary payload attached to a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryData {
    #[serde(serialize_with = "to_base64", deserialize_with = "from_base64")]
    pub data: Vec<u8>,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    #[serde(default)]
    pub file_size: usize,
}

impl BinaryData {
    pub fn new(data: Vec<u8>, mime_type: &str, file_name: Option<&str>) -> Self {
        let file_extension = file_name
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty());
        Self {
            file_size: data.len(),
            data,
            mime_type: mime_type.to_string(),
            file_name: file_name.map(|n| n.to_string()),
            file_extension,
        }
    }
}

fn to_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(data))
}

fn from_base64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let text = String::deserialize(deserializer)?;
    STANDARD
        .decode(text.as_bytes())
        .map_err(serde::de::Error::custom)
}

/// One record handed in by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputItem {
    /// Field values for the operation
    #[serde(default)]
    pub params: Map<String, Value>,
    /// Record payload, used by auto-mapping operations
    #[serde(default)]
    pub json: Map<String, Value>,
    #[serde(default)]
    pub binary: BTreeMap<String, BinaryData>,
}

/// One record produced by an operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    pub json: Value,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub binary: BTreeMap<String, BinaryData>,
    /// Index of the input record this output came from
    pub paired_item: usize,
}

impl OutputItem {
    pub fn new(json: Value, paired_item: usize) -> Self {
        Self {
            json,
            binary: BTreeMap::new(),
            paired_item,
        }
    }

    pub fn with_binary(mut self, property: &str, data: BinaryData) -> Self {
        self.binary.insert(property.to_string(), data);
        self
    }
}
