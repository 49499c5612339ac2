//! Response normalization
//!
//! Turns raw responses into output records and handles the two-step
//! binary flow: metadata first, then (only when asked) the bytes behind the
//! record's content reference.

use super::item::{BinaryData, OutputItem};
use super::path_extractor::{extract_by_path, extract_list};
use crate::error::{ConnectorError, Result};
use crate::http::{ApiClient, HttpRequest};
use serde_json::{json, Value};
use tracing::debug;

/// Split a response into records found at `path`
pub fn to_records(response: &Value, path: &str, paired_item: usize) -> Vec<OutputItem> {
    extract_list(response, path)
        .into_iter()
        .map(|value| OutputItem::new(wrap_scalar(value), paired_item))
        .collect()
}

/// Records must be objects; scalars are wrapped
fn wrap_scalar(value: Value) -> Value {
    match value {
        Value::Object(_) => value,
        other => json!({ "value": other }),
    }
}

/// Turn a list of values into output records
pub fn records_from(values: Vec<Value>, paired_item: usize) -> Vec<OutputItem> {
    values
        .into_iter()
        .map(|value| OutputItem::new(wrap_scalar(value), paired_item))
        .collect()
}

/// Where to find the content reference and file metadata on an item
#[derive(Debug, Clone, Copy)]
pub struct DownloadSpec<'a> {
    pub url_path: &'a str,
    pub file_name_path: &'a str,
    pub mime_type_path: &'a str,
    /// Output property the bytes are stored under
    pub property: &'a str,
}

/// Fetch the bytes referenced by `item` and attach them to the record
pub async fn attach_download(
    client: &ApiClient,
    item: Value,
    spec: DownloadSpec<'_>,
    paired_item: usize,
) -> Result<OutputItem> {
    let url = extract_by_path(&item, spec.url_path)
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| {
            ConnectorError::data_shape(format!(
                "item has no '{}' to download from",
                spec.url_path.trim_start_matches('/')
            ))
        })?;

    let file_name = extract_by_path(&item, spec.file_name_path)
        .as_str()
        .map(|s| s.to_string());
    let mime_type = extract_by_path(&item, spec.mime_type_path)
        .as_str()
        .unwrap_or("application/octet-stream")
        .to_string();

    debug!("Downloading {} into property '{}'", url, spec.property);
    let bytes = client.bytes(HttpRequest::get(url)).await?;
    let binary = BinaryData::new(bytes.to_vec(), &mime_type, file_name.as_deref());

    Ok(OutputItem::new(wrap_scalar(item), paired_item).with_binary(spec.property, binary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Auth, Endpoint, MockTransport};
    use std::sync::Arc;

    const SPEC: DownloadSpec<'static> = DownloadSpec {
        url_path: "/content",
        file_name_path: "/filename",
        mime_type_path: "/mimeType",
        property: "data",
    };

    fn client(transport: Arc<MockTransport>) -> ApiClient {
        ApiClient::new(
            transport,
            "test",
            Endpoint {
                base_url: "https://acme.atlassian.net/rest".to_string(),
                auth: Auth::Bearer("t".to_string()),
            },
        )
    }

    #[test]
    fn test_to_records_wraps_scalars() {
        let records = to_records(&json!({"items": [{"a": 1}, "plain"]}), "/items", 2);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].json, json!({"value": "plain"}));
        assert_eq!(records[0].paired_item, 2);
    }

    #[tokio::test]
    async fn test_attach_download() {
        let transport = Arc::new(MockTransport::new().push_bytes(b"%PDF"));
        let item = json!({
            "id": "10",
            "filename": "spec.pdf",
            "mimeType": "application/pdf",
            "content": "https://acme.atlassian.net/rest/api/3/attachment/content/10"
        });

        let out = attach_download(&client(transport.clone()), item, SPEC, 0)
            .await
            .unwrap();

        let binary = &out.binary["data"];
        assert_eq!(binary.data, b"%PDF");
        assert_eq!(binary.mime_type, "application/pdf");
        assert_eq!(binary.file_name.as_deref(), Some("spec.pdf"));
        assert_eq!(
            transport.requests()[0].url,
            "https://acme.atlassian.net/rest/api/3/attachment/content/10"
        );
    }

    #[tokio::test]
    async fn test_missing_content_is_data_shape_error() {
        let transport = Arc::new(MockTransport::new());
        let err = attach_download(&client(transport.clone()), json!({"id": "10"}), SPEC, 0)
            .await
            .unwrap_err();

        assert!(matches!(err, ConnectorError::DataShape(_)));
        assert_eq!(transport.request_count(), 0);
    }
}
