//! Issue attachment operations

use crate::connector::normalize::{attach_download, records_from, DownloadSpec};
use crate::connector::path_extractor::extract_list;
use crate::connector::{OutputItem, RequestContext};
use crate::error::{ConnectorError, Result};
use crate::http::{FilePart, HttpRequest};
use crate::services::segment;
use serde_json::Value;
use tracing::{debug, warn};

fn download_spec(property: &str) -> DownloadSpec<'_> {
    DownloadSpec {
        url_path: "/content",
        file_name_path: "/filename",
        mime_type_path: "/mimeType",
        property,
    }
}

/// Metadata records, with content attached when `download` is set
///
/// An attachment without a content reference keeps its metadata plus an
/// `error` field; its siblings are still downloaded.
async fn finish(ctx: &RequestContext<'_>, attachments: Vec<Value>) -> Result<Vec<OutputItem>> {
    if !ctx.params.bool("download") {
        return Ok(records_from(attachments, ctx.index));
    }
    let property = ctx.params.required_str("binaryPropertyName")?;
    let mut out = Vec::with_capacity(attachments.len());
    for attachment in attachments {
        let result = attach_download(ctx.client, attachment.clone(), download_spec(property), ctx.index).await;
        match result {
            Ok(record) => out.push(record),
            Err(err @ ConnectorError::DataShape(_)) => {
                warn!("Skipping download of attachment {}: {}", attachment["id"], err);
                let mut record = attachment;
                if let Value::Object(map) = &mut record {
                    map.insert("error".to_string(), Value::String(err.to_string()));
                }
                out.push(OutputItem::new(record, ctx.index));
            }
            Err(err) => return Err(err),
        }
    }
    Ok(out)
}

pub async fn add(ctx: &RequestContext<'_>) -> Result<Vec<OutputItem>> {
    let params = ctx.params;
    let key = segment(params.required_str("issueKey")?);
    let property = params.required_str("binaryPropertyName")?;
    let binary = ctx.item.binary.get(property).ok_or_else(|| {
        ConnectorError::validation(format!("record has no binary property '{}'", property))
    })?;

    let file = FilePart {
        field: "file".to_string(),
        file_name: binary
            .file_name
            .clone()
            .unwrap_or_else(|| property.to_string()),
        mime_type: binary.mime_type.clone(),
        data: binary.data.clone(),
    };
    debug!("Uploading {} ({} bytes) to {}", file.file_name, file.data.len(), key);

    let request = HttpRequest::post(format!("/api/3/issue/{}/attachments", key))
        .header("X-Atlassian-Token", "no-check")
        .multipart(file);
    let response = ctx.client.json(request).await?;
    Ok(records_from(extract_list(&response, ""), ctx.index))
}

pub async fn get(ctx: &RequestContext<'_>) -> Result<Vec<OutputItem>> {
    let id = segment(ctx.params.required_str("attachmentId")?);
    let attachment = ctx
        .client
        .json(HttpRequest::get(format!("/api/3/attachment/{}", id)))
        .await?;
    finish(ctx, vec![attachment]).await
}

pub async fn get_all(ctx: &RequestContext<'_>) -> Result<Vec<OutputItem>> {
    let params = ctx.params;
    let key = segment(params.required_str("issueKey")?);
    let issue = ctx
        .client
        .json(HttpRequest::get(format!("/api/2/issue/{}", key)).query("fields", "attachment"))
        .await?;
    let mut attachments = extract_list(&issue, "/fields/attachment");
    params.limit().truncate(&mut attachments);
    finish(ctx, attachments).await
}

pub async fn remove(ctx: &RequestContext<'_>) -> Result<Vec<OutputItem>> {
    let id = segment(ctx.params.required_str("attachmentId")?);
    let response = ctx
        .client
        .json(HttpRequest::delete(format!("/api/3/attachment/{}", id)))
        .await?;
    Ok(vec![OutputItem::new(response, ctx.index)])
}
