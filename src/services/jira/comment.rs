//! Issue comment operations
//!
//! Cloud talks REST v3 and wraps text in the Atlassian Document Format;
//! server talks REST v2 with plain strings. Raw JSON bodies go out verbatim.

use super::version::JiraApi;
use crate::connector::normalize::records_from;
use crate::connector::pagination::{fetch_paged, PageStrategy, ParamLocation};
use crate::connector::{OutputItem, RequestContext};
use crate::error::{ConnectorError, Result};
use crate::http::HttpRequest;
use crate::services::segment;
use serde_json::{json, Value};

const PAGE_SIZE: usize = 50;

fn comments_path(ctx: &RequestContext<'_>, api: &dyn JiraApi) -> Result<String> {
    let key = segment(ctx.params.required_str("issueKey")?);
    Ok(format!("/api/{}/issue/{}/comment", api.comment_api(), key))
}

fn comment_path(ctx: &RequestContext<'_>, api: &dyn JiraApi) -> Result<String> {
    let id = segment(ctx.params.required_str("commentId")?);
    Ok(format!("{}/{}", comments_path(ctx, api)?, id))
}

/// `{"body": ...}` from the text field, or the caller's JSON as is
fn comment_body(ctx: &RequestContext<'_>, api: &dyn JiraApi) -> Result<Value> {
    let params = ctx.params;
    if params.bool("jsonParameters") {
        return match params.json("commentJson")? {
            Some(body) => Ok(body),
            None => Err(ConnectorError::missing("commentJson")),
        };
    }
    let text = params.required_str("comment")?;
    Ok(json!({ "body": api.comment_body(text) }))
}

fn with_expand(mut request: HttpRequest, ctx: &RequestContext<'_>) -> HttpRequest {
    let options = ctx.params.collection("options");
    if let Some(expand) = options.get("expand").and_then(Value::as_str).filter(|e| !e.is_empty()) {
        request.set_query("expand", expand);
    }
    request
}

pub async fn add(ctx: &RequestContext<'_>, api: &dyn JiraApi) -> Result<Vec<OutputItem>> {
    let body = comment_body(ctx, api)?;
    let request = with_expand(HttpRequest::post(comments_path(ctx, api)?), ctx).json(body);
    let comment = ctx.client.json(request).await?;
    Ok(vec![OutputItem::new(comment, ctx.index)])
}

pub async fn get(ctx: &RequestContext<'_>, api: &dyn JiraApi) -> Result<Vec<OutputItem>> {
    let request = with_expand(HttpRequest::get(comment_path(ctx, api)?), ctx);
    let comment = ctx.client.json(request).await?;
    Ok(vec![OutputItem::new(comment, ctx.index)])
}

pub async fn get_all(ctx: &RequestContext<'_>, api: &dyn JiraApi) -> Result<Vec<OutputItem>> {
    let mut request = with_expand(HttpRequest::get(comments_path(ctx, api)?), ctx);
    let options = ctx.params.collection("options");
    if let Some(order) = options.get("orderBy").and_then(Value::as_str) {
        request.set_query("orderBy", order);
    }

    let strategy = PageStrategy::Offset {
        offset_param: "startAt",
        size_param: "maxResults",
        page_size: PAGE_SIZE,
        location: ParamLocation::Query,
        total_path: Some("/total"),
    };
    let comments = fetch_paged(ctx.client, request, strategy, "/comments", ctx.params.limit()).await?;
    Ok(records_from(comments, ctx.index))
}

pub async fn remove(ctx: &RequestContext<'_>, api: &dyn JiraApi) -> Result<Vec<OutputItem>> {
    let response = ctx
        .client
        .json(HttpRequest::delete(comment_path(ctx, api)?))
        .await?;
    Ok(vec![OutputItem::new(response, ctx.index)])
}

pub async fn update(ctx: &RequestContext<'_>, api: &dyn JiraApi) -> Result<Vec<OutputItem>> {
    let body = comment_body(ctx, api)?;
    let request = with_expand(HttpRequest::put(comment_path(ctx, api)?), ctx).json(body);
    let comment = ctx.client.json(request).await?;
    Ok(vec![OutputItem::new(comment, ctx.index)])
}
