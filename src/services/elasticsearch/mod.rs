//! Elasticsearch document and index operations

mod fields;

use super::segment;
use crate::connector::field_mapper::{apply_field_mappings, without_keys, FieldMapping, Transform};
use crate::connector::pagination::{fetch_paged, PageStrategy, ParamLocation};
use crate::connector::schema::FieldSpec;
use crate::connector::{OutputItem, RequestContext, ServiceOperation};
use crate::error::{ConnectorError, Result};
use crate::http::HttpRequest;
use serde_json::{json, Map, Value};
use tracing::debug;

const SEARCH_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElasticsearchOperation {
    DocumentCreate,
    DocumentDelete,
    DocumentGet,
    DocumentGetAll,
    DocumentUpdate,
    IndexCreate,
    IndexDelete,
    IndexGet,
    IndexGetAll,
}

impl ServiceOperation for ElasticsearchOperation {
    const ALL: &'static [Self] = &[
        Self::DocumentCreate,
        Self::DocumentDelete,
        Self::DocumentGet,
        Self::DocumentGetAll,
        Self::DocumentUpdate,
        Self::IndexCreate,
        Self::IndexDelete,
        Self::IndexGet,
        Self::IndexGetAll,
    ];

    fn resource(self) -> &'static str {
        match self {
            Self::DocumentCreate
            | Self::DocumentDelete
            | Self::DocumentGet
            | Self::DocumentGetAll
            | Self::DocumentUpdate => "document",
            Self::IndexCreate | Self::IndexDelete | Self::IndexGet | Self::IndexGetAll => "index",
        }
    }

    fn operation(self) -> &'static str {
        match self {
            Self::DocumentCreate | Self::IndexCreate => "create",
            Self::DocumentDelete | Self::IndexDelete => "delete",
            Self::DocumentGet | Self::IndexGet => "get",
            Self::DocumentGetAll | Self::IndexGetAll => "getAll",
            Self::DocumentUpdate => "update",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::DocumentCreate => "Create a document",
            Self::DocumentDelete => "Delete a document",
            Self::DocumentGet => "Get a document",
            Self::DocumentGetAll => "Search documents in an index",
            Self::DocumentUpdate => "Update a document",
            Self::IndexCreate => "Create an index",
            Self::IndexDelete => "Delete an index",
            Self::IndexGet => "Get an index",
            Self::IndexGetAll => "List all indices",
        }
    }

    fn fields(self) -> Vec<FieldSpec> {
        match self {
            Self::DocumentCreate => fields::document_create(),
            Self::DocumentDelete => fields::document_delete(),
            Self::DocumentGet => fields::document_get(),
            Self::DocumentGetAll => fields::document_get_all(),
            Self::DocumentUpdate => fields::document_update(),
            Self::IndexCreate => fields::index_create(),
            Self::IndexDelete => fields::index_delete(),
            Self::IndexGet => fields::index_get(),
            Self::IndexGetAll => fields::index_get_all(),
        }
    }
}

const CREATE_OPTIONS: &[FieldMapping] = &[
    FieldMapping::query("pipeline", "pipeline"),
    FieldMapping::query("refresh", "refresh"),
    FieldMapping::query("routing", "routing"),
    FieldMapping::query("timeout", "timeout"),
];

const GET_OPTIONS: &[FieldMapping] = &[
    FieldMapping::query("_source_excludes", "_source_excludes"),
    FieldMapping::query("_source_includes", "_source_includes"),
    FieldMapping::query("stored_fields", "stored_fields"),
];

// `query` is the request body and is handled separately
const SEARCH_OPTIONS: &[FieldMapping] = &[
    FieldMapping::query("q", "q"),
    FieldMapping::query("analyze_wildcard", "analyze_wildcard"),
    FieldMapping::query("default_operator", "default_operator"),
    FieldMapping::query("df", "df"),
    FieldMapping::query("sort", "sort"),
    FieldMapping::query("_source", "_source"),
    FieldMapping::query("_source_excludes", "_source_excludes"),
    FieldMapping::query("_source_includes", "_source_includes"),
    FieldMapping::query("stored_fields", "stored_fields"),
    FieldMapping::query("terminate_after", "terminate_after"),
    FieldMapping::query("timeout", "timeout"),
    FieldMapping::query("track_scores", "track_scores"),
    FieldMapping::query("track_total_hits", "track_total_hits"),
];

const INDEX_CREATE_FIELDS: &[FieldMapping] = &[
    FieldMapping::body("aliases", "aliases").with(Transform::Json),
    FieldMapping::body("mappings", "mappings").with(Transform::Json),
    FieldMapping::body("settings", "settings").with(Transform::Json),
    FieldMapping::query("master_timeout", "master_timeout"),
    FieldMapping::query("timeout", "timeout"),
    FieldMapping::query("wait_for_active_shards", "wait_for_active_shards"),
];

const INDEX_GET_OPTIONS: &[FieldMapping] = &[
    FieldMapping::query("allow_no_indices", "allow_no_indices"),
    FieldMapping::query("expand_wildcards", "expand_wildcards"),
    FieldMapping::query("flat_settings", "flat_settings"),
    FieldMapping::query("ignore_unavailable", "ignore_unavailable"),
    FieldMapping::query("include_defaults", "include_defaults"),
    FieldMapping::query("local", "local"),
    FieldMapping::query("master_timeout", "master_timeout"),
];

pub async fn execute(op: ElasticsearchOperation, ctx: &RequestContext<'_>) -> Result<Vec<OutputItem>> {
    use ElasticsearchOperation::*;

    let params = ctx.params;
    let index_id = params.required_str("indexId").map(segment);

    let response = match op {
        DocumentCreate => {
            let index = index_id?;
            let body = document_body(ctx);
            let mut request = match params.str("documentId") {
                Some(id) => HttpRequest::put(format!("/{}/_doc/{}", index, segment(id))),
                None => HttpRequest::post(format!("/{}/_doc", index)),
            }
            .json(Value::Object(body));
            apply_field_mappings(CREATE_OPTIONS, &params.collection("additionalOptions"), &mut request)?;
            ctx.client.json(request).await?
        }
        DocumentDelete => {
            let id = segment(params.required_str("documentId")?);
            ctx.client
                .json(HttpRequest::delete(format!("/{}/_doc/{}", index_id?, id)))
                .await?
        }
        DocumentGet => {
            let id = segment(params.required_str("documentId")?);
            let mut request = HttpRequest::get(format!("/{}/_doc/{}", index_id?, id));
            apply_field_mappings(GET_OPTIONS, &params.collection("options"), &mut request)?;
            let document = ctx.client.json(request).await?;
            if params.bool("simple") {
                simplify_hit(&document)
            } else {
                document
            }
        }
        DocumentGetAll => return search(ctx, &index_id?).await,
        DocumentUpdate => {
            let id = segment(params.required_str("documentId")?);
            let body = document_body(ctx);
            let request = HttpRequest::post(format!("/{}/_update/{}", index_id?, id))
                .json(json!({ "doc": body }));
            ctx.client.json(request).await?
        }
        IndexCreate => {
            let index = index_id?;
            let mut request = HttpRequest::put(format!("/{}", index)).json(json!({}));
            apply_field_mappings(INDEX_CREATE_FIELDS, &params.collection("additionalFields"), &mut request)?;
            let mut created = match ctx.client.json(request).await? {
                Value::Object(map) => map,
                other => return Ok(vec![OutputItem::new(other, ctx.index)]),
            };
            created.remove("index");
            let mut out = Map::new();
            out.insert("indexId".to_string(), json!(params.required_str("indexId")?));
            out.extend(created);
            Value::Object(out)
        }
        IndexDelete => {
            ctx.client
                .json(HttpRequest::delete(format!("/{}", index_id?)))
                .await?
        }
        IndexGet => {
            let mut request = HttpRequest::get(format!("/{}", index_id?));
            apply_field_mappings(INDEX_GET_OPTIONS, &params.collection("additionalFields"), &mut request)?;
            let response = ctx.client.json(request).await?;
            let (name, details) = response
                .as_object()
                .and_then(|m| m.iter().next())
                .ok_or_else(|| ConnectorError::data_shape("index response has no index entry"))?;
            let mut out = Map::new();
            out.insert("indexId".to_string(), json!(name));
            if let Value::Object(details) = details {
                out.extend(details.clone());
            }
            Value::Object(out)
        }
        IndexGetAll => {
            let response = ctx.client.json(HttpRequest::get("/_aliases")).await?;
            let mut indices: Vec<Value> = response
                .as_object()
                .map(|m| m.keys().map(|name| json!({ "indexId": name })).collect())
                .unwrap_or_default();
            params.limit().truncate(&mut indices);
            return Ok(indices
                .into_iter()
                .map(|v| OutputItem::new(v, ctx.index))
                .collect());
        }
    };

    Ok(vec![OutputItem::new(response, ctx.index)])
}

/// Document body from whichever `dataToSend` group is active
fn document_body(ctx: &RequestContext<'_>) -> Map<String, Value> {
    match ctx.params.str("dataToSend") {
        Some("autoMapInputData") => {
            let ignore = ctx.params.list("inputsToIgnore");
            let skip: Vec<&str> = ignore.iter().map(String::as_str).collect();
            without_keys(&ctx.item.json, &skip)
        }
        _ => ctx
            .params
            .group_entries("fieldsUi", "fieldValues")
            .into_iter()
            .filter_map(|entry| {
                let name = entry.get("fieldId")?.as_str()?.to_string();
                let value = entry.get("fieldValue").cloned().unwrap_or(json!(""));
                Some((name, value))
            })
            .collect(),
    }
}

/// `{_id, ..._source}`
fn simplify_hit(hit: &Value) -> Value {
    let mut out = Map::new();
    out.insert("_id".to_string(), hit.get("_id").cloned().unwrap_or(Value::Null));
    if let Some(Value::Object(source)) = hit.get("_source") {
        out.extend(source.clone());
    }
    Value::Object(out)
}

async fn search(ctx: &RequestContext<'_>, index: &str) -> Result<Vec<OutputItem>> {
    let params = ctx.params;
    let options = params.collection("options");

    let mut request = HttpRequest::get(format!("/{}/_search", index));
    if let Some(query) = crate::connector::params::parse_json_value("query", options.get("query"))? {
        let mut body = match query {
            Value::Object(map) => map,
            _ => return Err(ConnectorError::validation("parameter 'query' must be a JSON object")),
        };
        // Paging owns from/size
        for key in ["from", "size"] {
            if body.remove(key).is_some() {
                debug!("Ignoring '{}' in search body", key);
            }
        }
        request = request.json(Value::Object(body));
    }
    apply_field_mappings(SEARCH_OPTIONS, &options, &mut request)?;

    let strategy = PageStrategy::Offset {
        offset_param: "from",
        size_param: "size",
        page_size: SEARCH_PAGE_SIZE,
        location: ParamLocation::Query,
        total_path: Some("/hits/total/value"),
    };
    let hits = fetch_paged(ctx.client, request, strategy, "/hits/hits", params.limit()).await?;

    let simple = params.bool("simple");
    Ok(hits
        .into_iter()
        .map(|hit| {
            let json = if simple { simplify_hit(&hit) } else { hit };
            OutputItem::new(json, ctx.index)
        })
        .collect())
}
