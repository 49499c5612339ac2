//! Raindrop bookmark, collection, tag and user operations

mod fields;

use super::segment;
use crate::connector::field_mapper::{apply_field_mappings, ensure_mapped, FieldMapping, Transform};
use crate::connector::normalize::{records_from, to_records};
use crate::connector::pagination::{fetch_paged, PageStrategy};
use crate::connector::path_extractor::{extract_by_path, extract_list, is_empty_value};
use crate::connector::schema::FieldSpec;
use crate::connector::{OutputItem, RequestContext, ServiceOperation};
use crate::error::{ConnectorError, Result};
use crate::http::HttpRequest;
use serde_json::{json, Map, Value};

/// Raindrop caps `perpage` at 50
const PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaindropOperation {
    BookmarkCreate,
    BookmarkDelete,
    BookmarkGet,
    BookmarkGetAll,
    BookmarkUpdate,
    CollectionCreate,
    CollectionDelete,
    CollectionGet,
    CollectionGetAll,
    CollectionUpdate,
    TagDelete,
    TagGetAll,
    UserGet,
}

impl ServiceOperation for RaindropOperation {
    const ALL: &'static [Self] = &[
        Self::BookmarkCreate,
        Self::BookmarkDelete,
        Self::BookmarkGet,
        Self::BookmarkGetAll,
        Self::BookmarkUpdate,
        Self::CollectionCreate,
        Self::CollectionDelete,
        Self::CollectionGet,
        Self::CollectionGetAll,
        Self::CollectionUpdate,
        Self::TagDelete,
        Self::TagGetAll,
        Self::UserGet,
    ];

    fn resource(self) -> &'static str {
        use RaindropOperation::*;
        match self {
            BookmarkCreate | BookmarkDelete | BookmarkGet | BookmarkGetAll | BookmarkUpdate => "bookmark",
            CollectionCreate | CollectionDelete | CollectionGet | CollectionGetAll | CollectionUpdate => {
                "collection"
            }
            TagDelete | TagGetAll => "tag",
            UserGet => "user",
        }
    }

    fn operation(self) -> &'static str {
        use RaindropOperation::*;
        match self {
            BookmarkCreate | CollectionCreate => "create",
            BookmarkDelete | CollectionDelete | TagDelete => "delete",
            BookmarkGet | CollectionGet | UserGet => "get",
            BookmarkGetAll | CollectionGetAll | TagGetAll => "getAll",
            BookmarkUpdate | CollectionUpdate => "update",
        }
    }

    fn description(self) -> &'static str {
        use RaindropOperation::*;
        match self {
            BookmarkCreate => "Create a bookmark",
            BookmarkDelete => "Delete a bookmark",
            BookmarkGet => "Get a bookmark",
            BookmarkGetAll => "List the bookmarks of a collection",
            BookmarkUpdate => "Update a bookmark",
            CollectionCreate => "Create a collection",
            CollectionDelete => "Delete a collection",
            CollectionGet => "Get a collection",
            CollectionGetAll => "List root or nested collections",
            CollectionUpdate => "Update a collection",
            TagDelete => "Remove tags",
            TagGetAll => "List tags",
            UserGet => "Get a user",
        }
    }

    fn fields(self) -> Vec<FieldSpec> {
        use RaindropOperation::*;
        match self {
            BookmarkCreate => fields::bookmark_create(),
            BookmarkDelete => fields::bookmark_delete(),
            BookmarkGet => fields::bookmark_get(),
            BookmarkGetAll => fields::bookmark_get_all(),
            BookmarkUpdate => fields::bookmark_update(),
            CollectionCreate => fields::collection_create(),
            CollectionDelete => fields::collection_delete(),
            CollectionGet => fields::collection_get(),
            CollectionGetAll => fields::collection_get_all(),
            CollectionUpdate => fields::collection_update(),
            TagDelete => fields::tag_delete(),
            TagGetAll => fields::tag_get_all(),
            UserGet => fields::user_get(),
        }
    }
}

/// Shared by bookmark create and update
const BOOKMARK_FIELDS: &[FieldMapping] = &[
    FieldMapping::body("link", "link"),
    FieldMapping::body("collectionId", "collection").with(Transform::DollarId),
    FieldMapping::body("important", "important"),
    FieldMapping::body("order", "order").with(Transform::Number),
    FieldMapping::body("pleaseParse", "pleaseParse").with(Transform::EmptyObjectFlag),
    FieldMapping::body("tags", "tags").with(Transform::List),
    FieldMapping::body("title", "title"),
];

/// Shared by collection create and update
const COLLECTION_FIELDS: &[FieldMapping] = &[
    FieldMapping::body("title", "title"),
    FieldMapping::body("cover", "cover").with(Transform::Singleton),
    FieldMapping::body("parentId", "parent").with(Transform::DollarId),
    FieldMapping::body("public", "public"),
    FieldMapping::body("sort", "sort").with(Transform::Number),
    FieldMapping::body("view", "view"),
];

fn write_request(
    mut request: HttpRequest,
    mappings: &[FieldMapping],
    values: &Map<String, Value>,
) -> Result<HttpRequest> {
    ensure_mapped(mappings, values, &[])?;
    apply_field_mappings(mappings, values, &mut request)?;
    Ok(request)
}

/// Raindrop wraps single records as `{"result": true, "item": {...}}`
fn unwrap_item(response: Value, key: &str) -> Result<Value> {
    match extract_by_path(&response, key) {
        Value::Null => Err(ConnectorError::data_shape(format!(
            "response has no '{}'",
            key.trim_start_matches('/')
        ))),
        item => Ok(item),
    }
}

pub async fn execute(op: RaindropOperation, ctx: &RequestContext<'_>) -> Result<Vec<OutputItem>> {
    use RaindropOperation::*;

    let params = ctx.params;
    let client = ctx.client;
    let single = |value: Value| -> Result<Vec<OutputItem>> { Ok(vec![OutputItem::new(value, ctx.index)]) };

    match op {
        BookmarkCreate => {
            let mut values = params.collection("additionalFields");
            values.insert("link".to_string(), json!(params.required_str("link")?));
            values.insert("collectionId".to_string(), json!(params.required_str("collectionId")?));
            let request = write_request(HttpRequest::post("/raindrop"), BOOKMARK_FIELDS, &values)?;
            single(unwrap_item(client.json(request).await?, "/item")?)
        }
        BookmarkDelete => {
            let id = segment(params.required_str("bookmarkId")?);
            single(client.json(HttpRequest::delete(format!("/raindrop/{}", id))).await?)
        }
        BookmarkGet => {
            let id = segment(params.required_str("bookmarkId")?);
            let response = client.json(HttpRequest::get(format!("/raindrop/{}", id))).await?;
            single(unwrap_item(response, "/item")?)
        }
        BookmarkGetAll => {
            let id = segment(params.required_str("collectionId")?);
            let strategy = PageStrategy::Page {
                page_param: "page",
                size_param: "perpage",
                page_size: PAGE_SIZE,
            };
            let request = HttpRequest::get(format!("/raindrops/{}", id));
            let items = fetch_paged(client, request, strategy, "/items", params.limit()).await?;
            Ok(records_from(items, ctx.index))
        }
        BookmarkUpdate => {
            let id = segment(params.required_str("bookmarkId")?);
            let values = params.collection("updateFields");
            if values.values().all(is_empty_value) {
                return Err(ConnectorError::validation("updateFields has nothing to update"));
            }
            let request = write_request(HttpRequest::put(format!("/raindrop/{}", id)), BOOKMARK_FIELDS, &values)?;
            single(unwrap_item(client.json(request).await?, "/item")?)
        }
        CollectionCreate => {
            let mut values = params.collection("additionalFields");
            values.insert("title".to_string(), json!(params.required_str("title")?));
            let request = write_request(HttpRequest::post("/collection"), COLLECTION_FIELDS, &values)?;
            single(unwrap_item(client.json(request).await?, "/item")?)
        }
        CollectionDelete => {
            let id = segment(params.required_str("collectionId")?);
            single(client.json(HttpRequest::delete(format!("/collection/{}", id))).await?)
        }
        CollectionGet => {
            let id = segment(params.required_str("collectionId")?);
            let response = client.json(HttpRequest::get(format!("/collection/{}", id))).await?;
            single(unwrap_item(response, "/item")?)
        }
        CollectionGetAll => {
            let path = match params.str("type") {
                Some("children") => "/collections/childrens",
                _ => "/collections",
            };
            let response = client.json(HttpRequest::get(path)).await?;
            let mut items = extract_list(&response, "/items");
            params.limit().truncate(&mut items);
            Ok(records_from(items, ctx.index))
        }
        CollectionUpdate => {
            let id = segment(params.required_str("collectionId")?);
            let values = params.collection("updateFields");
            if values.values().all(is_empty_value) {
                return Err(ConnectorError::validation("updateFields has nothing to update"));
            }
            let request = write_request(
                HttpRequest::put(format!("/collection/{}", id)),
                COLLECTION_FIELDS,
                &values,
            )?;
            single(unwrap_item(client.json(request).await?, "/item")?)
        }
        TagDelete => {
            let tags = params.list("tags");
            let path = tags_path(&params.collection("additionalFields"));
            let request = HttpRequest::delete(path).json(json!({ "tags": tags }));
            single(client.json(request).await?)
        }
        TagGetAll => {
            let path = tags_path(&params.collection("filters"));
            let response = client.json(HttpRequest::get(path)).await?;
            let mut items = extract_list(&response, "/items");
            params.limit().truncate(&mut items);
            Ok(records_from(items, ctx.index))
        }
        UserGet => {
            let path = if params.bool("self") {
                "/user".to_string()
            } else {
                format!("/user/{}", segment(params.required_str("userId")?))
            };
            let response = client.json(HttpRequest::get(path)).await?;
            Ok(to_records(&response, "/user", ctx.index))
        }
    }
}

/// `/tags`, or `/tags/{collectionId}` when scoped to a collection
fn tags_path(scope: &Map<String, Value>) -> String {
    match scope.get("collectionId").and_then(Value::as_str).filter(|s| !s.trim().is_empty()) {
        Some(id) => format!("/tags/{}", segment(id)),
        None => "/tags".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::Service;
    use crate::http::transport::mock::json_response;
    use crate::http::MockTransport;
    use crate::services::testing::{item, runner};
    use std::sync::Arc;

    const BASE: &str = "https://api.raindrop.io/rest/v1";

    #[tokio::test]
    async fn test_bookmark_create_body() {
        let transport = Arc::new(MockTransport::new().push_json(json!({
            "result": true, "item": {"_id": 1001, "link": "https://www.rust-lang.org"}
        })));

        let out = runner(&transport, BASE)
            .run(
                Service::Raindrop,
                "bookmark",
                "create",
                &[item(json!({
                    "collectionId": "42",
                    "link": "https://www.rust-lang.org",
                    "additionalFields": {"tags": "lang, systems", "pleaseParse": true, "important": false}
                }))],
            )
            .await
            .unwrap();

        assert_eq!(out[0].json["_id"], 1001);
        let sent = &transport.requests()[0];
        assert_eq!(sent.url, format!("{}/raindrop", BASE));
        assert_eq!(
            sent.json_body().unwrap(),
            &json!({
                "link": "https://www.rust-lang.org",
                "collection": {"$id": 42},
                "tags": ["lang", "systems"],
                "pleaseParse": {},
                "important": false
            })
        );
    }

    #[tokio::test]
    async fn test_bookmark_update_is_sparse() {
        let transport = Arc::new(MockTransport::new().push_json(json!({"result": true, "item": {"_id": 7}})));

        runner(&transport, BASE)
            .run(
                Service::Raindrop,
                "bookmark",
                "update",
                &[item(json!({"bookmarkId": "7", "updateFields": {"collectionId": "-1", "title": ""}}))],
            )
            .await
            .unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, reqwest::Method::PUT);
        assert_eq!(sent.json_body().unwrap(), &json!({"collection": {"$id": -1}}));
    }

    #[tokio::test]
    async fn test_update_with_only_empty_values_is_rejected() {
        let transport = Arc::new(MockTransport::new());
        for (resource, id_field) in [("bookmark", "bookmarkId"), ("collection", "collectionId")] {
            let err = runner(&transport, BASE)
                .run(
                    Service::Raindrop,
                    resource,
                    "update",
                    &[item(json!({id_field: "7", "updateFields": {"title": ""}}))],
                )
                .await
                .unwrap_err();
            assert!(err.is_validation(), "{}", resource);
        }
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_bookmark_get_all_pages_with_constant_size() {
        let transport = Arc::new(MockTransport::with_handler(|req| {
            let page: usize = req.query_param("page").unwrap().parse().unwrap();
            let size: usize = req.query_param("perpage").unwrap().parse().unwrap();
            let items: Vec<Value> = (page * size..(page * size + size).min(120))
                .map(|i| json!({"_id": i}))
                .collect();
            json_response(200, &json!({"result": true, "items": items, "count": 120}))
        }));

        let out = runner(&transport, BASE)
            .run(
                Service::Raindrop,
                "bookmark",
                "getAll",
                &[item(json!({"collectionId": "0", "returnAll": true}))],
            )
            .await
            .unwrap();

        assert_eq!(out.len(), 120);
        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|r| r.query_param("perpage") == Some("50")));
        assert_eq!(requests[2].query_param("page"), Some("2"));
    }

    #[tokio::test]
    async fn test_bookmark_limit_above_page_cap_is_rejected() {
        let transport = Arc::new(MockTransport::new());
        let err = runner(&transport, BASE)
            .run(
                Service::Raindrop,
                "bookmark",
                "getAll",
                &[item(json!({"collectionId": "0", "limit": 80}))],
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_collection_create_and_children() {
        let transport = Arc::new(
            MockTransport::new()
                .push_json(json!({"result": true, "item": {"_id": 5, "title": "Reading"}}))
                .push_json(json!({"result": true, "items": [{"_id": 6}, {"_id": 7}, {"_id": 8}]})),
        );
        let runner = runner(&transport, BASE);

        runner
            .run(
                Service::Raindrop,
                "collection",
                "create",
                &[item(json!({
                    "title": "Reading",
                    "additionalFields": {"parentId": "3", "cover": "https://img.example/c.png", "view": "list"}
                }))],
            )
            .await
            .unwrap();
        let children = runner
            .run(
                Service::Raindrop,
                "collection",
                "getAll",
                &[item(json!({"type": "children", "limit": 2}))],
            )
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests[0].json_body().unwrap(),
            &json!({
                "title": "Reading",
                "parent": {"$id": 3},
                "cover": ["https://img.example/c.png"],
                "view": "list"
            })
        );
        assert_eq!(requests[1].url, format!("{}/collections/childrens", BASE));
        assert_eq!(children.len(), 2);
    }

    #[tokio::test]
    async fn test_tag_delete_scoped_to_collection() {
        let transport = Arc::new(MockTransport::new().push_json(json!({"result": true})));

        runner(&transport, BASE)
            .run(
                Service::Raindrop,
                "tag",
                "delete",
                &[item(json!({"tags": "old, stale", "additionalFields": {"collectionId": "42"}}))],
            )
            .await
            .unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.url, format!("{}/tags/42", BASE));
        assert_eq!(sent.json_body().unwrap(), &json!({"tags": ["old", "stale"]}));
    }

    #[tokio::test]
    async fn test_user_get_self_or_by_id() {
        let transport = Arc::new(
            MockTransport::new()
                .push_json(json!({"result": true, "user": {"_id": 1, "fullName": "Me"}}))
                .push_json(json!({"result": true, "user": {"_id": 2, "fullName": "Other"}})),
        );
        let runner = runner(&transport, BASE);

        let me = runner
            .run(Service::Raindrop, "user", "get", &[item(json!({}))])
            .await
            .unwrap();
        runner
            .run(Service::Raindrop, "user", "get", &[item(json!({"self": false, "userId": "2"}))])
            .await
            .unwrap();

        assert_eq!(me[0].json["fullName"], "Me");
        let requests = transport.requests();
        assert_eq!(requests[0].url, format!("{}/user", BASE));
        assert_eq!(requests[1].url, format!("{}/user/2", BASE));
    }

    #[tokio::test]
    async fn test_missing_item_is_data_shape_error() {
        let transport = Arc::new(MockTransport::new().push_json(json!({"result": false})));
        let err = runner(&transport, BASE)
            .run(Service::Raindrop, "bookmark", "get", &[item(json!({"bookmarkId": "1"}))])
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::DataShape(_)));
    }
}
