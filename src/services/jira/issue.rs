//! Issue operations

use super::version::{JiraApi, SearchOptions};
use crate::connector::field_mapper::{
    apply_field_mappings, apply_transform, ensure_mapped, rename_keys, FieldMapping, Transform,
};
use crate::connector::normalize::{records_from, to_records};
use crate::connector::params::value_to_list;
use crate::connector::path_extractor::{is_empty_value, set_by_path, value_to_string};
use crate::connector::{OutputItem, RequestContext};
use crate::error::{ConnectorError, Result};
use crate::http::{ApiClient, HttpRequest};
use crate::services::segment;
use serde_json::{json, Map, Value};
use tracing::debug;

/// Request layout shared by create and update
const ISSUE_FIELDS: &[FieldMapping] = &[
    FieldMapping::body("project", "fields/project/id"),
    FieldMapping::body("issueType", "fields/issuetype/id"),
    FieldMapping::body("summary", "fields/summary"),
    FieldMapping::body("description", "fields/description"),
    FieldMapping::body("priority", "fields/priority/id"),
    FieldMapping::body("componentIds", "fields/components").with(Transform::IdObjects),
    FieldMapping::query("updateHistory", "updateHistory"),
];

/// Keys written by hand: their shape depends on the Jira version or the issue type
const HANDLED_KEYS: &[&str] = &[
    "parentIssueKey",
    "assignee",
    "reporter",
    "labels",
    "serverLabels",
    "customFieldsUi",
    "statusId",
];

const GET_OPTIONS: &[FieldMapping] = &[
    FieldMapping::query("expand", "expand"),
    FieldMapping::query("fields", "fields"),
    FieldMapping::query("fieldsByKeys", "fieldsByKeys"),
    FieldMapping::query("properties", "properties"),
    FieldMapping::query("updateHistory", "updateHistory"),
];

const TRANSITION_OPTIONS: &[FieldMapping] = &[
    FieldMapping::query("expand", "expand"),
    FieldMapping::query("transitionId", "transitionId"),
    FieldMapping::query("skipRemoteOnlyCondition", "skipRemoteOnlyCondition"),
];

fn non_empty<'a>(values: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    values.get(key).filter(|v| !is_empty_value(v))
}

/// Build a create/update request; absent values are never sent
fn issue_request(
    mut request: HttpRequest,
    values: &Map<String, Value>,
    api: &dyn JiraApi,
) -> Result<HttpRequest> {
    ensure_mapped(ISSUE_FIELDS, values, HANDLED_KEYS)?;
    apply_field_mappings(ISSUE_FIELDS, values, &mut request)?;

    if let Some(labels) = non_empty(values, api.labels_field()) {
        let labels: Vec<Value> = value_to_list(Some(labels))
            .into_iter()
            .map(Value::String)
            .collect();
        set_by_path(request.json_body_mut(), "fields/labels", Value::Array(labels));
    }

    for (key, path) in [("assignee", "fields/assignee"), ("reporter", "fields/reporter")] {
        if let Some(id) = non_empty(values, key).and_then(Value::as_str) {
            set_by_path(request.json_body_mut(), path, api.user_ref(id.trim()));
        }
    }

    let custom = values
        .get("customFieldsUi")
        .and_then(|v| v.get("customFieldsValues"))
        .and_then(Value::as_array);
    for entry in custom.into_iter().flatten() {
        let Some(field_id) = entry.get("fieldId").and_then(Value::as_str) else {
            continue;
        };
        let Some(value) = entry.get("fieldValue").filter(|v| !is_empty_value(v)) else {
            continue;
        };
        let path = format!("fields/{}", field_id.trim());
        set_by_path(request.json_body_mut(), &path, custom_field_value(value));
    }

    Ok(request)
}

/// Custom field text holding JSON (objects, lists, numbers) is sent as JSON
fn custom_field_value(value: &Value) -> Value {
    match value {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(parsed @ (Value::Object(_) | Value::Array(_) | Value::Number(_))) => parsed,
            _ => value.clone(),
        },
        other => other.clone(),
    }
}

/// Sub-task types get `fields.parent`; other types never do
///
/// Runs before anything is written. A sub-task type without a parent key
/// fails validation. Without an `issueType` (an update that keeps the type)
/// a given parent key is sent as is.
async fn apply_parent(
    client: &ApiClient,
    values: &Map<String, Value>,
    request: &mut HttpRequest,
) -> Result<()> {
    let parent = non_empty(values, "parentIssueKey");
    let Some(issue_type) = non_empty(values, "issueType").map(value_to_string) else {
        return match parent {
            Some(key) => write_parent(request, key),
            None => Ok(()),
        };
    };

    let types = client.json(HttpRequest::get("/api/2/issuetype")).await?;
    let is_subtask = types
        .as_array()
        .into_iter()
        .flatten()
        .filter(|t| t.get("subtask").and_then(Value::as_bool) == Some(true))
        .filter_map(|t| t.get("id").map(value_to_string))
        .any(|id| id == issue_type);

    match (is_subtask, parent) {
        (true, Some(key)) => write_parent(request, key),
        (true, None) => Err(ConnectorError::validation(format!(
            "issue type '{}' is a sub-task; parentIssueKey is required",
            issue_type
        ))),
        (false, Some(_)) => {
            debug!("Issue type {} is not a sub-task, dropping parentIssueKey", issue_type);
            Ok(())
        }
        (false, None) => Ok(()),
    }
}

/// `fields.parent = {"key": KEY}`
fn write_parent(request: &mut HttpRequest, key: &Value) -> Result<()> {
    if let Some(parent) = apply_transform("parentIssueKey", key, Transform::ParentKey)? {
        set_by_path(request.json_body_mut(), "fields/parent", parent);
    }
    Ok(())
}

pub async fn create(ctx: &RequestContext<'_>, api: &dyn JiraApi) -> Result<Vec<OutputItem>> {
    let params = ctx.params;
    let mut values = params.collection("additionalFields");
    for key in ["project", "issueType", "summary"] {
        values.insert(key.to_string(), json!(params.required_str(key)?));
    }

    let mut request = issue_request(HttpRequest::post("/api/2/issue"), &values, api)?;
    apply_parent(ctx.client, &values, &mut request).await?;
    let created = ctx.client.json(request).await?;
    Ok(vec![OutputItem::new(created, ctx.index)])
}

pub async fn update(ctx: &RequestContext<'_>, api: &dyn JiraApi) -> Result<Vec<OutputItem>> {
    let params = ctx.params;
    let key = segment(params.required_str("issueKey")?);
    let values = params.collection("updateFields");
    if values.values().all(is_empty_value) {
        return Err(ConnectorError::validation("updateFields has nothing to update"));
    }

    let mut request = issue_request(HttpRequest::put(format!("/api/2/issue/{}", key)), &values, api)?;
    apply_parent(ctx.client, &values, &mut request).await?;

    if let Some(status) = non_empty(&values, "statusId").map(value_to_string) {
        debug!("Transitioning {} to status {}", key, status);
        let transition = HttpRequest::post(format!("/api/2/issue/{}/transitions", key))
            .json(json!({ "transition": { "id": status } }));
        ctx.client.json(transition).await?;
    }

    let has_fields = request
        .json_body()
        .and_then(|b| b.get("fields"))
        .is_some_and(|f| !is_empty_value(f));
    if has_fields {
        ctx.client.json(request).await?;
    }
    Ok(vec![OutputItem::new(json!({ "success": true }), ctx.index)])
}

pub async fn delete(ctx: &RequestContext<'_>) -> Result<Vec<OutputItem>> {
    let params = ctx.params;
    let key = segment(params.required_str("issueKey")?);
    let request = HttpRequest::delete(format!("/api/2/issue/{}", key))
        .query("deleteSubtasks", params.bool("deleteSubtasks"));
    let response = ctx.client.json(request).await?;
    Ok(vec![OutputItem::new(response, ctx.index)])
}

pub async fn get(ctx: &RequestContext<'_>) -> Result<Vec<OutputItem>> {
    let params = ctx.params;
    let key = segment(params.required_str("issueKey")?);
    let simplify = params.bool("simplifyOutput");

    let mut request = HttpRequest::get(format!("/api/2/issue/{}", key));
    apply_field_mappings(GET_OPTIONS, &params.collection("additionalFields"), &mut request)?;
    if simplify {
        let mut expand = value_to_list(request.query_param("expand").map(|e| json!(e)).as_ref());
        if !expand.iter().any(|e| e == "names") {
            expand.push("names".to_string());
        }
        request.set_query("expand", expand.join(","));
    }

    let issue = ctx.client.json(request).await?;
    let issue = if simplify { simplify_issue(&issue) } else { issue };
    Ok(vec![OutputItem::new(issue, ctx.index)])
}

/// `{id, key, fields}` with field ids replaced by their display names
fn simplify_issue(issue: &Value) -> Value {
    let names = issue
        .get("names")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    let fields = issue.get("fields").map(|f| rename_keys(f, &names)).unwrap_or(json!({}));
    json!({
        "id": issue.get("id").cloned().unwrap_or(Value::Null),
        "key": issue.get("key").cloned().unwrap_or(Value::Null),
        "fields": fields,
    })
}

pub async fn get_all(ctx: &RequestContext<'_>, api: &dyn JiraApi) -> Result<Vec<OutputItem>> {
    let params = ctx.params;
    let options = params.collection("options");
    let search = SearchOptions {
        jql: options
            .get("jql")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        fields: value_to_list(options.get("fields")),
        expand: value_to_list(options.get("expand")),
    };
    let issues = api.search(&search).fetch(ctx.client, params.limit()).await?;
    Ok(records_from(issues, ctx.index))
}

pub async fn changelog(ctx: &RequestContext<'_>, api: &dyn JiraApi) -> Result<Vec<OutputItem>> {
    let params = ctx.params;
    let key = segment(params.required_str("issueKey")?);
    let entries = api.changelog(&key).fetch(ctx.client, params.limit()).await?;
    Ok(records_from(entries, ctx.index))
}

pub async fn notify(ctx: &RequestContext<'_>, api: &dyn JiraApi) -> Result<Vec<OutputItem>> {
    let params = ctx.params;
    let key = segment(params.required_str("issueKey")?);

    let mut body = Map::new();
    let message = params.collection("additionalFields");
    for field in ["subject", "textBody", "htmlBody"] {
        if let Some(value) = non_empty(&message, field) {
            body.insert(field.to_string(), value.clone());
        }
    }

    if params.bool("jsonParameters") {
        if let Some(to) = params.json("notificationRecipientsJson")? {
            body.insert("to".to_string(), to);
        }
        if let Some(restrict) = params.json("notificationRecipientsRestrictionsJson")? {
            body.insert("restrict".to_string(), restrict);
        }
    } else {
        let recipients = params.collection("notificationRecipientsUi");
        let mut to = Map::new();
        for flag in ["reporter", "assignee", "watchers", "voters"] {
            if let Some(Value::Bool(on)) = recipients.get(flag) {
                to.insert(flag.to_string(), json!(on));
            }
        }
        let users: Vec<Value> = value_to_list(recipients.get("users"))
            .iter()
            .map(|u| api.user_ref(u))
            .collect();
        if !users.is_empty() {
            to.insert("users".to_string(), Value::Array(users));
        }
        let groups = named_list(recipients.get("groups"), "name");
        if !groups.is_empty() {
            to.insert("groups".to_string(), Value::Array(groups));
        }
        if !to.is_empty() {
            body.insert("to".to_string(), Value::Object(to));
        }

        let restrictions = params.collection("notificationRecipientsRestrictionsUi");
        let mut restrict = Map::new();
        let groups = named_list(restrictions.get("groups"), "name");
        if !groups.is_empty() {
            restrict.insert("groups".to_string(), Value::Array(groups));
        }
        let permissions = named_list(restrictions.get("permissions"), "key");
        if !permissions.is_empty() {
            restrict.insert("permissions".to_string(), Value::Array(permissions));
        }
        if !restrict.is_empty() {
            body.insert("restrict".to_string(), Value::Object(restrict));
        }
    }

    let request = HttpRequest::post(format!("/api/2/issue/{}/notify", key)).json(Value::Object(body));
    let response = ctx.client.json(request).await?;
    Ok(vec![OutputItem::new(response, ctx.index)])
}

/// `"a, b"` to `[{key: "a"}, {key: "b"}]`
fn named_list(value: Option<&Value>, key: &str) -> Vec<Value> {
    value_to_list(value)
        .into_iter()
        .map(|v| {
            let mut entry = Map::new();
            entry.insert(key.to_string(), Value::String(v));
            Value::Object(entry)
        })
        .collect()
}

pub async fn transitions(ctx: &RequestContext<'_>) -> Result<Vec<OutputItem>> {
    let params = ctx.params;
    let key = segment(params.required_str("issueKey")?);
    let mut request = HttpRequest::get(format!("/api/2/issue/{}/transitions", key));
    apply_field_mappings(TRANSITION_OPTIONS, &params.collection("additionalFields"), &mut request)?;
    let response = ctx.client.json(request).await?;
    Ok(to_records(&response, "/transitions", ctx.index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::Service;
    use crate::http::transport::mock::json_response;
    use crate::http::MockTransport;
    use crate::services::testing::{item, runner};
    use reqwest::Method;
    use std::sync::Arc;

    const BASE: &str = "https://acme.atlassian.net/rest";

    fn issue_types() -> Value {
        json!([
            {"id": "10001", "name": "Task", "subtask": false},
            {"id": "10003", "name": "Sub-task", "subtask": true}
        ])
    }

    #[tokio::test]
    async fn test_subtask_without_parent_fails_before_create() {
        let transport = Arc::new(MockTransport::new().push_json(issue_types()));

        let err = runner(&transport, BASE)
            .run(
                Service::Jira,
                "issue",
                "create",
                &[item(json!({"project": "10000", "issueType": "10003", "summary": "Child"}))],
            )
            .await
            .unwrap_err();

        assert!(err.is_validation());
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(requests[0].url, "https://acme.atlassian.net/rest/api/2/issuetype");
    }

    #[tokio::test]
    async fn test_subtask_parent_key_is_uppercased() {
        let transport = Arc::new(
            MockTransport::new()
                .push_json(issue_types())
                .push_json(json!({"id": "10100", "key": "ENG-43"})),
        );

        let out = runner(&transport, BASE)
            .run(
                Service::Jira,
                "issue",
                "create",
                &[item(json!({
                    "project": "10000",
                    "issueType": "10003",
                    "summary": "Child",
                    "additionalFields": {"parentIssueKey": "eng-42", "assignee": "5b10a2844c20165700ede21g"}
                }))],
            )
            .await
            .unwrap();

        assert_eq!(out[0].json["key"], "ENG-43");
        let requests = transport.requests();
        assert_eq!(requests[0].url, "https://acme.atlassian.net/rest/api/2/issuetype");
        let sent = &requests[1];
        assert_eq!(sent.method, Method::POST);
        let body = sent.json_body().unwrap();
        assert_eq!(body["fields"]["parent"], json!({"key": "ENG-42"}));
        assert_eq!(body["fields"]["assignee"], json!({"accountId": "5b10a2844c20165700ede21g"}));
        assert_eq!(body["fields"]["issuetype"], json!({"id": "10003"}));
    }

    #[tokio::test]
    async fn test_regular_issue_type_creates() {
        let transport = Arc::new(
            MockTransport::new()
                .push_json(issue_types())
                .push_json(json!({"id": "10101", "key": "ENG-44"})),
        );

        runner(&transport, BASE)
            .run(
                Service::Jira,
                "issue",
                "create",
                &[item(json!({
                    "jiraVersion": "server",
                    "project": "10000",
                    "issueType": "10001",
                    "summary": "Task",
                    "additionalFields": {
                        "serverLabels": "backend, urgent",
                        "labels": ["ignored"],
                        "reporter": "jdoe",
                        "customFieldsUi": {"customFieldsValues": [
                            {"fieldId": "customfield_10010", "fieldValue": "{\"value\": \"High\"}"},
                            {"fieldId": "customfield_10011", "fieldValue": "plain"}
                        ]}
                    }
                }))],
            )
            .await
            .unwrap();

        let body = transport.requests()[1].json_body().cloned().unwrap();
        assert_eq!(body["fields"]["labels"], json!(["backend", "urgent"]));
        assert_eq!(body["fields"]["reporter"], json!({"name": "jdoe"}));
        assert_eq!(body["fields"]["customfield_10010"], json!({"value": "High"}));
        assert_eq!(body["fields"]["customfield_10011"], "plain");
    }

    #[tokio::test]
    async fn test_parent_dropped_for_regular_issue_type() {
        let transport = Arc::new(
            MockTransport::new()
                .push_json(issue_types())
                .push_json(json!({"id": "10102", "key": "ENG-45"})),
        );

        runner(&transport, BASE)
            .run(
                Service::Jira,
                "issue",
                "create",
                &[item(json!({
                    "project": "10000",
                    "issueType": "10001",
                    "summary": "Task",
                    "additionalFields": {"parentIssueKey": "eng-1"}
                }))],
            )
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, "https://acme.atlassian.net/rest/api/2/issuetype");
        let body = requests[1].json_body().unwrap();
        assert!(body["fields"].get("parent").is_none());
        assert_eq!(body["fields"]["summary"], "Task");
    }

    #[tokio::test]
    async fn test_update_without_type_keeps_parent() {
        let transport = Arc::new(MockTransport::new().push_status(204, ""));

        runner(&transport, BASE)
            .run(
                Service::Jira,
                "issue",
                "update",
                &[item(json!({"issueKey": "ENG-9", "updateFields": {"parentIssueKey": "eng-2"}}))],
            )
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].json_body().unwrap(), &json!({"fields": {"parent": {"key": "ENG-2"}}}));
    }

    #[tokio::test]
    async fn test_update_is_sparse_and_transitions_first() {
        let transport = Arc::new(MockTransport::new().push_status(204, "").push_status(204, ""));

        runner(&transport, BASE)
            .run(
                Service::Jira,
                "issue",
                "update",
                &[item(json!({
                    "issueKey": "ENG-7",
                    "updateFields": {"summary": "Renamed", "description": "", "statusId": "31"}
                }))],
            )
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, "https://acme.atlassian.net/rest/api/2/issue/ENG-7/transitions");
        assert_eq!(requests[0].json_body().unwrap(), &json!({"transition": {"id": "31"}}));
        assert_eq!(requests[1].method, Method::PUT);
        assert_eq!(requests[1].json_body().unwrap(), &json!({"fields": {"summary": "Renamed"}}));
    }

    #[tokio::test]
    async fn test_update_with_nothing_sends_nothing() {
        let transport = Arc::new(MockTransport::new());
        let err = runner(&transport, BASE)
            .run(
                Service::Jira,
                "issue",
                "update",
                &[item(json!({"issueKey": "ENG-7", "updateFields": {}}))],
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_get_simplified_requests_names() {
        let transport = Arc::new(MockTransport::new().push_json(json!({
            "id": "10100",
            "key": "ENG-1",
            "names": {"customfield_10010": "Story Points", "summary": "Summary"},
            "fields": {"customfield_10010": 5, "summary": "Login"}
        })));

        let out = runner(&transport, BASE)
            .run(
                Service::Jira,
                "issue",
                "get",
                &[item(json!({
                    "issueKey": "ENG-1",
                    "simplifyOutput": true,
                    "additionalFields": {"expand": "renderedFields"}
                }))],
            )
            .await
            .unwrap();

        assert_eq!(transport.requests()[0].query_param("expand"), Some("renderedFields,names"));
        assert_eq!(
            out[0].json,
            json!({"id": "10100", "key": "ENG-1", "fields": {"Story Points": 5, "Summary": "Login"}})
        );
    }

    #[tokio::test]
    async fn test_get_all_cloud_follows_cursor() {
        let transport = Arc::new(
            MockTransport::new()
                .push_json(json!({"issues": [{"key": "ENG-1"}, {"key": "ENG-2"}], "nextPageToken": "p2"}))
                .push_json(json!({"issues": [{"key": "ENG-3"}], "isLast": true})),
        );

        let out = runner(&transport, BASE)
            .run(
                Service::Jira,
                "issue",
                "getAll",
                &[item(json!({"returnAll": true, "options": {"jql": "project = ENG"}}))],
            )
            .await
            .unwrap();

        assert_eq!(out.len(), 3);
        let requests = transport.requests();
        assert_eq!(requests[0].url, "https://acme.atlassian.net/rest/api/3/search/jql");
        assert!(requests[0].json_body().unwrap().get("nextPageToken").is_none());
        assert_eq!(requests[1].json_body().unwrap()["nextPageToken"], "p2");
        assert_eq!(requests[1].json_body().unwrap()["jql"], "project = ENG");
    }

    #[tokio::test]
    async fn test_get_all_server_uses_offsets() {
        let transport = Arc::new(MockTransport::with_handler(|req| {
            let body = req.json_body().cloned().unwrap_or_default();
            let start = body["startAt"].as_u64().unwrap_or(0);
            let size = body["maxResults"].as_u64().unwrap_or(50);
            let issues: Vec<Value> = (start..(start + size).min(70))
                .map(|i| json!({"key": format!("ENG-{}", i)}))
                .collect();
            json_response(200, &json!({"issues": issues, "total": 70}))
        }));

        let out = runner(&transport, BASE)
            .run(
                Service::Jira,
                "issue",
                "getAll",
                &[item(json!({"jiraVersion": "server", "limit": 60}))],
            )
            .await
            .unwrap();

        assert_eq!(out.len(), 60);
        let requests = transport.requests();
        assert_eq!(requests[0].url, "https://acme.atlassian.net/rest/api/2/search");
        assert_eq!(requests[1].json_body().unwrap()["startAt"], 50);
        assert_eq!(requests[1].json_body().unwrap()["maxResults"], 10);
    }

    #[tokio::test]
    async fn test_changelog_by_version() {
        let cloud = Arc::new(MockTransport::new().push_json(json!({
            "values": [{"id": "1"}, {"id": "2"}], "total": 2
        })));
        let out = runner(&cloud, BASE)
            .run(Service::Jira, "issue", "changelog", &[item(json!({"issueKey": "ENG-1", "returnAll": true}))])
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(cloud.requests()[0].url, "https://acme.atlassian.net/rest/api/2/issue/ENG-1/changelog");

        let server = Arc::new(MockTransport::new().push_json(json!({
            "key": "ENG-1",
            "changelog": {"histories": [{"id": "1"}, {"id": "2"}, {"id": "3"}]}
        })));
        let out = runner(&server, BASE)
            .run(
                Service::Jira,
                "issue",
                "changelog",
                &[item(json!({"jiraVersion": "server", "issueKey": "ENG-1", "limit": 2}))],
            )
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(server.requests()[0].query_param("expand"), Some("changelog"));
    }

    #[tokio::test]
    async fn test_notify_recipient_flags_are_independent() {
        let transport = Arc::new(MockTransport::new().push_status(204, ""));

        runner(&transport, BASE)
            .run(
                Service::Jira,
                "issue",
                "notify",
                &[item(json!({
                    "issueKey": "ENG-1",
                    "additionalFields": {"subject": "Heads up", "textBody": "Deploy at 5"},
                    "notificationRecipientsUi": {"watchers": false, "voters": true, "users": "u1,u2", "groups": "devs"},
                    "notificationRecipientsRestrictionsUi": {"permissions": "BROWSE"}
                }))],
            )
            .await
            .unwrap();

        let body = transport.requests()[0].json_body().cloned().unwrap();
        assert_eq!(body["subject"], "Heads up");
        assert_eq!(body["to"]["watchers"], false);
        assert_eq!(body["to"]["voters"], true);
        assert!(body["to"].get("reporter").is_none());
        assert_eq!(body["to"]["users"], json!([{"accountId": "u1"}, {"accountId": "u2"}]));
        assert_eq!(body["to"]["groups"], json!([{"name": "devs"}]));
        assert_eq!(body["restrict"], json!({"permissions": [{"key": "BROWSE"}]}));
    }

    #[tokio::test]
    async fn test_notify_json_passthrough() {
        let transport = Arc::new(MockTransport::new().push_status(204, ""));
        let recipients = r#"{"reporter": true, "users": [{"accountId": "abc"}]}"#;

        runner(&transport, BASE)
            .run(
                Service::Jira,
                "issue",
                "notify",
                &[item(json!({
                    "issueKey": "ENG-1",
                    "jsonParameters": true,
                    "notificationRecipientsJson": recipients,
                    "notificationRecipientsUi": {"assignee": true}
                }))],
            )
            .await
            .unwrap();

        let body = transport.requests()[0].json_body().cloned().unwrap();
        assert_eq!(body, json!({"to": {"reporter": true, "users": [{"accountId": "abc"}]}}));
    }

    #[tokio::test]
    async fn test_notify_invalid_json_sends_nothing() {
        let transport = Arc::new(MockTransport::new());
        let err = runner(&transport, BASE)
            .run(
                Service::Jira,
                "issue",
                "notify",
                &[item(json!({
                    "issueKey": "ENG-1",
                    "jsonParameters": true,
                    "notificationRecipientsRestrictionsJson": "{groups: ["
                }))],
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_transitions_and_delete() {
        let transport = Arc::new(
            MockTransport::new()
                .push_json(json!({"transitions": [{"id": "11"}, {"id": "21"}]}))
                .push_status(204, ""),
        );
        let runner = runner(&transport, BASE);

        let out = runner
            .run(Service::Jira, "issue", "transitions", &[item(json!({"issueKey": "ENG-1"}))])
            .await
            .unwrap();
        assert_eq!(out.len(), 2);

        let out = runner
            .run(
                Service::Jira,
                "issue",
                "delete",
                &[item(json!({"issueKey": "ENG-1", "deleteSubtasks": true}))],
            )
            .await
            .unwrap();
        assert_eq!(out[0].json, json!({"success": true}));
        assert_eq!(transport.requests()[1].query_param("deleteSubtasks"), Some("true"));
    }
}
