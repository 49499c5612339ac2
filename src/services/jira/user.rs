//! User operations

use super::version::JiraApi;
use crate::connector::params::value_to_list;
use crate::connector::path_extractor::is_empty_value;
use crate::connector::{OutputItem, RequestContext};
use crate::error::Result;
use crate::http::HttpRequest;
use serde_json::{json, Value};

/// `?accountId=` on cloud, `?username=` on server
fn user_request(ctx: &RequestContext<'_>, api: &dyn JiraApi, request: HttpRequest) -> Result<HttpRequest> {
    let param = api.user_param();
    let id = ctx.params.required_str(param)?;
    Ok(request.query(param, id))
}

pub async fn create(ctx: &RequestContext<'_>) -> Result<Vec<OutputItem>> {
    let params = ctx.params;
    let mut body = json!({
        "emailAddress": params.required_str("emailAddress")?,
        "displayName": params.required_str("displayName")?,
    });
    for (key, value) in params.collection("additionalFields") {
        if !is_empty_value(&value) {
            body[key] = value;
        }
    }
    let user = ctx
        .client
        .json(HttpRequest::post("/api/2/user").json(body))
        .await?;
    Ok(vec![OutputItem::new(user, ctx.index)])
}

pub async fn delete(ctx: &RequestContext<'_>, api: &dyn JiraApi) -> Result<Vec<OutputItem>> {
    let request = user_request(ctx, api, HttpRequest::delete("/api/2/user"))?;
    let response = ctx.client.json(request).await?;
    Ok(vec![OutputItem::new(response, ctx.index)])
}

pub async fn get(ctx: &RequestContext<'_>, api: &dyn JiraApi) -> Result<Vec<OutputItem>> {
    let mut request = user_request(ctx, api, HttpRequest::get("/api/2/user"))?;
    let expand = value_to_list(ctx.params.collection("additionalFields").get("expand"));
    if !expand.is_empty() {
        request.set_query("expand", expand.join(","));
    }
    let user: Value = ctx.client.json(request).await?;
    Ok(vec![OutputItem::new(user, ctx.index)])
}

#[cfg(test)]
mod tests {
    use crate::connector::Service;
    use crate::http::MockTransport;
    use crate::services::testing::{item, runner};
    use serde_json::json;
    use std::sync::Arc;

    const BASE: &str = "https://jira.acme.io/rest";

    #[tokio::test]
    async fn test_get_identifies_user_per_version() {
        let transport = Arc::new(
            MockTransport::new()
                .push_json(json!({"accountId": "abc"}))
                .push_json(json!({"name": "jdoe"})),
        );
        let runner = runner(&transport, BASE);

        runner
            .run(
                Service::Jira,
                "user",
                "get",
                &[item(json!({"accountId": "abc", "additionalFields": {"expand": ["groups", "applicationRoles"]}}))],
            )
            .await
            .unwrap();
        runner
            .run(
                Service::Jira,
                "user",
                "get",
                &[item(json!({"jiraVersion": "server", "username": "jdoe", "accountId": "ignored"}))],
            )
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].query_param("accountId"), Some("abc"));
        assert_eq!(requests[0].query_param("expand"), Some("groups,applicationRoles"));
        assert_eq!(requests[1].query_param("username"), Some("jdoe"));
        assert_eq!(requests[1].query_param("accountId"), None);
    }

    #[tokio::test]
    async fn test_server_delete_requires_username() {
        let transport = Arc::new(MockTransport::new());
        let err = runner(&transport, BASE)
            .run(
                Service::Jira,
                "user",
                "delete",
                &[item(json!({"jiraVersion": "server", "accountId": "abc"}))],
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_create_body() {
        let transport = Arc::new(MockTransport::new().push_json(json!({"accountId": "new"})));
        runner(&transport, BASE)
            .run(
                Service::Jira,
                "user",
                "create",
                &[item(json!({
                    "emailAddress": "ada@acme.io",
                    "displayName": "Ada",
                    "additionalFields": {"notification": true, "password": ""}
                }))],
            )
            .await
            .unwrap();

        assert_eq!(
            transport.requests()[0].json_body().unwrap(),
            &json!({"emailAddress": "ada@acme.io", "displayName": "Ada", "notification": true})
        );
    }
}
