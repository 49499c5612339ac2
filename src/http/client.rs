//! API client
//!
//! Holds the resolved endpoint for one service, applies authentication,
//! resolves relative paths against the base URL and turns non-success
//! responses into `ConnectorError::Api`.

use super::credentials::{mask_credential, Auth, Endpoint};
use super::transport::Transport;
use crate::error::{ConnectorError, Result};
use bytes::Bytes;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, trace, warn};
use url::Url;

/// File carried in a multipart upload
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(FilePart),
}

/// Outbound call description produced by the request builders
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the service base URL, or an absolute URL
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.set_query(key, value);
        self
    }

    /// Replace or insert a query parameter
    pub fn set_query(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        if let Some(existing) = self.query.iter_mut().find(|(k, _)| k == key) {
            existing.1 = value;
        } else {
            self.query.push((key.to_string(), value));
        }
    }

    pub fn extend_query(mut self, pairs: Vec<(String, String)>) -> Self {
        for (k, v) in pairs {
            self.set_query(&k, v);
        }
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, file: FilePart) -> Self {
        self.body = RequestBody::Multipart(file);
        self
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Mutable access to the JSON body, creating an empty object if needed
    pub fn json_body_mut(&mut self) -> &mut Value {
        if !matches!(self.body, RequestBody::Json(_)) {
            self.body = RequestBody::Json(json!({}));
        }
        match &mut self.body {
            RequestBody::Json(v) => v,
            _ => unreachable!("body was just set to JSON"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Authenticated client for one service endpoint
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    service: &'static str,
    base_url: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, service: &'static str, endpoint: Endpoint) -> Self {
        debug!(
            "Creating {} client for {}, auth: {}",
            service,
            endpoint.base_url,
            endpoint.auth.describe()
        );
        Self {
            transport,
            service,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            auth: endpoint.auth,
        }
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    /// True when `url` has the scheme, host and port of the base URL
    fn is_own_origin(&self, url: &str) -> bool {
        match (Url::parse(url), Url::parse(&self.base_url)) {
            (Ok(target), Ok(base)) => target.origin() == base.origin(),
            _ => false,
        }
    }

    /// Send a request and fail on non-success status
    ///
    /// Credentials only go to the service's own origin; absolute URLs on
    /// other hosts are requested without them.
    pub async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        request.url = self.resolve_url(&request.url);
        if self.is_own_origin(&request.url) {
            request
                .headers
                .push(("Authorization".to_string(), self.auth.header_value()));
        } else {
            debug!("{} request to foreign origin {}, sending without credentials", self.service, request.url);
        }
        if !request.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("accept")) {
            request
                .headers
                .push(("Accept".to_string(), "application/json".to_string()));
        }

        debug!(
            "{} request: method={}, url={}, query={:?}",
            self.service, request.method, request.url, request.query
        );
        if let Some(body) = request.json_body() {
            trace!("{} body: {}", self.service, body);
        }

        let response = self.transport.send(request).await?;
        debug!("Response status: {}", response.status);

        if !response.is_success() {
            let text = String::from_utf8_lossy(&response.body).to_string();
            let preview: String = text.chars().take(500).collect();
            warn!(
                "{} request failed: status={}, body={}",
                self.service, response.status, preview
            );
            return Err(ConnectorError::Api {
                service: self.service.to_string(),
                status: response.status,
                message: extract_error_message(&text),
            });
        }

        Ok(response)
    }

    /// Send a request and parse the body as JSON; empty bodies become
    /// `{"success": true}`
    pub async fn json(&self, request: HttpRequest) -> Result<Value> {
        let response = self.send(request).await?;
        if response.body.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(json!({ "success": true }));
        }
        let value: Value = serde_json::from_slice(&response.body)?;
        trace!(
            "Response body (first 2000 chars): {}",
            value.to_string().chars().take(2000).collect::<String>()
        );
        Ok(value)
    }

    /// Send a request and return the raw body
    pub async fn bytes(&self, request: HttpRequest) -> Result<Bytes> {
        let request = request.header("Accept", "*/*");
        Ok(self.send(request).await?.body)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("service", &self.service)
            .field("base_url", &self.base_url)
            .field("auth", &mask_credential(&self.auth.header_value()))
            .finish()
    }
}

/// Pull a readable message out of common error payload shapes
fn extract_error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let from_json = parsed.as_ref().and_then(|v| {
        v.get("errorMessages")
            .and_then(|m| m.as_array())
            .and_then(|m| m.first())
            .and_then(|m| m.as_str())
            .or_else(|| v.pointer("/error/reason").and_then(|m| m.as_str()))
            .or_else(|| v.get("errorMessage").and_then(|m| m.as_str()))
            .or_else(|| v.get("message").and_then(|m| m.as_str()))
            .or_else(|| v.get("error").and_then(|m| m.as_str()))
            .map(|s| s.to_string())
    });
    from_json.unwrap_or_else(|| body.chars().take(500).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockTransport;

    fn client(transport: Arc<MockTransport>) -> ApiClient {
        ApiClient::new(
            transport,
            "test",
            Endpoint {
                base_url: "https://api.example.com/v1/".to_string(),
                auth: Auth::Bearer("secret-token".to_string()),
            },
        )
    }

    #[tokio::test]
    async fn test_relative_paths_resolve_against_base() {
        let transport = Arc::new(MockTransport::new().push_json(json!({"ok": 1})));
        let client = client(transport.clone());

        let value = client.json(HttpRequest::get("/things/1")).await.unwrap();
        assert_eq!(value["ok"], 1);

        let requests = transport.requests();
        assert_eq!(requests[0].url, "https://api.example.com/v1/things/1");
        assert!(requests[0]
            .headers
            .iter()
            .any(|(k, v)| k == "Authorization" && v == "Bearer secret-token"));
    }

    #[tokio::test]
    async fn test_absolute_urls_pass_through() {
        let transport = Arc::new(MockTransport::new().push_bytes(b"raw"));
        let client = client(transport.clone());

        let bytes = client
            .bytes(HttpRequest::get("https://files.example.com/blob"))
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"raw");
        assert_eq!(transport.requests()[0].url, "https://files.example.com/blob");
    }

    #[tokio::test]
    async fn test_credentials_stay_on_own_origin() {
        let transport = Arc::new(
            MockTransport::new()
                .push_bytes(b"mine")
                .push_bytes(b"theirs")
                .push_bytes(b"other port"),
        );
        let client = client(transport.clone());

        for url in [
            "https://api.example.com/v1/attachment/content/1",
            "https://evil.example.org/steal",
            "https://api.example.com:8443/v1/blob",
        ] {
            client.bytes(HttpRequest::get(url)).await.unwrap();
        }

        let has_auth: Vec<bool> = transport
            .requests()
            .iter()
            .map(|r| r.headers.iter().any(|(k, _)| k == "Authorization"))
            .collect();
        assert_eq!(has_auth, vec![true, false, false]);
    }

    #[tokio::test]
    async fn test_empty_body_is_success() {
        let transport = Arc::new(MockTransport::new().push_status(204, ""));
        let client = client(transport);

        let value = client.json(HttpRequest::delete("/things/1")).await.unwrap();
        assert_eq!(value, json!({"success": true}));
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let transport = Arc::new(
            MockTransport::new().push_status(404, r#"{"errorMessages":["Issue does not exist"]}"#),
        );
        let client = client(transport);

        let err = client.json(HttpRequest::get("/issue/X-1")).await.unwrap_err();
        match err {
            ConnectorError::Api {
                status, message, ..
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Issue does not exist");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_set_query_replaces_existing() {
        let mut request = HttpRequest::get("/x").query("startAt", 0);
        request.set_query("startAt", 50);
        assert_eq!(request.query.len(), 1);
        assert_eq!(request.query_param("startAt"), Some("50"));
    }

    #[test]
    fn test_extract_error_message_shapes() {
        assert_eq!(
            extract_error_message(r#"{"error":{"reason":"no such index"}}"#),
            "no such index"
        );
        assert_eq!(extract_error_message(r#"{"errorMessage":"bad"}"#), "bad");
        assert_eq!(extract_error_message("plain text"), "plain text");
    }
}
