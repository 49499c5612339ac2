//! Transport abstraction
//!
//! `ApiClient` talks to a `Transport` so the request assembly can be
//! exercised without a network. The production implementation wraps
//! `reqwest::Client`.

use super::client::{HttpRequest, HttpResponse, RequestBody};
use crate::error::{ConnectorError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;
use tracing::trace;

/// Sends a fully described request and returns the raw response
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// reqwest-backed transport
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = url::Url::parse(&request.url)
            .map_err(|e| ConnectorError::validation(format!("invalid URL '{}': {}", request.url, e)))?;

        let mut builder = self.http_client.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart(file) => {
                let part = Part::bytes(file.data)
                    .file_name(file.file_name)
                    .mime_str(&file.mime_type)?;
                builder.multipart(Form::new().part(file.field, part))
            }
        };

        trace!("Sending {} request to {}", request.method, request.url);
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
