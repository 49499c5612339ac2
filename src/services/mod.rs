//! Service connectors
//!
//! Each service declares its operations as a closed enum with a field
//! schema per variant and an `execute` that turns resolved parameters into
//! requests.

pub mod elasticsearch;
pub mod jira;
pub mod lemlist;
pub mod raindrop;

use crate::connector::{OutputItem, RequestContext, Service, ServiceOperation};
use crate::error::Result;

pub use elasticsearch::ElasticsearchOperation;
pub use jira::JiraOperation;
pub use lemlist::LemlistOperation;
pub use raindrop::RaindropOperation;

/// Any service's operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Elasticsearch(ElasticsearchOperation),
    Jira(JiraOperation),
    Raindrop(RaindropOperation),
    Lemlist(LemlistOperation),
}

impl Operation {
    pub fn parse(service: Service, resource: &str, operation: &str) -> Option<Self> {
        match service {
            Service::Elasticsearch => {
                ElasticsearchOperation::parse(resource, operation).map(Operation::Elasticsearch)
            }
            Service::Jira => JiraOperation::parse(resource, operation).map(Operation::Jira),
            Service::Raindrop => RaindropOperation::parse(resource, operation).map(Operation::Raindrop),
            Service::Lemlist => LemlistOperation::parse(resource, operation).map(Operation::Lemlist),
        }
    }

    pub async fn execute(self, ctx: &RequestContext<'_>) -> Result<Vec<OutputItem>> {
        match self {
            Operation::Elasticsearch(op) => elasticsearch::execute(op, ctx).await,
            Operation::Jira(op) => jira::execute(op, ctx).await,
            Operation::Raindrop(op) => raindrop::execute(op, ctx).await,
            Operation::Lemlist(op) => lemlist::execute(op, ctx).await,
        }
    }
}

/// Percent-encode an identifier for use as a path segment
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value.trim()).into_owned()
}

#[cfg(test)]
pub(crate) mod testing {
    //! Helpers shared by the service tests

    use crate::connector::{InputItem, Runner};
    use crate::http::{Auth, Endpoint, MockTransport};
    use serde_json::{Map, Value};
    use std::sync::Arc;

    pub fn runner(transport: &Arc<MockTransport>, base_url: &str) -> Runner {
        Runner::with_endpoint(
            transport.clone(),
            Endpoint {
                base_url: base_url.to_string(),
                auth: Auth::Bearer("token".to_string()),
            },
        )
    }

    pub fn item(params: Value) -> InputItem {
        InputItem {
            params: params.as_object().cloned().unwrap_or_else(Map::new),
            ..Default::default()
        }
    }

    pub fn item_with_json(params: Value, json: Value) -> InputItem {
        InputItem {
            json: json.as_object().cloned().unwrap_or_else(Map::new),
            ..item(params)
        }
    }
}
