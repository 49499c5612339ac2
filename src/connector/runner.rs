//! Batch runner
//!
//! Executes one operation over a list of records, one record at a time.
//! Each record resolves its own parameters and credentials, so a bad record
//! never poisons the rest of the batch when the policy allows continuing.

use super::item::{InputItem, OutputItem};
use super::registry::{get_operation, OperationDescriptor};
use super::schema;
use super::{RequestContext, Service};
use crate::config::ProfileConfig;
use crate::error::{ConnectorError, Result};
use crate::http::{resolve_endpoint, ApiClient, Endpoint, Transport};
use crate::services::jira::JiraVersion;
use crate::services::Operation;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What to do when a record fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Abort the batch with the error
    #[default]
    Stop,
    /// Emit `{"error": ..}` for the record and carry on
    Continue,
}

impl ErrorPolicy {
    pub fn from_flag(continue_on_fail: bool) -> Self {
        if continue_on_fail {
            ErrorPolicy::Continue
        } else {
            ErrorPolicy::Stop
        }
    }
}

enum EndpointSource {
    /// Resolve per record from an optional profile plus the environment
    Profile(Option<ProfileConfig>),
    Fixed(Endpoint),
}

pub struct Runner {
    transport: Arc<dyn Transport>,
    endpoints: EndpointSource,
    policy: ErrorPolicy,
}

impl Runner {
    pub fn new(transport: Arc<dyn Transport>, profile: Option<ProfileConfig>) -> Self {
        Self {
            transport,
            endpoints: EndpointSource::Profile(profile),
            policy: ErrorPolicy::default(),
        }
    }

    /// Runner that talks to a known endpoint, skipping credential lookup
    pub fn with_endpoint(transport: Arc<dyn Transport>, endpoint: Endpoint) -> Self {
        Self {
            transport,
            endpoints: EndpointSource::Fixed(endpoint),
            policy: ErrorPolicy::default(),
        }
    }

    pub fn policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run `resource:operation` of `service` over `items`
    pub async fn run(
        &self,
        service: Service,
        resource: &str,
        operation: &str,
        items: &[InputItem],
    ) -> Result<Vec<OutputItem>> {
        let unknown = || {
            ConnectorError::validation(format!(
                "unknown operation '{}:{}' for {}",
                resource, operation, service
            ))
        };
        let descriptor = get_operation(service, resource, operation).ok_or_else(unknown)?;
        let typed = Operation::parse(service, resource, operation).ok_or_else(unknown)?;

        info!(
            "Running {} {}:{} over {} records",
            service,
            resource,
            operation,
            items.len()
        );

        let mut output = Vec::new();
        let mut failed = 0usize;
        for (index, item) in items.iter().enumerate() {
            match self.run_item(descriptor, typed, item, index).await {
                Ok(records) => {
                    debug!("Record {} produced {} outputs", index, records.len());
                    output.extend(records);
                }
                Err(err) => match self.policy {
                    ErrorPolicy::Stop => return Err(err),
                    ErrorPolicy::Continue => {
                        warn!("Record {} failed: {}", index, err);
                        failed += 1;
                        output.push(OutputItem::new(json!({ "error": err.to_string() }), index));
                    }
                },
            }
        }

        info!(
            "Finished {} {}:{}: {} outputs, {} failed records",
            service,
            resource,
            operation,
            output.len(),
            failed
        );
        Ok(output)
    }

    async fn run_item(
        &self,
        descriptor: &OperationDescriptor,
        operation: Operation,
        item: &InputItem,
        index: usize,
    ) -> Result<Vec<OutputItem>> {
        let service = descriptor.key.service;
        let params = schema::resolve(&descriptor.fields, &item.params)?;

        let endpoint = match &self.endpoints {
            EndpointSource::Fixed(endpoint) => endpoint.clone(),
            EndpointSource::Profile(profile) => {
                let version = JiraVersion::from_params(&params);
                resolve_endpoint(service, profile.as_ref(), version)?
            }
        };
        let client = ApiClient::new(self.transport.clone(), service.name(), endpoint);

        let ctx = RequestContext {
            client: &client,
            params: &params,
            item,
            index,
        };
        operation.execute(&ctx).await
    }
}
