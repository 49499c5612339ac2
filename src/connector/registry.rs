//! Operation registry
//!
//! Collects every service's operation descriptors once, on first access.

use super::schema::FieldSpec;
use super::{Service, ServiceOperation};
use crate::services::{elasticsearch, jira, lemlist, raindrop};
use serde::Serialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OperationKey {
    pub service: Service,
    pub resource: &'static str,
    pub operation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationDescriptor {
    #[serde(flatten)]
    pub key: OperationKey,
    pub description: &'static str,
    pub fields: Vec<FieldSpec>,
}

static REGISTRY: OnceLock<Vec<OperationDescriptor>> = OnceLock::new();

fn descriptors_for<O: ServiceOperation>(service: Service) -> impl Iterator<Item = OperationDescriptor> {
    O::ALL.iter().map(move |op| OperationDescriptor {
        key: OperationKey {
            service,
            resource: op.resource(),
            operation: op.operation(),
        },
        description: op.description(),
        fields: op.fields(),
    })
}

fn build_registry() -> Vec<OperationDescriptor> {
    descriptors_for::<elasticsearch::ElasticsearchOperation>(Service::Elasticsearch)
        .chain(descriptors_for::<jira::JiraOperation>(Service::Jira))
        .chain(descriptors_for::<raindrop::RaindropOperation>(Service::Raindrop))
        .chain(descriptors_for::<lemlist::LemlistOperation>(Service::Lemlist))
        .collect()
}

/// All operations, grouped by service in declaration order
pub fn all_operations() -> &'static [OperationDescriptor] {
    REGISTRY.get_or_init(build_registry)
}

pub fn get_operation(
    service: Service,
    resource: &str,
    operation: &str,
) -> Option<&'static OperationDescriptor> {
    all_operations().iter().find(|d| {
        d.key.service == service && d.key.resource == resource && d.key.operation == operation
    })
}
