//! Connector core
//!
//! Shared machinery for all services: field schemas, parameter resolution,
//! request mapping, pagination, response normalization and the per-record
//! runner.

pub mod field_mapper;
pub mod item;
pub mod normalize;
pub mod pagination;
pub mod params;
pub mod path_extractor;
pub mod registry;
pub mod runner;
pub mod schema;

pub use item::{BinaryData, InputItem, OutputItem};
pub use pagination::Limit;
pub use params::Params;
pub use registry::{all_operations, get_operation, OperationDescriptor, OperationKey};
pub use runner::{ErrorPolicy, Runner};
pub use schema::{FieldSpec, FieldType};

use crate::http::ApiClient;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported third-party services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Service {
    Elasticsearch,
    Jira,
    Raindrop,
    Lemlist,
}

impl Service {
    pub const ALL: &'static [Service] = &[
        Service::Elasticsearch,
        Service::Jira,
        Service::Raindrop,
        Service::Lemlist,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Service::Elasticsearch => "elasticsearch",
            Service::Jira => "jira",
            Service::Raindrop => "raindrop",
            Service::Lemlist => "lemlist",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Service::ALL
            .iter()
            .copied()
            .find(|svc| svc.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown service '{}' (expected one of: {})",
                    s,
                    Service::ALL
                        .iter()
                        .map(|svc| svc.name())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// A service's (resource, operation) pairs as a closed set
pub trait ServiceOperation: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn resource(self) -> &'static str;
    fn operation(self) -> &'static str;
    fn description(self) -> &'static str;

    /// Field schema, in display order
    fn fields(self) -> Vec<FieldSpec>;

    fn parse(resource: &str, operation: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.resource() == resource && op.operation() == operation)
    }
}

/// Everything an operation needs to process one record
pub struct RequestContext<'a> {
    pub client: &'a ApiClient,
    pub params: &'a Params,
    pub item: &'a InputItem,
    /// Position of the record in the batch
    pub index: usize,
}
