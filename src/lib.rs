//! wirenode: resource/operation connectors for a handful of REST APIs
//!
//! Every service exposes a closed set of `(resource, operation)` pairs, each
//! with a declarative field schema. The runner validates a record's fields
//! against that schema, resolves credentials, builds the request and
//! normalizes the response into output records.

pub mod config;
pub mod connector;
pub mod error;
pub mod http;
pub mod services;

pub use connector::{ErrorPolicy, InputItem, OutputItem, Runner, Service};
pub use error::{ConnectorError, Result};
