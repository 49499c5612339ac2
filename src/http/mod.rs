//! HTTP layer: request description, transport and per-service credentials

pub mod client;
pub mod credentials;
pub mod transport;

pub use client::{ApiClient, FilePart, HttpRequest, HttpResponse, RequestBody};
pub use credentials::{resolve_endpoint, Auth, CredentialsError, Endpoint};
pub use transport::{ReqwestTransport, Transport};

#[cfg(test)]
pub use transport::mock::MockTransport;
