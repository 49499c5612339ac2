//! Connector error taxonomy
//!
//! Validation errors are raised before any request is sent, API and
//! transport errors come back from the HTTP layer, data-shape errors are
//! raised when a response lacks a field a follow-up step depends on.

use thiserror::Error;

/// Errors produced while executing a connector operation for one record
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Input failed validation; no request was issued
    #[error("validation failed: {0}")]
    Validation(String),

    /// Remote API answered with a non-success status
    #[error("{service} request failed ({status}): {message}")]
    Api {
        service: String,
        status: u16,
        message: String,
    },

    /// Request could not be sent or the response could not be read
    #[error("transport error: {0}")]
    Transport(String),

    /// A response did not have the shape a later step expected
    #[error("unexpected response shape: {0}")]
    DataShape(String),

    /// Credentials could not be assembled for the selected service
    #[error(transparent)]
    Credentials(#[from] crate::http::credentials::CredentialsError),
}

impl ConnectorError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ConnectorError::Validation(msg.into())
    }

    pub fn data_shape(msg: impl Into<String>) -> Self {
        ConnectorError::DataShape(msg.into())
    }

    /// Missing required parameter
    pub fn missing(field: &str) -> Self {
        ConnectorError::Validation(format!("parameter '{}' is required", field))
    }

    /// True when the error was raised before any network traffic
    pub fn is_validation(&self) -> bool {
        matches!(self, ConnectorError::Validation(_))
    }
}

impl From<reqwest::Error> for ConnectorError {
    fn from(err: reqwest::Error) -> Self {
        ConnectorError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        ConnectorError::DataShape(format!("invalid JSON in response: {}", err))
    }
}

pub type Result<T, E = ConnectorError> = std::result::Result<T, E>;

/// Format connector errors into short user-facing messages
pub fn format_connector_error(err: &ConnectorError) -> String {
    match err {
        ConnectorError::Api { status: 401, .. } => {
            "Authentication failed - check credentials".to_string()
        }
        ConnectorError::Api { status: 403, .. } => {
            "Access denied - check account permissions".to_string()
        }
        ConnectorError::Api { status: 404, .. } => {
            "Resource not found - check the identifier".to_string()
        }
        ConnectorError::Api { status: 429, .. } => {
            "Rate limited by the remote service - try again later".to_string()
        }
        ConnectorError::Transport(msg) if msg.contains("timed out") => {
            "Request timed out - check connection".to_string()
        }
        other => {
            let text = other.to_string();
            if text.chars().count() > 200 {
                let cut: String = text.chars().take(200).collect();
                format!("{}...", cut)
            } else {
                text
            }
        }
    }
}
