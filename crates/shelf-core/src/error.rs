//! Gateway error handling
//!
//! These errors never leave the gateway: each backend call logs the cause
//! and collapses it into that call's failure value.

use reqwest::StatusCode;
use thiserror::Error;

/// Why a backend call failed
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Connection, timeout or body read failure
    #[error("Request to '{endpoint}' failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx HTTP status
    #[error("'{endpoint}' returned HTTP {status}")]
    Status { endpoint: String, status: StatusCode },

    /// Body did not match the declared schema
    #[error("'{endpoint}' returned a malformed payload: {source}")]
    Malformed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend answered with `success: false`
    #[error("'{endpoint}' rejected the request: {message}")]
    Rejected { endpoint: String, message: String },

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl GatewayError {
    pub(crate) fn rejected(endpoint: &str, message: Option<String>) -> Self {
        GatewayError::Rejected {
            endpoint: endpoint.to_string(),
            message: message.unwrap_or_else(|| "no message".to_string()),
        }
    }

    /// Transport-level fault (as opposed to a server rejection)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GatewayError::Transport { .. } | GatewayError::Malformed { .. }
        )
    }
}

/// Result type for gateway internals
pub type GatewayResult<T> = Result<T, GatewayError>;
