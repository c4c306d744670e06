//! Access to the SYRA API
//!
//! Every call goes through the session gate: the token is required before
//! the request is built, and the response status is checked before the
//! body is decoded.

pub mod client;
pub mod transport;

pub use client::ApiClient;
pub use transport::{HttpMethod, ReqwestTransport, Transport, TransportRequest, TransportResponse};

use crate::models::domain::DomainInputError;
use crate::persistence::PersistenceError;
use thiserror::Error;

/// Fallback message when an error response has no body
pub const GENERIC_API_ERROR: &str = "API error";

/// Message shown for any request that could not complete
pub const NETWORK_ERROR: &str = "Network error: unable to reach the server";

/// Errors surfaced by API calls
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No authentication token found")]
    AuthenticationMissing,

    #[error("Unauthorized")]
    Unauthorized,

    /// Server-provided text of a non-success response
    #[error("{0}")]
    Api(String),

    /// The request could not complete. The field keeps the transport's own
    /// description for logging; the displayed message stays generic.
    #[error("Network error: unable to reach the server")]
    Network(String),

    #[error("Unexpected response from server: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Session storage error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("{0}")]
    InvalidInput(#[from] DomainInputError),
}

impl ApiError {
    /// Error for a non-success response body
    pub fn from_body(body: String) -> Self {
        if body.is_empty() {
            ApiError::Api(GENERIC_API_ERROR.to_string())
        } else {
            ApiError::Api(body)
        }
    }

    /// Whether the error ended (or never had) a session; these are handled
    /// by the redirect rather than shown as a message
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::AuthenticationMissing | ApiError::Unauthorized)
    }
}
