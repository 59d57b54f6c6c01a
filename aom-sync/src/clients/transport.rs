//! Transport seam between the read path and the remote API.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::resource::ResourceType;

/// A successful response from the remote API.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Failures reported by a transport.
///
/// Non-2xx responses are errors that still carry the response status, so
/// the read path can tell a missing resource apart from a failed request.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// Response status, if the request got as far as a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            TransportError::Request { source, .. } => source.status(),
            TransportError::InvalidUrl(_) => None,
        }
    }
}

/// Issues a single read for one resource.
///
/// Implementations come fully configured (endpoint, credentials, region).
/// Retries, if any, happen inside the implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(
        &self,
        resource: &ResourceType,
        id: &str,
    ) -> Result<RawResponse, TransportError>;
}
