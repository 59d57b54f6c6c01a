//! Canned transport for exercising the read path without a server.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use reqwest::StatusCode;

use super::transport::{RawResponse, Transport, TransportError};
use crate::resource::ResourceType;

/// Replies with the same status and body for every id.
pub struct StaticTransport {
    status: StatusCode,
    body: Vec<u8>,
    calls: AtomicUsize,
}

impl StaticTransport {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn ok(body: &str) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn fetch(
        &self,
        resource: &ResourceType,
        id: &str,
    ) -> Result<RawResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.status.is_success() {
            return Err(TransportError::Status {
                url: format!("stub://{}/{}", resource.path, id),
                status: self.status,
                body: String::from_utf8_lossy(&self.body).into_owned(),
            });
        }
        Ok(RawResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}
