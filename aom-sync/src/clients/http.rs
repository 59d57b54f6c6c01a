//! HTTP transport backed by reqwest.

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

use super::transport::{RawResponse, Transport, TransportError};
use crate::config::{self, ClientConfig, ConfigError};
use crate::resource::ResourceType;

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
const PROJECT_ID_HEADER: &str = "X-Project-Id";

/// Client for the regional AOM service endpoints.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: ClientConfig,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> config::Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            PROJECT_ID_HEADER,
            HeaderValue::from_str(&config.project_id)
                .map_err(|_| ConfigError::InvalidHeader(PROJECT_ID_HEADER))?,
        );
        if let Some(token) = &config.auth_token {
            let mut value = HeaderValue::from_str(token)
                .map_err(|_| ConfigError::InvalidHeader(AUTH_TOKEN_HEADER))?;
            value.set_sensitive(true);
            headers.insert(AUTH_TOKEN_HEADER, value);
        }

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { inner, config })
    }

    /// `{endpoint}/{resource.path}/{id}`, with the id percent-encoded as a
    /// single path segment.
    fn url_for(&self, resource: &ResourceType, id: &str) -> Result<Url, TransportError> {
        let base = self
            .config
            .endpoint(resource.service)
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        let mut url = base
            .join(&format!("{}/", resource.path.trim_matches('/')))
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(resource.path.to_string()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn fetch(
        &self,
        resource: &ResourceType,
        id: &str,
    ) -> Result<RawResponse, TransportError> {
        let url = self.url_for(resource, id)?;
        debug!(url = %url, resource = resource.name, "GET");

        let response = self
            .inner
            .get(url.clone())
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?
            .to_vec();
        debug!(url = %url, status = %status, bytes = body.len(), "response received");

        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(RawResponse { status, body })
    }
}
