//! Client configuration.
//!
//! Region, project and credentials are resolved once, outside the read path,
//! and handed to [`HttpClient`](crate::clients::HttpClient) already validated.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while building a client from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("region is required")]
    RegionRequired,

    #[error("project id is required")]
    ProjectIdRequired,

    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Connection settings for the remote management API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub region: String,
    pub project_id: String,
    pub auth_token: Option<String>,
    /// Overrides the per-service endpoint derived from the region.
    pub endpoint: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(region: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            project_id: project_id.into(),
            auth_token: None,
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(ConfigError::RegionRequired);
        }
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::ProjectIdRequired);
        }
        Ok(())
    }

    /// Base URL for a service, always ending in `/` so relative paths join
    /// underneath it.
    pub fn endpoint(&self, service: &str) -> Result<Url> {
        let raw = match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "https://{}.{}.myhuaweicloud.com/",
                host_prefix(service),
                self.region
            ),
        };
        let normalized = if raw.ends_with('/') {
            raw
        } else {
            format!("{}/", raw)
        };

        let url = Url::parse(&normalized).map_err(|e| ConfigError::InvalidEndpoint {
            endpoint: normalized.clone(),
            reason: e.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEndpoint {
                endpoint: normalized,
                reason: "not a base URL".to_string(),
            });
        }
        Ok(url)
    }
}

/// CMDB endpoints are served from the AOM host.
fn host_prefix(service: &str) -> &str {
    match service {
        "cmdb" => "aom",
        other => other,
    }
}
