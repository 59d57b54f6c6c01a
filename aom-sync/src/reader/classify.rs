//! Not-found classification of transport outcomes.

use reqwest::StatusCode;
use tracing::debug;

use super::error::{ReadError, Result};
use crate::clients::{RawResponse, TransportError};
use crate::resource::ResourceType;

/// What the read path does next with a transport outcome.
#[derive(Debug, PartialEq, Eq)]
pub enum Classification {
    /// The resource no longer exists remotely.
    Absent,
    /// Decode this body.
    Proceed(Vec<u8>),
}

/// Decides which transport errors mean "the resource is gone".
pub trait AbsentRule: Send + Sync {
    fn is_absent(&self, error: &TransportError) -> bool;
}

/// Treats the listed response statuses as absence. Anything else,
/// including 403, stays an error.
#[derive(Debug, Clone)]
pub struct StatusAbsentRule {
    statuses: Vec<StatusCode>,
}

impl StatusAbsentRule {
    pub fn new(statuses: impl IntoIterator<Item = StatusCode>) -> Self {
        Self {
            statuses: statuses.into_iter().collect(),
        }
    }
}

impl Default for StatusAbsentRule {
    fn default() -> Self {
        Self::new([StatusCode::NOT_FOUND])
    }
}

impl AbsentRule for StatusAbsentRule {
    fn is_absent(&self, error: &TransportError) -> bool {
        error
            .status()
            .is_some_and(|status| self.statuses.contains(&status))
    }
}

pub fn classify(
    rule: &dyn AbsentRule,
    resource: &ResourceType,
    id: &str,
    outcome: std::result::Result<RawResponse, TransportError>,
) -> Result<Classification> {
    match outcome {
        Err(error) if rule.is_absent(&error) => {
            debug!(resource = resource.name, id, status = ?error.status(), "classified as absent");
            Ok(Classification::Absent)
        }
        Err(source) => Err(ReadError::Transport {
            resource: resource.name,
            id: id.to_string(),
            source,
        }),
        Ok(response) if response.body.iter().all(u8::is_ascii_whitespace) => {
            Err(ReadError::EmptyBody {
                resource: resource.name,
                id: id.to_string(),
                status: response.status,
            })
        }
        Ok(response) => Ok(Classification::Proceed(response.body)),
    }
}
