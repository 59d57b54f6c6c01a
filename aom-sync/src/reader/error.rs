//! Read path error types.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use crate::clients::TransportError;
use crate::state::SetError;

/// One field that could not be written to local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub field: &'static str,
    pub error: SetError,
}

impl fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.error)
    }
}

/// Every field failure from one read, in the order the fields were tried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFailures(pub Vec<FieldFailure>);

impl FieldFailures {
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|f| f.field).collect()
    }
}

impl fmt::Display for FieldFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.len() {
            1 => write!(f, "1 error occurred:")?,
            n => write!(f, "{} errors occurred:", n)?,
        }
        for failure in &self.0 {
            write!(f, "\n\t* {}", failure)?;
        }
        Ok(())
    }
}

/// Terminal failures of a read. A resource that is gone is not an error;
/// see [`ReadOutcome::Absent`](super::ReadOutcome::Absent).
#[derive(Debug, Error)]
pub enum ReadError {
    /// The request failed for a reason other than the resource being gone.
    #[error("error retrieving {resource} {id}: {source}")]
    Transport {
        resource: &'static str,
        id: String,
        #[source]
        source: TransportError,
    },

    /// Successful status without a payload.
    #[error("error retrieving {resource} {id}: empty response body (status {status})")]
    EmptyBody {
        resource: &'static str,
        id: String,
        status: StatusCode,
    },

    /// Payload is not a valid representation of the resource.
    #[error("error retrieving {resource} {id}: failed to decode response: {source}")]
    Decode {
        resource: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// One or more fields could not be written. The others were.
    #[error("error setting {resource} fields: {failures}")]
    Projection {
        resource: &'static str,
        id: String,
        failures: FieldFailures,
    },
}

impl ReadError {
    pub fn id(&self) -> &str {
        match self {
            ReadError::Transport { id, .. }
            | ReadError::EmptyBody { id, .. }
            | ReadError::Decode { id, .. }
            | ReadError::Projection { id, .. } => id,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReadError>;
