//! Collects field failures and reduces them to one error.

use super::error::{FieldFailure, FieldFailures, ReadError, Result};
use crate::resource::ResourceType;
use crate::state::SetError;

#[derive(Debug, Default)]
pub struct FieldErrors {
    failures: Vec<FieldFailure>,
}

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, error: SetError) {
        self.failures.push(FieldFailure { field, error });
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.failures.iter().map(|f| f.field).collect()
    }

    /// `Ok` when nothing failed, otherwise one error listing every failure.
    pub fn into_result(self, resource: &ResourceType, id: &str) -> Result<()> {
        if self.failures.is_empty() {
            return Ok(());
        }
        Err(ReadError::Projection {
            resource: resource.name,
            id: id.to_string(),
            failures: FieldFailures(self.failures),
        })
    }
}
