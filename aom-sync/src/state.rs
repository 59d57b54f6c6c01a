//! Local state record: the caller's last-known view of one resource.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::schema::{FieldKind, Schema, value_kind};

/// Why a single field assignment was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SetError {
    #[error("not declared in the {resource} schema")]
    UnknownField { resource: &'static str },

    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: FieldKind,
        found: &'static str,
    },

    #[error("{0}")]
    Rejected(String),
}

/// Destination of field projection. Each assignment may fail on its own.
pub trait StateSink {
    fn set(&mut self, field: &str, value: Value) -> Result<(), SetError>;
}

/// Schema-checked state of one resource.
///
/// An id of `None` means the resource has been removed.
#[derive(Debug, Clone)]
pub struct ResourceState {
    id: Option<String>,
    schema: Arc<Schema>,
    values: BTreeMap<String, Value>,
}

impl ResourceState {
    pub fn new(schema: Arc<Schema>, id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            schema,
            values: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_removed(&self) -> bool {
        self.id.is_none()
    }

    /// Forget the resource: drops the id and every stored value.
    pub fn clear(&mut self) {
        self.id = None;
        self.values.clear();
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.values.get(field).and_then(Value::as_str)
    }

    /// Stored values in schema declaration order.
    pub fn values(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.schema
            .fields()
            .filter_map(move |f| self.values.get(f.name).map(|v| (f.name, v)))
    }

    pub fn attributes(&self) -> BTreeMap<String, Value> {
        self.values.clone()
    }
}

impl StateSink for ResourceState {
    fn set(&mut self, field: &str, value: Value) -> Result<(), SetError> {
        let Some(decl) = self.schema.get(field) else {
            return Err(SetError::UnknownField {
                resource: self.schema.resource(),
            });
        };

        if !decl.kind.accepts(&value) {
            return Err(SetError::TypeMismatch {
                expected: decl.kind,
                found: value_kind(&value),
            });
        }
        if let Some(validator) = &decl.validator {
            validator(&value).map_err(SetError::Rejected)?;
        }

        self.values.insert(field.to_string(), value);
        Ok(())
    }
}
