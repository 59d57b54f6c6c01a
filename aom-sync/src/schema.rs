//! Resource schema: the ordered set of fields a resource type stores
//! locally, with their kinds and constraints.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Value kind a local field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    /// Timestamp carried as a string on the wire. The format is not checked.
    Timestamp,
}

impl FieldKind {
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            FieldKind::String | FieldKind::Timestamp => value.is_string(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "string",
            FieldKind::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// Name of a JSON value's type, for diagnostics.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Constraint checked after the kind matches.
pub type Validator = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Accepts only the listed string values.
pub fn one_of(allowed: &'static [&'static str]) -> Validator {
    Arc::new(move |value: &Value| match value.as_str() {
        Some(s) if allowed.contains(&s) => Ok(()),
        _ => Err(format!("expected one of [{}], got {}", allowed.join(", "), value)),
    })
}

#[derive(Clone)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
    pub validator: Option<Validator>,
}

impl fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSchema")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

/// Ordered field declarations for one resource type.
#[derive(Debug, Clone)]
pub struct Schema {
    resource: &'static str,
    fields: Vec<FieldSchema>,
}

impl Schema {
    pub fn new(resource: &'static str) -> Self {
        Self {
            resource,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldSchema {
            name,
            kind,
            validator: None,
        });
        self
    }

    pub fn validated(mut self, name: &'static str, kind: FieldKind, validator: Validator) -> Self {
        self.fields.push(FieldSchema {
            name,
            kind,
            validator: Some(validator),
        });
        self
    }

    /// Replace the constraint on an already-declared field.
    pub fn constrain(mut self, name: &str, validator: Validator) -> Self {
        if let Some(field) = self.fields.iter_mut().find(|f| f.name == name) {
            field.validator = Some(validator);
        }
        self
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter()
    }
}
