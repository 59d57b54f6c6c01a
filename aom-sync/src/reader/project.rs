//! Field projection from a decoded record onto local state.

use serde_json::Value;
use tracing::debug;

use super::aggregate::FieldErrors;
use crate::state::StateSink;

/// A projected field: local name and how to read it off the record.
///
/// `extract` returns `None` when the record does not carry the field.
pub struct Field<R> {
    pub name: &'static str,
    pub extract: fn(&R) -> Option<Value>,
}

impl<R> Field<R> {
    pub const fn new(name: &'static str, extract: fn(&R) -> Option<Value>) -> Self {
        Self { name, extract }
    }
}

/// Try every field in order. Present fields are written as they go;
/// fields the record lacks keep their local value.
pub fn project<R, S>(record: &R, fields: &[Field<R>], sink: &mut S) -> FieldErrors
where
    S: StateSink + ?Sized,
{
    let mut errors = FieldErrors::default();
    for field in fields {
        let Some(value) = (field.extract)(record) else {
            continue;
        };
        match sink.set(field.name, value) {
            Ok(()) => debug!(field = field.name, "field set"),
            Err(error) => {
                debug!(field = field.name, %error, "field rejected");
                errors.push(field.name, error);
            }
        }
    }
    errors
}
