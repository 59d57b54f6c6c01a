//! AOM CMDB application.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::{RemoteResource, ResourceType};
use crate::reader::project::Field;
use crate::schema::{FieldKind, Schema, one_of};

pub const APPLICATION: ResourceType = ResourceType {
    name: "Application",
    service: "cmdb",
    path: "v1/applications",
};

pub const REGISTER_TYPES: &[&str] = &["API", "CONSOLE", "SERVICE_DISCOVERY"];

/// Application as returned by `GET v1/applications/{id}`.
///
/// Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Application {
    pub aom_id: Option<String>,
    pub app_id: Option<String>,
    pub create_time: Option<String>,
    pub creator: Option<String>,
    pub description: Option<String>,
    pub display_name: Option<String>,
    pub eps_id: Option<String>,
    pub modified_time: Option<String>,
    pub modifier: Option<String>,
    pub name: Option<String>,
    pub register_type: Option<String>,
}

fn text(value: &Option<String>) -> Option<Value> {
    value.as_ref().map(|s| Value::String(s.clone()))
}

static FIELDS: &[Field<Application>] = &[
    Field::new("aom_id", |a| text(&a.aom_id)),
    Field::new("app_id", |a| text(&a.app_id)),
    Field::new("create_time", |a| text(&a.create_time)),
    Field::new("creator", |a| text(&a.creator)),
    Field::new("description", |a| text(&a.description)),
    Field::new("display_name", |a| text(&a.display_name)),
    Field::new("enterprise_project_id", |a| text(&a.eps_id)),
    Field::new("modified_time", |a| text(&a.modified_time)),
    Field::new("modifier", |a| text(&a.modifier)),
    Field::new("name", |a| text(&a.name)),
    Field::new("register_type", |a| text(&a.register_type)),
];

/// Local schema for applications.
pub fn schema() -> Schema {
    Schema::new(APPLICATION.name)
        .field("aom_id", FieldKind::String)
        .field("app_id", FieldKind::String)
        .field("create_time", FieldKind::Timestamp)
        .field("creator", FieldKind::String)
        .field("description", FieldKind::String)
        .field("display_name", FieldKind::String)
        .field("enterprise_project_id", FieldKind::String)
        .field("modified_time", FieldKind::Timestamp)
        .field("modifier", FieldKind::String)
        .field("name", FieldKind::String)
        .validated("register_type", FieldKind::String, one_of(REGISTER_TYPES))
}

impl RemoteResource for Application {
    const TYPE: ResourceType = APPLICATION;

    fn fields() -> &'static [Field<Self>] {
        FIELDS
    }

    fn schema() -> Arc<Schema> {
        Arc::new(schema())
    }
}
