//! Remote resource types known to the read path.

pub mod application;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::reader::project::Field;
use crate::schema::Schema;

pub use application::Application;

/// Where a resource type lives on the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceType {
    /// Name used in diagnostics, e.g. `Application`.
    pub name: &'static str,
    /// Service the endpoint is resolved for.
    pub service: &'static str,
    /// Collection path relative to the service endpoint.
    pub path: &'static str,
}

/// A decoded remote record and the fixed list of fields it projects onto
/// local state.
pub trait RemoteResource: DeserializeOwned + Send + 'static {
    const TYPE: ResourceType;

    /// Projected fields, in schema declaration order.
    fn fields() -> &'static [Field<Self>];

    /// Local schema the projected fields are checked against.
    fn schema() -> Arc<Schema>;
}
