//! Payload decoding.

use serde::de::DeserializeOwned;

use super::error::{ReadError, Result};
use crate::resource::ResourceType;

/// Decode a response body. Unknown fields are ignored and missing optional
/// fields stay unset; anything structurally wrong fails with the id attached.
pub fn decode<R: DeserializeOwned>(resource: &ResourceType, id: &str, body: &[u8]) -> Result<R> {
    serde_json::from_slice(body).map_err(|source| ReadError::Decode {
        resource: resource.name,
        id: id.to_string(),
        source,
    })
}
