//! On-disk state file holding the last-known attributes of each resource.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::clients::Transport;
use crate::reader::{self, ReadOutcome, ResourceReader};
use crate::resource::RemoteResource;
use crate::schema::Schema;
use crate::state::{ResourceState, SetError, StateSink};

const STATE_VERSION: u32 = 1;

/// Errors that can occur while loading or saving state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid state file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported state file version {0}")]
    Version(u32),

    #[error("failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid attribute {field} on {id}: {source}")]
    InvalidAttribute {
        id: String,
        field: String,
        #[source]
        source: SetError,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Serialize, Deserialize)]
struct StateDocument {
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refreshed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    resources: Vec<StoredResource>,
}

/// Serialized form of one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResource {
    pub id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
}

impl StoredResource {
    /// `None` for removed resources.
    pub fn from_state(state: &ResourceState) -> Option<Self> {
        state.id().map(|id| Self {
            id: id.to_string(),
            attributes: state.attributes(),
        })
    }

    /// Rebuild a state, checking every attribute against the schema.
    pub fn into_state(self, schema: Arc<Schema>) -> Result<ResourceState> {
        let mut state = ResourceState::new(schema, self.id.clone());
        for (field, value) in self.attributes {
            state
                .set(&field, value)
                .map_err(|source| StoreError::InvalidAttribute {
                    id: self.id.clone(),
                    field,
                    source,
                })?;
        }
        Ok(state)
    }
}

/// A single resource read merged into a state file.
#[derive(Debug)]
pub struct MergedRead {
    /// State of the resource after the read; removed if it is gone.
    pub state: ResourceState,
    pub outcome: reader::Result<ReadOutcome>,
}

/// JSON state file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every stored resource. A missing file is an empty state.
    pub async fn load(&self, schema: &Arc<Schema>) -> Result<Vec<ResourceState>> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file yet");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let document: StateDocument =
            serde_json::from_slice(&raw).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;
        if document.version != STATE_VERSION {
            return Err(StoreError::Version(document.version));
        }

        document
            .resources
            .into_iter()
            .map(|stored| stored.into_state(Arc::clone(schema)))
            .collect()
    }

    /// Write all live resources; removed ones are dropped.
    pub async fn save(&self, states: &[ResourceState]) -> Result<()> {
        let document = StateDocument {
            version: STATE_VERSION,
            refreshed_at: Some(Utc::now()),
            resources: states.iter().filter_map(StoredResource::from_state).collect(),
        };
        let json = serde_json::to_vec_pretty(&document)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| StoreError::Write {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            path = %self.path.display(),
            resources = document.resources.len(),
            "state saved"
        );
        Ok(())
    }

    /// Refresh `id` into its entry, appending one if the file has none, and
    /// save.
    ///
    /// The file is saved whatever the read outcome: fields written before a
    /// projection failure are kept and a resource that is gone is dropped.
    /// Only load and save failures are returned as `Err`.
    pub async fn merge_read<R, T>(&self, reader: &ResourceReader<T>, id: &str) -> Result<MergedRead>
    where
        R: RemoteResource,
        T: Transport,
    {
        let schema = R::schema();
        let mut states = self.load(&schema).await?;

        let index = match states.iter().position(|s| s.id() == Some(id)) {
            Some(index) => index,
            None => {
                debug!(id, path = %self.path.display(), "new resource in state");
                states.push(ResourceState::new(schema, id));
                states.len() - 1
            }
        };

        let outcome = reader.refresh::<R>(&mut states[index]).await;
        self.save(&states).await?;

        Ok(MergedRead {
            state: states.swap_remove(index),
            outcome,
        })
    }
}
