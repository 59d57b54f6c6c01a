//! aom-sync: keeps local state of AOM CMDB applications in step with the
//! remote management API.
//!
//! The read path fetches a resource through a [`Transport`], classifies a
//! missing resource as [`ReadOutcome::Absent`] rather than an error, decodes
//! the payload and projects it field by field onto a [`ResourceState`].
//! Field failures are collected and reported together; fields that could be
//! written stay written.

pub mod clients;
pub mod config;
pub mod reader;
pub mod resource;
pub mod schema;
pub mod state;
pub mod store;

pub use clients::{HttpClient, RawResponse, Transport, TransportError};
pub use config::{ClientConfig, ConfigError};
pub use reader::classify::{AbsentRule, StatusAbsentRule};
pub use reader::{ReadError, ReadOutcome, RefreshReport, ResourceReader, refresh_all};
pub use resource::{Application, RemoteResource, ResourceType};
pub use schema::{FieldKind, Schema};
pub use state::{ResourceState, SetError, StateSink};
pub use store::{MergedRead, StateFile, StoreError, StoredResource};
