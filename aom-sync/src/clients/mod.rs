//! Clients for the remote management API.
//!
//! - transport: the [`Transport`] seam the read path consumes
//! - http: reqwest-backed transport for the regional service endpoints

pub mod http;
pub mod transport;

#[cfg(test)]
pub(crate) mod stub;

pub use http::HttpClient;
pub use transport::{RawResponse, Transport, TransportError};
