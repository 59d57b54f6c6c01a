//! Refreshing many resources at once.

use futures::stream::{self, StreamExt};
use tracing::info;

use super::{ReadError, ReadOutcome, ResourceReader};
use crate::clients::Transport;
use crate::resource::RemoteResource;
use crate::state::ResourceState;

/// What happened to each resource in a refresh.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub refreshed: Vec<String>,
    pub removed: Vec<String>,
    pub failed: Vec<ReadError>,
}

impl RefreshReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Refresh every live state, at most `concurrency` reads in flight.
///
/// Each read writes only to its own state. Absent resources are cleared;
/// failures are collected, never short-circuiting the others.
pub async fn refresh_all<R, T>(
    reader: &ResourceReader<T>,
    states: &mut [ResourceState],
    concurrency: usize,
) -> RefreshReport
where
    R: RemoteResource,
    T: Transport,
{
    let results: Vec<(String, Result<ReadOutcome, ReadError>)> =
        stream::iter(states.iter_mut().filter(|s| !s.is_removed()))
            .map(|state| async move {
                let id = state.id().unwrap_or_default().to_string();
                let result = reader.refresh::<R>(state).await;
                (id, result)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;

    let mut report = RefreshReport::default();
    for (id, result) in results {
        match result {
            Ok(ReadOutcome::Present) => report.refreshed.push(id),
            Ok(ReadOutcome::Absent) => report.removed.push(id),
            Err(e) => report.failed.push(e),
        }
    }
    report.refreshed.sort();
    report.removed.sort();
    report.failed.sort_by(|a, b| a.id().cmp(b.id()));

    info!(
        resource = R::TYPE.name,
        refreshed = report.refreshed.len(),
        removed = report.removed.len(),
        failed = report.failed.len(),
        "refresh complete"
    );
    report
}
