//! Read path: fetch, classify, decode, project.
//!
//! A read either leaves the local state refreshed, reports the resource as
//! gone, or fails. A projection failure still leaves every other field
//! written, so reading again is enough to converge.

pub mod aggregate;
pub mod classify;
pub mod decode;
pub mod error;
pub mod project;
pub mod refresh;

use tracing::{debug, info, warn};

use crate::clients::Transport;
use crate::resource::RemoteResource;
use crate::state::{ResourceState, StateSink};

use classify::{AbsentRule, Classification, StatusAbsentRule, classify};
use decode::decode;
use project::project;

pub use error::{FieldFailure, FieldFailures, ReadError, Result};
pub use refresh::{RefreshReport, refresh_all};

/// Result of a read that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The resource exists and local state was updated.
    Present,
    /// The resource no longer exists; local state should be dropped.
    Absent,
}

/// Reads remote resources through a configured transport.
pub struct ResourceReader<T> {
    transport: T,
    absent: Box<dyn AbsentRule>,
}

impl<T: Transport> ResourceReader<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            absent: Box::new(StatusAbsentRule::default()),
        }
    }

    /// Swap the rule deciding which errors mean the resource is gone.
    pub fn with_absent_rule(mut self, rule: impl AbsentRule + 'static) -> Self {
        self.absent = Box::new(rule);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Read one resource and project it onto `state`.
    ///
    /// Nothing is written on [`ReadOutcome::Absent`] or on transport and
    /// decode failures.
    pub async fn read<R, S>(&self, id: &str, state: &mut S) -> Result<ReadOutcome>
    where
        R: RemoteResource,
        S: StateSink + ?Sized,
    {
        let resource = R::TYPE;
        debug!(resource = resource.name, id, "fetching");

        let outcome = self.transport.fetch(&resource, id).await;
        let body = match classify(self.absent.as_ref(), &resource, id, outcome)? {
            Classification::Absent => {
                warn!(resource = resource.name, id, "resource no longer exists");
                return Ok(ReadOutcome::Absent);
            }
            Classification::Proceed(body) => body,
        };

        let record: R = decode(&resource, id, &body)?;
        project(&record, R::fields(), state).into_result(&resource, id)?;

        info!(resource = resource.name, id, "read complete");
        Ok(ReadOutcome::Present)
    }

    /// Read into `state` using its own id, clearing it if the resource is
    /// gone. A state that is already removed is not fetched.
    pub async fn refresh<R: RemoteResource>(&self, state: &mut ResourceState) -> Result<ReadOutcome> {
        let Some(id) = state.id().map(str::to_owned) else {
            return Ok(ReadOutcome::Absent);
        };

        let outcome = self.read::<R, _>(&id, state).await?;
        if outcome == ReadOutcome::Absent {
            state.clear();
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::stub::StaticTransport;
    use crate::resource::Application;
    use crate::resource::application;
    use crate::schema::{FieldKind, Schema};
    use crate::state::SetError;
    use reqwest::StatusCode;
    use serde_json::{Value, json};
    use std::sync::Arc;

    const FULL: &str = r#"{
        "aom_id": "aom-1",
        "app_id": "app-42",
        "create_time": "2024-01-01T00:00:00Z",
        "creator": "alice",
        "description": "billing services",
        "display_name": "Billing App",
        "eps_id": "0",
        "modified_time": "2024-02-01T00:00:00Z",
        "modifier": "bob",
        "name": "billing",
        "register_type": "CONSOLE"
    }"#;

    fn state() -> ResourceState {
        ResourceState::new(Application::schema(), "app-42")
    }

    fn state_with(schema: Schema) -> ResourceState {
        ResourceState::new(Arc::new(schema), "app-42")
    }

    fn refuse(reason: &'static str) -> crate::schema::Validator {
        Arc::new(move |_: &Value| -> std::result::Result<(), String> { Err(reason.to_string()) })
    }

    /// Counts set calls without storing anything.
    #[derive(Default)]
    struct CountingSink {
        calls: usize,
    }

    impl StateSink for CountingSink {
        fn set(&mut self, _field: &str, _value: Value) -> std::result::Result<(), SetError> {
            self.calls += 1;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_read_partial_payload_keeps_other_fields() {
        let reader = ResourceReader::new(StaticTransport::ok(
            r#"{"name":"billing","display_name":"Billing App"}"#,
        ));
        let mut state = state();
        state.set("description", json!("kept")).unwrap();

        let outcome = reader.read::<Application, _>("app-42", &mut state).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Present);
        assert_eq!(state.get_str("name"), Some("billing"));
        assert_eq!(state.get_str("display_name"), Some("Billing App"));
        assert_eq!(state.get_str("description"), Some("kept"));
        assert!(state.get("creator").is_none());
    }

    #[tokio::test]
    async fn test_read_full_payload() {
        let reader = ResourceReader::new(StaticTransport::ok(FULL));
        let mut state = state();

        reader.read::<Application, _>("app-42", &mut state).await.unwrap();
        assert_eq!(state.values().count(), 11);
        assert_eq!(state.get_str("enterprise_project_id"), Some("0"));
        assert_eq!(state.get_str("register_type"), Some("CONSOLE"));
    }

    #[tokio::test]
    async fn test_read_absent_does_not_project() {
        let reader = ResourceReader::new(StaticTransport::new(
            StatusCode::NOT_FOUND,
            r#"{"error_code":"AOM.0404"}"#,
        ));
        let mut sink = CountingSink::default();

        let outcome = reader.read::<Application, _>("app-42", &mut sink).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Absent);
        assert_eq!(sink.calls, 0);
    }

    #[tokio::test]
    async fn test_read_server_error() {
        let reader = ResourceReader::new(StaticTransport::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "boom",
        ));
        let mut sink = CountingSink::default();

        let err = reader.read::<Application, _>("app-42", &mut sink).await.unwrap_err();
        assert!(matches!(err, ReadError::Transport { .. }));
        assert!(err.to_string().contains("error retrieving Application"));
        assert_eq!(sink.calls, 0);
    }

    #[tokio::test]
    async fn test_read_forbidden_is_not_absent() {
        let reader = ResourceReader::new(StaticTransport::new(StatusCode::FORBIDDEN, "denied"));
        let mut state = state();

        let err = reader.refresh::<Application>(&mut state).await.unwrap_err();
        assert!(matches!(err, ReadError::Transport { .. }));
        assert!(!state.is_removed());
    }

    #[tokio::test]
    async fn test_read_not_json() {
        let reader = ResourceReader::new(StaticTransport::ok(r#""not json""#));
        let mut sink = CountingSink::default();

        let err = reader.read::<Application, _>("app-42", &mut sink).await.unwrap_err();
        assert!(matches!(err, ReadError::Decode { .. }));
        let msg = err.to_string();
        assert!(msg.contains("app-42"));
        assert!(msg.contains("decode"));
        assert_eq!(sink.calls, 0);
    }

    #[tokio::test]
    async fn test_read_ignores_unknown_fields() {
        let reader = ResourceReader::new(StaticTransport::ok(
            r#"{"name":"billing","tags":["a"],"owner":{"id":1}}"#,
        ));
        let mut state = state();

        let outcome = reader.read::<Application, _>("app-42", &mut state).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Present);
        assert_eq!(state.values().count(), 1);
    }

    #[tokio::test]
    async fn test_read_rejected_creator_keeps_other_fields() {
        let reader = ResourceReader::new(StaticTransport::ok(FULL));
        let mut state =
            state_with(application::schema().constrain("creator", refuse("creator is managed locally")));

        let err = reader.read::<Application, _>("app-42", &mut state).await.unwrap_err();
        assert!(matches!(err, ReadError::Projection { .. }));
        let msg = err.to_string();
        assert!(msg.starts_with("error setting Application fields"));
        assert!(msg.contains("creator"));

        assert!(state.get("creator").is_none());
        assert_eq!(state.values().count(), 10);
        assert_eq!(state.get_str("name"), Some("billing"));
        assert_eq!(state.get_str("modifier"), Some("bob"));
    }

    #[tokio::test]
    async fn test_read_reports_every_failed_field() {
        let payload = r#"{"creator":"alice","name":"billing","register_type":"MANUAL","modifier":"bob"}"#;
        let reader = ResourceReader::new(StaticTransport::ok(payload));
        let schema = Schema::new("Application")
            .field("creator", FieldKind::String)
            .field("modifier", FieldKind::String)
            .validated(
                "register_type",
                FieldKind::String,
                crate::schema::one_of(application::REGISTER_TYPES),
            )
            .constrain("creator", refuse("locked"));
        let mut state = state_with(schema);

        let err = reader.read::<Application, _>("app-42", &mut state).await.unwrap_err();
        let msg = err.to_string();
        for field in ["creator", "name", "register_type"] {
            assert!(msg.contains(field), "missing {} in {}", field, msg);
        }
        match err {
            ReadError::Projection { failures, .. } => {
                assert_eq!(failures.fields(), vec!["creator", "name", "register_type"]);
            }
            other => panic!("Unexpected error: {:?}", other),
        }
        assert_eq!(state.get_str("modifier"), Some("bob"));
    }

    #[tokio::test]
    async fn test_refresh_clears_absent_state() {
        let reader = ResourceReader::new(StaticTransport::new(StatusCode::NOT_FOUND, ""));
        let mut state = state();
        state.set("name", json!("billing")).unwrap();

        let outcome = reader.refresh::<Application>(&mut state).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Absent);
        assert!(state.is_removed());
        assert!(state.get("name").is_none());
    }

    #[tokio::test]
    async fn test_refresh_skips_removed_state() {
        let reader = ResourceReader::new(StaticTransport::ok(FULL));
        let mut state = state();
        state.clear();

        let outcome = reader.refresh::<Application>(&mut state).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Absent);
        assert_eq!(reader.transport().calls(), 0);
    }

    #[tokio::test]
    async fn test_custom_absent_rule() {
        let reader = ResourceReader::new(StaticTransport::new(StatusCode::GONE, ""))
            .with_absent_rule(classify::StatusAbsentRule::new([StatusCode::GONE]));
        let mut state = state();

        let outcome = reader.refresh::<Application>(&mut state).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Absent);
    }
}
