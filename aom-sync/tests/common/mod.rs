//! Shared test utilities for aom-sync integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use aom_sync::{ClientConfig, HttpClient, ResourceReader};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::RwLock;

pub const NOT_FOUND_BODY: &str =
    r#"{"error_code":"AOM.0404","error_msg":"the application does not exist"}"#;

/// A request the mock server received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub id: String,
    pub project_id: Option<String>,
    pub auth_token: Option<String>,
}

#[derive(Clone, Default)]
struct MockState {
    replies: Arc<RwLock<HashMap<String, (StatusCode, String)>>>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn get_application(
    State(state): State<MockState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, String) {
    state.requests.write().await.push(RecordedRequest {
        id: id.clone(),
        project_id: header(&headers, "x-project-id"),
        auth_token: header(&headers, "x-auth-token"),
    });

    state
        .replies
        .read()
        .await
        .get(&id)
        .cloned()
        .unwrap_or((StatusCode::NOT_FOUND, NOT_FOUND_BODY.to_string()))
}

/// Mock AOM CMDB server. Unknown application ids answer 404.
pub struct MockAom {
    pub addr: SocketAddr,
    state: MockState,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl MockAom {
    pub async fn spawn() -> Self {
        let state = MockState::default();
        let router = Router::new()
            .route("/v1/applications/{id}", get(get_application))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("Server error");
        });

        Self {
            addr,
            state,
            shutdown_tx,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Serve `body` with 200 for `id`.
    pub async fn put_json(&self, id: &str, body: Value) {
        self.put_raw(id, StatusCode::OK, &body.to_string()).await;
    }

    pub async fn put_raw(&self, id: &str, status: StatusCode, body: &str) {
        self.state
            .replies
            .write()
            .await
            .insert(id.to_string(), (status, body.to_string()));
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.read().await.clone()
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new("cn-north-4", "proj-test")
            .with_token("token-test")
            .with_endpoint(self.endpoint())
    }

    pub fn reader(&self) -> ResourceReader<HttpClient> {
        ResourceReader::new(HttpClient::new(self.config()).expect("Invalid config"))
    }

    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}
