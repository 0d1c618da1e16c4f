// Shared test helpers: a stand-in ZVM appliance (axum) and a stand-in Graphite listener.
#![allow(dead_code)]

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode, header::ACCEPT};
use axum::response::IntoResponse;
use axum::{Router, routing::get};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use zerto_graphite::models::RawSample;
use zerto_graphite::zerto_repo::SAMPLES_PATH;

/// One request seen by the mock appliance.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub query: HashMap<String, String>,
    pub accept: Option<String>,
}

#[derive(Clone)]
struct ApplianceState {
    status: StatusCode,
    body: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct MockAppliance {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockAppliance {
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn get_samples(
    State(state): State<ApplianceState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let accept = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state
        .requests
        .lock()
        .unwrap()
        .push(RecordedRequest { query, accept });
    (
        state.status,
        [("content-type", "application/json")],
        state.body.clone(),
    )
}

/// Serves `body` with `status` on the samples path over plain HTTP.
pub async fn spawn_appliance_raw(status: StatusCode, body: impl Into<String>) -> MockAppliance {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = ApplianceState {
        status,
        body: body.into(),
        requests: requests.clone(),
    };
    let app = Router::new()
        .route(&format!("/{}", SAMPLES_PATH), get(get_samples))
        .with_state(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    MockAppliance {
        base_url: format!("http://{}", addr),
        requests,
    }
}

pub async fn spawn_appliance(samples: serde_json::Value) -> MockAppliance {
    spawn_appliance_raw(StatusCode::OK, samples.to_string()).await
}

/// Accepts `connections` connections and returns what each one sent before closing.
pub async fn spawn_graphite_sink(connections: usize) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let mut received = Vec::with_capacity(connections);
        for _ in 0..connections {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = String::new();
            socket.read_to_string(&mut buf).await.unwrap();
            received.push(buf);
        }
        received
    });
    (port, handle)
}

/// A local port with nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

pub fn samples(value: serde_json::Value) -> Vec<RawSample> {
    serde_json::from_value(value).unwrap()
}

/// The three-sample scenario: two "Prod Cluster" samples and one non-cluster sample.
pub fn prod_cluster_samples() -> serde_json::Value {
    serde_json::json!([
        {"TargetCluster": "Prod Cluster", "RPO": 5.9, "Throughput": 100, "Note": "ok"},
        {"TargetCluster": "Prod Cluster", "RPO": 2.1, "Throughput": 50},
        {"TargetCluster": "", "RPO": 99}
    ])
}
