#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use name_enricher::config::EnrichmentConfig;
use name_enricher::{build_app, HttpNameLookup, MemoryStore};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Canned answers for the three inference services.
#[derive(Debug, Clone)]
pub struct MockServices {
    pub age_status: StatusCode,
    pub age: Value,
    pub gender: Value,
    pub countries: Value,
}

impl Default for MockServices {
    fn default() -> Self {
        Self {
            age_status: StatusCode::OK,
            age: json!(35),
            gender: json!("male"),
            countries: json!([
                {"country_id": "US", "probability": 0.8},
                {"country_id": "GB", "probability": 0.1}
            ]),
        }
    }
}

async fn age(State(mock): State<MockServices>, Query(query): Query<HashMap<String, String>>) -> Response {
    if mock.age_status != StatusCode::OK {
        return mock.age_status.into_response();
    }
    Json(json!({"name": query.get("name"), "age": mock.age, "count": 1})).into_response()
}

async fn gender(State(mock): State<MockServices>, Query(query): Query<HashMap<String, String>>) -> Response {
    Json(json!({"name": query.get("name"), "gender": mock.gender, "probability": 0.99})).into_response()
}

async fn nationality(State(mock): State<MockServices>, Query(query): Query<HashMap<String, String>>) -> Response {
    Json(json!({"name": query.get("name"), "country": mock.countries})).into_response()
}

async fn garbage() -> &'static str {
    "not json"
}

/// Serve the mocks on an ephemeral port and return matching client config.
pub async fn spawn_mock_services(mock: MockServices) -> EnrichmentConfig {
    let router = Router::new()
        .route("/age", get(age))
        .route("/gender", get(gender))
        .route("/nationality", get(nationality))
        .route("/garbage", get(garbage))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    EnrichmentConfig {
        age_url: format!("http://{}/age", addr),
        gender_url: format!("http://{}/gender", addr),
        nationality_url: format!("http://{}/nationality", addr),
        timeout_secs: Some(5),
    }
}

/// In-process client for the service router.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub async fn new(mock: MockServices) -> Self {
        let config = spawn_mock_services(mock).await;
        let store = Arc::new(MemoryStore::new());
        let lookup = Arc::new(HttpNameLookup::new(&config).unwrap());
        Self {
            router: build_app(store.clone(), lookup),
            store,
        }
    }

    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(path);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.request("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request("PATCH", path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request("PUT", path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.request("DELETE", path, None).await
    }
}
