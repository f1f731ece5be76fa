#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use stepwise_db::store::MemoryStore;
use stepwise_progress::{AggregatorConfig, ProgressAggregator};
use tower::ServiceExt;

use stepwise_api::config::ServerConfig;
use stepwise_api::router::build_app_router;
use stepwise_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        database_max_connections: 1,
        require_completion_note: true,
    }
}

/// Build the full application router over the given in-memory store.
///
/// Uses the same builder as `main.rs`, so tests exercise the production
/// middleware stack.
pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    build_test_app_with(store, test_config())
}

pub fn build_test_app_with(store: Arc<MemoryStore>, config: ServerConfig) -> Router {
    let aggregator = ProgressAggregator::new(
        store,
        AggregatorConfig {
            require_completion_note: config.require_completion_note,
        },
    );
    let state = AppState {
        aggregator: Arc::new(aggregator),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// A project body with `objectives` objectives of three steps each.
pub fn project_body(name: &str, objectives: usize) -> serde_json::Value {
    let objectives: Vec<serde_json::Value> = (1..=objectives)
        .map(|i| {
            serde_json::json!({
                "title": format!("Objective {i}"),
                "steps": ["first", "second", "third"],
            })
        })
        .collect();
    serde_json::json!({
        "name": name,
        "what_is": "A thing to do",
        "how_to_do": "Step by step",
        "what_to_expect": "It gets done",
        "objectives": objectives,
    })
}

/// Create a project through the API and return its `data` payload.
pub async fn create_project(store: &Arc<MemoryStore>, objectives: usize) -> serde_json::Value {
    let app = build_test_app(Arc::clone(store));
    let response = post_json(app, "/api/v1/projects", project_body("Tracker", objectives)).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

/// Ids of all steps in a project detail payload, in display order.
pub fn step_ids(project: &serde_json::Value) -> Vec<i64> {
    project["objectives"]
        .as_array()
        .unwrap()
        .iter()
        .flat_map(|o| o["steps"].as_array().unwrap().iter())
        .map(|s| s["id"].as_i64().unwrap())
        .collect()
}
