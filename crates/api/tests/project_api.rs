//! HTTP-level tests for the `/projects` endpoints.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, create_project, delete, get, post_empty, post_json, put_json,
    step_ids,
};
use serde_json::json;
use stepwise_db::store::{MemoryStore, StoreOp};

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_project_returns_201_with_nested_objectives() {
    let store = Arc::new(MemoryStore::new());
    let project = create_project(&store, 2).await;

    assert!(project["id"].is_number());
    assert_eq!(project["status"], "not_started");
    assert_eq!(project["total_steps"], 6);
    assert_eq!(project["progress"], 0);
    assert_eq!(project["objectives"].as_array().unwrap().len(), 2);
    assert_eq!(project["objectives"][1]["order"], 1);
    assert_eq!(project["objectives"][0]["steps"][2]["order"], 2);
    assert_eq!(project["objectives"][0]["steps"][0]["is_completed"], false);
}

#[tokio::test]
async fn create_project_without_objectives_is_400() {
    let store = Arc::new(MemoryStore::new());
    let app = build_test_app(Arc::clone(&store));
    let response = post_json(app, "/api/v1/projects", common::project_body("Empty", 0)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(store.row_counts().await, (0, 0, 0));
}

#[tokio::test]
async fn create_project_with_short_objective_is_400() {
    let store = Arc::new(MemoryStore::new());
    let mut body = common::project_body("Short", 1);
    body["objectives"][0]["steps"] = json!(["only", "", "two"]);

    let response = post_json(build_test_app(Arc::clone(&store)), "/api/v1/projects", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("objective 1"));
    assert_eq!(store.row_counts().await, (0, 0, 0));
}

#[tokio::test]
async fn create_project_store_failure_is_503_and_leaves_nothing() {
    let store = Arc::new(MemoryStore::new());
    store.fail_next(StoreOp::CreateObjective).await;

    let response = post_json(
        build_test_app(Arc::clone(&store)),
        "/api/v1/projects",
        common::project_body("Doomed", 2),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "PERSISTENCE_FAILURE");
    assert_eq!(store.row_counts().await, (0, 0, 0));
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_projects_newest_first() {
    let store = Arc::new(MemoryStore::new());
    let first = create_project(&store, 1).await;
    let second = create_project(&store, 1).await;

    let response = get(build_test_app(store), "/api/v1/projects").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![second["id"].as_i64().unwrap(), first["id"].as_i64().unwrap()]
    );
}

#[tokio::test]
async fn get_project_detail() {
    let store = Arc::new(MemoryStore::new());
    let project = create_project(&store, 2).await;
    let id = project["id"].as_i64().unwrap();

    let response = get(build_test_app(store), &format!("/api/v1/projects/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Tracker");
    assert_eq!(step_ids(&json["data"]), step_ids(&project));
}

#[tokio::test]
async fn get_missing_project_is_404() {
    let app = build_test_app(Arc::new(MemoryStore::new()));
    let response = get(app, "/api/v1/projects/999999").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "NOT_FOUND");
}

#[tokio::test]
async fn non_positive_id_is_bad_request() {
    let app = build_test_app(Arc::new(MemoryStore::new()));
    let response = get(app, "/api/v1/projects/0").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn list_objectives_and_filtered_steps() {
    let store = Arc::new(MemoryStore::new());
    let project = create_project(&store, 2).await;
    let id = project["id"].as_i64().unwrap();
    let second_objective = project["objectives"][1]["id"].as_i64().unwrap();

    let response = get(
        build_test_app(Arc::clone(&store)),
        &format!("/api/v1/projects/{id}/objectives"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 2);

    let response = get(
        build_test_app(Arc::clone(&store)),
        &format!("/api/v1/projects/{id}/steps"),
    )
    .await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 6);

    let response = get(
        build_test_app(store),
        &format!("/api/v1/projects/{id}/steps?objective_id={second_objective}"),
    )
    .await;
    let json = body_json(response).await;
    let steps = json["data"].as_array().unwrap();
    assert_eq!(steps.len(), 3);
    assert!(steps.iter().all(|s| s["objective_id"] == second_objective));
}

// ---------------------------------------------------------------------------
// Add objective
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_objective_updates_project_totals() {
    let store = Arc::new(MemoryStore::new());
    let project = create_project(&store, 1).await;
    let id = project["id"].as_i64().unwrap();

    let response = post_json(
        build_test_app(store),
        &format!("/api/v1/projects/{id}/objectives"),
        json!({ "title": "More", "steps": ["a", " ", "b", "c"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["project"]["total_steps"], 6);
    assert_eq!(json["data"]["objective"]["order"], 1);
    assert_eq!(json["data"]["objective"]["total_steps"], 3);
    assert_eq!(json["data"]["objective"]["steps"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn add_objective_to_missing_project_is_404() {
    let app = build_test_app(Arc::new(MemoryStore::new()));
    let response = post_json(
        app,
        "/api/v1/projects/77/objectives",
        json!({ "title": "More", "steps": ["a", "b", "c"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_project_details() {
    let store = Arc::new(MemoryStore::new());
    let project = create_project(&store, 1).await;
    let id = project["id"].as_i64().unwrap();

    let response = put_json(
        build_test_app(store),
        &format!("/api/v1/projects/{id}"),
        json!({ "name": "Renamed", "cover_image": "https://img.example/c.png" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Renamed");
    assert_eq!(json["data"]["cover_image"], "https://img.example/c.png");
    assert_eq!(json["data"]["total_steps"], 3);
}

#[tokio::test]
async fn update_rejects_derived_fields() {
    let store = Arc::new(MemoryStore::new());
    let project = create_project(&store, 1).await;
    let id = project["id"].as_i64().unwrap();

    let response = put_json(
        build_test_app(Arc::clone(&store)),
        &format!("/api/v1/projects/{id}"),
        json!({ "progress": 100 }),
    )
    .await;
    assert!(response.status().is_client_error());

    let response = get(build_test_app(store), &format!("/api/v1/projects/{id}")).await;
    assert_eq!(body_json(response).await["data"]["progress"], 0);
}

#[tokio::test]
async fn update_blank_name_is_400() {
    let store = Arc::new(MemoryStore::new());
    let project = create_project(&store, 1).await;
    let id = project["id"].as_i64().unwrap();

    let response = put_json(
        build_test_app(store),
        &format!("/api/v1/projects/{id}"),
        json!({ "name": "   " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_project_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let project = create_project(&store, 2).await;
    let id = project["id"].as_i64().unwrap();

    let response = delete(
        build_test_app(Arc::clone(&store)),
        &format!("/api/v1/projects/{id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(store.row_counts().await, (0, 0, 0));

    let response = delete(
        build_test_app(Arc::clone(&store)),
        &format!("/api/v1/projects/{id}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(build_test_app(store), &format!("/api/v1/projects/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Report, reconcile, dashboard
// ---------------------------------------------------------------------------

#[tokio::test]
async fn report_and_dashboard_reflect_completion() {
    let store = Arc::new(MemoryStore::new());
    let project = create_project(&store, 1).await;
    let id = project["id"].as_i64().unwrap();
    let steps = step_ids(&project);

    let response = post_json(
        build_test_app(Arc::clone(&store)),
        &format!("/api/v1/steps/{}/complete", steps[0]),
        json!({ "completion_note": "done" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(
        build_test_app(Arc::clone(&store)),
        &format!("/api/v1/projects/{id}/report"),
    )
    .await;
    let report = body_json(response).await;
    assert_eq!(report["data"]["completed_count"], 1);
    assert_eq!(report["data"]["pending_count"], 2);
    assert_eq!(
        report["data"]["objectives"][0]["completed"][0]["completion_note"],
        "done"
    );

    let response = get(build_test_app(store), "/api/v1/dashboard").await;
    let dashboard = body_json(response).await;
    assert_eq!(dashboard["data"]["total_projects"], 1);
    assert_eq!(dashboard["data"]["in_progress"], 1);
    assert_eq!(dashboard["data"]["average_progress"], 33);
}

#[tokio::test]
async fn reconcile_repairs_after_store_failure() {
    let store = Arc::new(MemoryStore::new());
    let project = create_project(&store, 1).await;
    let id = project["id"].as_i64().unwrap();
    let steps = step_ids(&project);

    // Break both the rollup and its automatic repair.
    store.fail_next(StoreOp::SetObjectiveProgress).await;
    store.fail_next(StoreOp::SetObjectiveProgress).await;
    let response = post_json(
        build_test_app(Arc::clone(&store)),
        &format!("/api/v1/steps/{}/complete", steps[0]),
        json!({ "completion_note": "done" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = post_empty(
        build_test_app(store),
        &format!("/api/v1/projects/{id}/reconcile"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["objectives_updated"], 1);
    assert_eq!(json["data"]["project"]["completed_steps"], 1);
    assert_eq!(json["data"]["project"]["progress"], 33);
}
