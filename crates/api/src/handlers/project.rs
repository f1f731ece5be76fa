//! Handlers for the `/projects` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use stepwise_core::types::DbId;
use stepwise_core::validation::{ObjectiveDraft, ProjectFields};
use stepwise_db::models::project::{Project, UpdateProject};
use stepwise_progress::views::{ProjectDetail, ProjectReport, ReconcileReport};

use crate::error::AppResult;
use crate::handlers::positive_id;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for creating a project together with its objectives.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(flatten)]
    pub fields: ProjectFields,
    #[serde(default)]
    pub objectives: Vec<ObjectiveDraft>,
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectDetail>>)> {
    let data = state
        .aggregator
        .create_project_with_objectives(&input.fields, &input.objectives)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/projects
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let data = state.aggregator.list_projects().await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectDetail>>> {
    let data = state.aggregator.project_detail(positive_id(id)?).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/projects/{id}
///
/// Only descriptive fields are accepted; a body naming a derived field such
/// as `progress` is rejected by the extractor.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    let data = state
        .aggregator
        .update_project_details(positive_id(id)?, &input)
        .await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/projects/{id}
///
/// Returns 204 whether or not the project existed.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    state.aggregator.delete_project(positive_id(id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/projects/{id}/report
pub async fn report(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectReport>>> {
    let data = state.aggregator.project_report(positive_id(id)?).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/projects/{id}/reconcile
pub async fn reconcile(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReconcileReport>>> {
    let data = state.aggregator.reconcile_project(positive_id(id)?).await?;
    Ok(Json(DataResponse { data }))
}
