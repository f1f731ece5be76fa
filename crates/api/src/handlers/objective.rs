//! Handlers for objectives nested under `/projects/{id}/objectives`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use stepwise_core::types::DbId;
use stepwise_core::validation::ObjectiveDraft;
use stepwise_db::models::objective::Objective;
use stepwise_progress::views::AddedObjective;

use crate::error::AppResult;
use crate::handlers::positive_id;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/projects/{id}/objectives
pub async fn list_by_project(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Objective>>>> {
    let data = state
        .aggregator
        .list_objectives(positive_id(project_id)?)
        .await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/projects/{id}/objectives
///
/// Body: `{ "title": "...", "steps": ["...", "...", "..."] }`.
pub async fn create(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<ObjectiveDraft>,
) -> AppResult<(StatusCode, Json<DataResponse<AddedObjective>>)> {
    let data = state
        .aggregator
        .create_objective_with_steps(positive_id(project_id)?, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}
