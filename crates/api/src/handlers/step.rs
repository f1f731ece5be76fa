//! Handlers for steps.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use stepwise_core::types::DbId;
use stepwise_db::models::step::Step;
use stepwise_progress::views::CompletedStep;

use crate::error::AppResult;
use crate::handlers::positive_id;
use crate::query::StepListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for completing a step.
#[derive(Debug, Default, Deserialize)]
pub struct CompleteStepRequest {
    #[serde(default)]
    pub completion_note: Option<String>,
    #[serde(default)]
    pub completed_by: Option<String>,
}

/// GET /api/v1/projects/{id}/steps
pub async fn list_by_project(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<StepListParams>,
) -> AppResult<Json<DataResponse<Vec<Step>>>> {
    let objective_id = params.objective_id.map(positive_id).transpose()?;
    let data = state
        .aggregator
        .list_steps(positive_id(project_id)?, objective_id)
        .await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/steps/{id}/complete
pub async fn complete(
    State(state): State<AppState>,
    Path(step_id): Path<DbId>,
    Json(input): Json<CompleteStepRequest>,
) -> AppResult<Json<DataResponse<CompletedStep>>> {
    let data = state
        .aggregator
        .complete_step(
            positive_id(step_id)?,
            input.completion_note.as_deref(),
            input.completed_by.as_deref(),
        )
        .await?;
    Ok(Json(DataResponse { data }))
}
