//! Handler for the home dashboard statistics.

use axum::extract::State;
use axum::Json;
use stepwise_core::progress::DashboardSummary;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard
pub async fn summary(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<DashboardSummary>>> {
    let data = state.aggregator.dashboard().await?;
    Ok(Json(DataResponse { data }))
}
