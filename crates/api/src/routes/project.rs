//! Route definitions for the `/projects` resource and its nested
//! objectives, steps and reports.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{objective, project, step};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                        -> list
/// POST   /                        -> create
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}                    -> update
/// DELETE /{id}                    -> delete
/// GET    /{id}/report             -> report
/// POST   /{id}/reconcile          -> reconcile
///
/// GET    /{id}/objectives         -> objective::list_by_project
/// POST   /{id}/objectives         -> objective::create
/// GET    /{id}/steps              -> step::list_by_project
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/report", get(project::report))
        .route("/{id}/reconcile", post(project::reconcile))
        .route(
            "/{id}/objectives",
            get(objective::list_by_project).post(objective::create),
        )
        .route("/{id}/steps", get(step::list_by_project))
}
