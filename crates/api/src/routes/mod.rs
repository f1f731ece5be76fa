pub mod dashboard;
pub mod health;
pub mod project;
pub mod step;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                   list, create (with objectives)
/// /projects/{id}                              detail, update, delete
/// /projects/{id}/objectives                   list, add objective with steps
/// /projects/{id}/steps                        list (?objective_id=)
/// /projects/{id}/report                       completed / pending report
/// /projects/{id}/reconcile                    recompute counters (POST)
///
/// /steps/{id}/complete                        complete a step (POST)
///
/// /dashboard                                  counts per status, average progress
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/steps", step::router())
        .nest("/dashboard", dashboard::router())
}
