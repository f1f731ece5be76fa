//! Route definitions for the `/steps` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::step;
use crate::state::AppState;

/// Routes mounted at `/steps`.
///
/// ```text
/// POST   /{id}/complete           -> complete
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/complete", post(step::complete))
}
