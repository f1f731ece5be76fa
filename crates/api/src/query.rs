//! Query parameter types for API handlers.

use serde::Deserialize;
use stepwise_core::types::DbId;

/// `?objective_id=` filter for step listings.
#[derive(Debug, Default, Deserialize)]
pub struct StepListParams {
    pub objective_id: Option<DbId>,
}
