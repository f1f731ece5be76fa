pub mod dashboard;
pub mod objective;
pub mod project;
pub mod step;

use stepwise_core::types::DbId;

use crate::error::{AppError, AppResult};

/// Reject ids that can never exist, before touching the store.
pub(crate) fn positive_id(id: DbId) -> AppResult<DbId> {
    if id > 0 {
        Ok(id)
    } else {
        Err(AppError::BadRequest(format!(
            "id must be a positive integer, got {id}"
        )))
    }
}
