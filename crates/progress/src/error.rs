use stepwise_core::error::CoreError;
use stepwise_db::error::StoreError;

/// Failure of an aggregator operation.
#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    /// Not found, validation or state errors from the domain layer.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The store rejected or failed a read or write.
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

pub type ProgressResult<T> = Result<T, ProgressError>;

impl ProgressError {
    pub(crate) fn not_found(entity: &'static str, id: stepwise_core::types::DbId) -> Self {
        Self::Core(CoreError::NotFound { entity, id })
    }
}
