/// Failure of the underlying store, surfaced to callers as a persistence
/// failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store could not serve the request (used by the in-memory store
    /// when a failure has been injected).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
