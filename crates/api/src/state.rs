use std::sync::Arc;

use stepwise_progress::ProgressAggregator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The aggregator every handler reads and writes through.
    pub aggregator: Arc<ProgressAggregator>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
