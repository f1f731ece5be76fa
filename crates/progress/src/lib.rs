//! The progress aggregator: the single writer of every derived counter and
//! status in Stepwise.
//!
//! Handlers never touch `total_steps`, `completed_steps`, `progress` or
//! `status` directly; they call [`ProgressAggregator`], which serializes
//! writes per project and recomputes the counters after each change.

pub mod aggregator;
pub mod error;
pub mod locks;
pub mod views;

pub use aggregator::{AggregatorConfig, ProgressAggregator};
pub use error::{ProgressError, ProgressResult};
