//! Objective entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use stepwise_core::progress::Rollup;
use stepwise_core::types::{DbId, Timestamp};

/// An objective row from the `objectives` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Objective {
    pub id: DbId,
    pub project_id: DbId,
    pub title: String,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub total_steps: i32,
    pub completed_steps: i32,
    pub progress: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Objective {
    /// The objective's stored derived counters.
    pub fn rollup(&self) -> Rollup {
        Rollup {
            total_steps: self.total_steps,
            completed_steps: self.completed_steps,
            progress: self.progress,
        }
    }
}

/// Input for inserting an objective together with its steps.
///
/// `total_steps` is taken from the number of step titles inserted alongside.
#[derive(Debug, Clone)]
pub struct NewObjective {
    pub project_id: DbId,
    pub title: String,
    pub sort_order: i32,
}
