//! Step entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stepwise_core::types::{DbId, Timestamp};

/// A step row from the `steps` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Step {
    pub id: DbId,
    pub project_id: DbId,
    pub objective_id: DbId,
    pub title: String,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub is_completed: bool,
    pub completion_note: Option<String>,
    /// Set iff `is_completed`.
    pub completed_at: Option<Timestamp>,
    pub completed_by: Option<String>,
    pub created_at: Timestamp,
}

/// The one allowed mutation of a step: marking it complete.
#[derive(Debug, Clone)]
pub struct StepCompletion {
    pub completion_note: Option<String>,
    pub completed_by: Option<String>,
    pub completed_at: Timestamp,
}

/// Scope for step listings. With both ids set, both must match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct StepFilter {
    pub project_id: Option<DbId>,
    pub objective_id: Option<DbId>,
}

impl StepFilter {
    /// All steps of a project.
    pub fn project(project_id: DbId) -> Self {
        Self {
            project_id: Some(project_id),
            objective_id: None,
        }
    }

    /// All steps of an objective.
    pub fn objective(objective_id: DbId) -> Self {
        Self {
            project_id: None,
            objective_id: Some(objective_id),
        }
    }

    /// Whether `step` falls within this scope.
    pub fn matches(&self, step: &Step) -> bool {
        self.project_id.map_or(true, |id| step.project_id == id)
            && self.objective_id.map_or(true, |id| step.objective_id == id)
    }
}
