//! Project entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stepwise_core::error::CoreError;
use stepwise_core::progress::{ProjectStatus, Rollup};
use stepwise_core::types::{DbId, Timestamp};
use stepwise_core::validation::{
    not_blank, ProjectFields, MAX_NAME_LENGTH, MAX_TEXT_LENGTH, MAX_URL_LENGTH,
};
use validator::Validate;

/// A project row from the `projects` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub what_is: String,
    pub how_to_do: String,
    pub what_to_expect: String,
    pub cover_image: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,
    pub total_steps: i32,
    pub completed_steps: i32,
    pub progress: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// The project's stored derived counters.
    pub fn rollup(&self) -> Rollup {
        Rollup {
            total_steps: self.total_steps,
            completed_steps: self.completed_steps,
            progress: self.progress,
        }
    }
}

/// Input for inserting a project.
///
/// Counters start at zero except `total_steps`, which is the number of steps
/// about to be created under the project. Status starts at `not_started`.
#[derive(Debug, Clone)]
pub struct NewProject {
    pub fields: ProjectFields,
    pub total_steps: i32,
}

/// Partial update of a project's descriptive fields. All fields are optional.
///
/// Derived fields (`total_steps`, `completed_steps`, `progress`, `status`)
/// are deliberately absent; they change only through the aggregator.
/// An empty `cover_image` clears the cover.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProject {
    #[validate(length(max = MAX_NAME_LENGTH), custom(function = "not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = MAX_TEXT_LENGTH), custom(function = "not_blank"))]
    pub what_is: Option<String>,
    #[validate(length(max = MAX_TEXT_LENGTH), custom(function = "not_blank"))]
    pub how_to_do: Option<String>,
    #[validate(length(max = MAX_TEXT_LENGTH), custom(function = "not_blank"))]
    pub what_to_expect: Option<String>,
    #[validate(length(max = MAX_URL_LENGTH))]
    pub cover_image: Option<String>,
}

impl UpdateProject {
    /// Validate and return a trimmed copy.
    pub fn normalized(&self) -> Result<Self, CoreError> {
        self.validate()?;
        let trim = |v: &Option<String>| v.as_deref().map(|s| s.trim().to_string());
        Ok(Self {
            name: trim(&self.name),
            what_is: trim(&self.what_is),
            how_to_do: trim(&self.how_to_do),
            what_to_expect: trim(&self.what_to_expect),
            cover_image: trim(&self.cover_image),
        })
    }

    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.what_is.is_none()
            && self.how_to_do.is_none()
            && self.what_to_expect.is_none()
            && self.cover_image.is_none()
    }
}

/// Row counts removed by a cascading project delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    pub steps: u64,
    pub objectives: u64,
    pub project: bool,
}

impl DeleteSummary {
    /// True when nothing existed to delete.
    pub fn is_noop(&self) -> bool {
        self.steps == 0 && self.objectives == 0 && !self.project
    }
}
