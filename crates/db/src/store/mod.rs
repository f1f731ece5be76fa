//! The persistence gateway used by the progress aggregator.
//!
//! [`ProjectStore`] is the narrow set of reads and typed writes the
//! aggregator needs. [`PgStore`] backs it with PostgreSQL; [`MemoryStore`]
//! keeps everything in process for tests and database-less local runs.

use async_trait::async_trait;
use stepwise_core::progress::Rollup;
use stepwise_core::types::DbId;

use crate::error::StoreError;
use crate::models::objective::{NewObjective, Objective};
use crate::models::project::{DeleteSummary, NewProject, Project, UpdateProject};
use crate::models::step::{Step, StepCompletion, StepFilter};

pub mod memory;
pub mod pg;

pub use memory::{MemoryStore, StoreOp};
pub use pg::PgStore;

/// Storage operations over projects, objectives and steps.
///
/// Every write is typed: descriptive fields go through [`UpdateProject`],
/// derived counters through a [`Rollup`], and step completion through
/// [`StepCompletion`]. Reads observe all writes previously acknowledged by
/// the same store.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Cheap reachability probe.
    async fn ping(&self) -> Result<(), StoreError>;

    // -- Projects -------------------------------------------------------------

    async fn create_project(&self, input: &NewProject) -> Result<Project, StoreError>;

    async fn get_project(&self, id: DbId) -> Result<Option<Project>, StoreError>;

    /// All projects, most recently created first.
    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;

    /// Apply a descriptive-field patch. `None` if the project is missing.
    async fn update_project(
        &self,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, StoreError>;

    /// Overwrite derived counters and status. `None` if the project is missing.
    async fn set_project_progress(
        &self,
        id: DbId,
        rollup: &Rollup,
    ) -> Result<Option<Project>, StoreError>;

    /// Delete the project's steps, then its objectives, then the project.
    ///
    /// Deleting a missing project succeeds with an empty summary.
    async fn delete_project(&self, id: DbId) -> Result<DeleteSummary, StoreError>;

    // -- Objectives -----------------------------------------------------------

    /// Insert an objective and one incomplete step per title as a unit.
    async fn create_objective(
        &self,
        input: &NewObjective,
        step_titles: &[String],
    ) -> Result<(Objective, Vec<Step>), StoreError>;

    async fn get_objective(&self, id: DbId) -> Result<Option<Objective>, StoreError>;

    /// Objectives of a project ordered by `sort_order`.
    async fn list_objectives(&self, project_id: DbId) -> Result<Vec<Objective>, StoreError>;

    /// Overwrite derived counters. `None` if the objective is missing.
    async fn set_objective_progress(
        &self,
        id: DbId,
        rollup: &Rollup,
    ) -> Result<Option<Objective>, StoreError>;

    // -- Steps ----------------------------------------------------------------

    async fn get_step(&self, id: DbId) -> Result<Option<Step>, StoreError>;

    /// Steps in scope, ordered by objective position then step position.
    async fn list_steps(&self, filter: &StepFilter) -> Result<Vec<Step>, StoreError>;

    /// Complete a step only if it is incomplete. `None` when the step is
    /// missing or already complete.
    async fn complete_step(
        &self,
        id: DbId,
        input: &StepCompletion,
    ) -> Result<Option<Step>, StoreError>;
}
