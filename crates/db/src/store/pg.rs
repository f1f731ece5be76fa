//! PostgreSQL implementation of [`ProjectStore`].

use async_trait::async_trait;
use stepwise_core::progress::Rollup;
use stepwise_core::types::DbId;

use crate::error::StoreError;
use crate::models::objective::{NewObjective, Objective};
use crate::models::project::{DeleteSummary, NewProject, Project, UpdateProject};
use crate::models::step::{Step, StepCompletion, StepFilter};
use crate::repositories::{ObjectiveRepo, ProjectRepo, StepRepo};
use crate::store::ProjectStore;
use crate::DbPool;

/// Store backed by a PostgreSQL connection pool.
///
/// Multi-row writes (objective plus steps, cascading delete) each run in a
/// single transaction.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_project(&self, input: &NewProject) -> Result<Project, StoreError> {
        Ok(ProjectRepo::create(&self.pool, input).await?)
    }

    async fn get_project(&self, id: DbId) -> Result<Option<Project>, StoreError> {
        Ok(ProjectRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(ProjectRepo::list(&self.pool).await?)
    }

    async fn update_project(
        &self,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, StoreError> {
        Ok(ProjectRepo::update(&self.pool, id, input).await?)
    }

    async fn set_project_progress(
        &self,
        id: DbId,
        rollup: &Rollup,
    ) -> Result<Option<Project>, StoreError> {
        Ok(ProjectRepo::set_progress(&self.pool, id, rollup).await?)
    }

    async fn delete_project(&self, id: DbId) -> Result<DeleteSummary, StoreError> {
        let mut tx = self.pool.begin().await?;
        let steps = StepRepo::delete_by_project(&mut *tx, id).await?;
        let objectives = ObjectiveRepo::delete_by_project(&mut *tx, id).await?;
        let project = ProjectRepo::hard_delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::debug!(project_id = id, steps, objectives, project, "Deleted project rows");
        Ok(DeleteSummary {
            steps,
            objectives,
            project,
        })
    }

    async fn create_objective(
        &self,
        input: &NewObjective,
        step_titles: &[String],
    ) -> Result<(Objective, Vec<Step>), StoreError> {
        let total_steps = i32::try_from(step_titles.len()).unwrap_or(i32::MAX);

        let mut tx = self.pool.begin().await?;
        let objective = ObjectiveRepo::create(&mut *tx, input, total_steps).await?;
        let steps =
            StepRepo::bulk_create(&mut *tx, input.project_id, objective.id, step_titles).await?;
        tx.commit().await?;

        tracing::debug!(
            project_id = input.project_id,
            objective_id = objective.id,
            steps = steps.len(),
            "Inserted objective with steps",
        );
        Ok((objective, steps))
    }

    async fn get_objective(&self, id: DbId) -> Result<Option<Objective>, StoreError> {
        Ok(ObjectiveRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_objectives(&self, project_id: DbId) -> Result<Vec<Objective>, StoreError> {
        Ok(ObjectiveRepo::list_by_project(&self.pool, project_id).await?)
    }

    async fn set_objective_progress(
        &self,
        id: DbId,
        rollup: &Rollup,
    ) -> Result<Option<Objective>, StoreError> {
        Ok(ObjectiveRepo::set_progress(&self.pool, id, rollup).await?)
    }

    async fn get_step(&self, id: DbId) -> Result<Option<Step>, StoreError> {
        Ok(StepRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_steps(&self, filter: &StepFilter) -> Result<Vec<Step>, StoreError> {
        Ok(StepRepo::list(&self.pool, filter).await?)
    }

    async fn complete_step(
        &self,
        id: DbId,
        input: &StepCompletion,
    ) -> Result<Option<Step>, StoreError> {
        Ok(StepRepo::complete(&self.pool, id, input).await?)
    }
}
