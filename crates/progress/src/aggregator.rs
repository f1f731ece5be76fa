//! [`ProgressAggregator`]: every write that changes derived counters.

use std::sync::Arc;

use chrono::Utc;
use stepwise_core::error::CoreError;
use stepwise_core::progress::{summarize, DashboardSummary, Rollup};
use stepwise_core::types::DbId;
use stepwise_core::validation::{
    normalize_completed_by, normalize_completion_note, validate_new_project, ObjectiveDraft,
    ProjectFields, ValidObjective,
};
use stepwise_db::models::objective::{NewObjective, Objective};
use stepwise_db::models::project::{DeleteSummary, NewProject, Project, UpdateProject};
use stepwise_db::models::step::{Step, StepCompletion, StepFilter};
use stepwise_db::store::ProjectStore;

use crate::error::{ProgressError, ProgressResult};
use crate::locks::ProjectLocks;
use crate::views::{
    group_steps, AddedObjective, CompletedStep, ObjectiveWithSteps, ProjectDetail, ProjectReport,
    ReconcileReport,
};

/// Policy knobs for the aggregator.
#[derive(Debug, Clone, Copy)]
pub struct AggregatorConfig {
    /// Reject step completions without a non-blank note.
    pub require_completion_note: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            require_completion_note: true,
        }
    }
}

/// Applies mutations to projects, objectives and steps and keeps their
/// derived counters consistent.
///
/// Every mutation of a project holds that project's lock from its first
/// write until its counters are rewritten. Counters are always recomputed
/// from rows read after the triggering write.
pub struct ProgressAggregator {
    store: Arc<dyn ProjectStore>,
    locks: ProjectLocks,
    config: AggregatorConfig,
}

impl ProgressAggregator {
    pub fn new(store: Arc<dyn ProjectStore>, config: AggregatorConfig) -> Self {
        Self {
            store,
            locks: ProjectLocks::new(),
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn ProjectStore> {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    /// Mark a step complete and roll the change up to its objective and
    /// project.
    ///
    /// The objective's `total_steps` is kept as stored; only its completed
    /// count and progress move. Fails with `InvalidState` if the step is
    /// already complete, before the completion note is checked.
    pub async fn complete_step(
        &self,
        step_id: DbId,
        completion_note: Option<&str>,
        completed_by: Option<&str>,
    ) -> ProgressResult<CompletedStep> {
        let step = self.require_step(step_id).await?;
        if step.is_completed {
            return Err(already_completed(step_id));
        }

        let completion = StepCompletion {
            completion_note: normalize_completion_note(
                completion_note,
                self.config.require_completion_note,
            )?,
            completed_by: normalize_completed_by(completed_by)?,
            completed_at: Utc::now(),
        };

        let _guard = self.locks.lock(step.project_id).await;

        let Some(step) = self.store.complete_step(step_id, &completion).await? else {
            // Lost a race with another completer, or the project was deleted.
            self.require_step(step_id).await?;
            return Err(already_completed(step_id));
        };

        match self.roll_up_completion(&step).await {
            Ok((objective, project)) => {
                tracing::info!(
                    step_id,
                    objective_id = objective.id,
                    project_id = project.id,
                    objective_progress = objective.progress,
                    project_progress = project.progress,
                    status = %project.status,
                    "Step completed",
                );
                Ok(CompletedStep {
                    step,
                    objective,
                    project,
                })
            }
            Err(e) => {
                tracing::error!(
                    step_id,
                    project_id = step.project_id,
                    error = %e,
                    "Failed to roll up step completion",
                );
                self.repair(step.project_id).await;
                Err(e)
            }
        }
    }

    async fn roll_up_completion(&self, step: &Step) -> ProgressResult<(Objective, Project)> {
        let objective = self
            .store
            .get_objective(step.objective_id)
            .await?
            .ok_or_else(|| ProgressError::not_found("objective", step.objective_id))?;
        let siblings = self
            .store
            .list_steps(&StepFilter::objective(objective.id))
            .await?;
        let rollup = objective.rollup().with_completed(count_completed(&siblings));
        let objective = self
            .store
            .set_objective_progress(objective.id, &rollup)
            .await?
            .ok_or_else(|| ProgressError::not_found("objective", step.objective_id))?;

        let project = self.require_project(step.project_id).await?;
        let project_steps = self
            .store
            .list_steps(&StepFilter::project(project.id))
            .await?;
        let rollup = project
            .rollup()
            .with_completed(count_completed(&project_steps));
        let project = self
            .store
            .set_project_progress(project.id, &rollup)
            .await?
            .ok_or_else(|| ProgressError::not_found("project", step.project_id))?;

        Ok((objective, project))
    }

    // -----------------------------------------------------------------------
    // Objectives
    // -----------------------------------------------------------------------

    /// Add an objective with its steps to an existing project.
    ///
    /// The objective is placed after the project's existing objectives. The
    /// project's total grows by the number of steps, which demotes a
    /// completed project back to in progress.
    pub async fn create_objective_with_steps(
        &self,
        project_id: DbId,
        draft: &ObjectiveDraft,
    ) -> ProgressResult<AddedObjective> {
        let valid = draft.normalized()?;

        let _guard = self.locks.lock(project_id).await;
        let project = self.require_project(project_id).await?;
        let position = self.store.list_objectives(project_id).await?.len();

        let objective = self.insert_objective(project_id, position, &valid).await?;
        let rollup = project.rollup().with_added_steps(objective.steps.len());

        let project = match self.store.set_project_progress(project_id, &rollup).await {
            Ok(Some(project)) => project,
            Ok(None) => return Err(ProgressError::not_found("project", project_id)),
            Err(e) => {
                tracing::error!(
                    project_id,
                    objective_id = objective.objective.id,
                    error = %e,
                    "Failed to update project totals after adding objective",
                );
                self.repair(project_id).await;
                return Err(e.into());
            }
        };

        tracing::info!(
            project_id,
            objective_id = objective.objective.id,
            steps = objective.steps.len(),
            project_progress = project.progress,
            status = %project.status,
            "Objective added",
        );
        Ok(AddedObjective { project, objective })
    }

    async fn insert_objective(
        &self,
        project_id: DbId,
        position: usize,
        valid: &ValidObjective,
    ) -> ProgressResult<ObjectiveWithSteps> {
        let input = NewObjective {
            project_id,
            title: valid.title.clone(),
            sort_order: i32::try_from(position).unwrap_or(i32::MAX),
        };
        let (objective, steps) = self.store.create_objective(&input, &valid.steps).await?;
        Ok(ObjectiveWithSteps { objective, steps })
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    /// Create a project together with its objectives and their steps.
    ///
    /// Everything is validated before the first write. The project row is
    /// visible before its lock can be taken, so objective positions and the
    /// final counters are read back from the store under the lock. If any
    /// objective fails to persist, the project (and whatever was written
    /// under it) is deleted again and the persistence error is returned.
    pub async fn create_project_with_objectives(
        &self,
        fields: &ProjectFields,
        objectives: &[ObjectiveDraft],
    ) -> ProgressResult<ProjectDetail> {
        let (fields, objectives) = validate_new_project(fields, objectives)?;
        let total: usize = objectives.iter().map(ValidObjective::step_count).sum();

        let project = self
            .store
            .create_project(&NewProject {
                fields,
                total_steps: i32::try_from(total).unwrap_or(i32::MAX),
            })
            .await?;

        let _guard = self.locks.lock(project.id).await;
        let detail = match self.populate_project(project.id, &objectives).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!(
                    project_id = project.id,
                    error = %e,
                    "Objective creation failed, removing partial project",
                );
                if let Err(cleanup) = self.store.delete_project(project.id).await {
                    tracing::error!(
                        project_id = project.id,
                        error = %cleanup,
                        "Failed to remove partially created project",
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(
            project_id = detail.project.id,
            objectives = detail.objectives.len(),
            total_steps = detail.project.total_steps,
            "Project created",
        );
        Ok(detail)
    }

    /// Insert the objectives of a freshly created project and recount it.
    /// The caller holds the project lock.
    async fn populate_project(
        &self,
        project_id: DbId,
        objectives: &[ValidObjective],
    ) -> ProgressResult<ProjectDetail> {
        for valid in objectives {
            let position = self.store.list_objectives(project_id).await?.len();
            self.insert_objective(project_id, position, valid).await?;
        }
        self.reconcile_locked(project_id).await?;
        self.project_detail(project_id).await
    }

    /// Change a project's descriptive fields.
    ///
    /// An empty patch returns the project unchanged.
    pub async fn update_project_details(
        &self,
        project_id: DbId,
        patch: &UpdateProject,
    ) -> ProgressResult<Project> {
        let patch = patch.normalized()?;
        if patch.is_empty() {
            return self.require_project(project_id).await;
        }

        let project = self
            .store
            .update_project(project_id, &patch)
            .await?
            .ok_or_else(|| ProgressError::not_found("project", project_id))?;
        tracing::info!(project_id, "Project details updated");
        Ok(project)
    }

    /// Delete a project with all its objectives and steps.
    ///
    /// Deleting a project that does not exist succeeds and removes nothing.
    pub async fn delete_project(&self, project_id: DbId) -> ProgressResult<DeleteSummary> {
        let summary = {
            let _guard = self.locks.lock(project_id).await;
            self.store.delete_project(project_id).await?
        };
        self.locks.forget(project_id);

        if summary.is_noop() {
            tracing::debug!(project_id, "Delete of missing project ignored");
        } else {
            tracing::info!(
                project_id,
                objectives = summary.objectives,
                steps = summary.steps,
                "Project deleted",
            );
        }
        Ok(summary)
    }

    /// Recompute every counter of a project and its objectives from the
    /// stored steps, writing only the ones that drifted.
    pub async fn reconcile_project(&self, project_id: DbId) -> ProgressResult<ReconcileReport> {
        let _guard = self.locks.lock(project_id).await;
        self.reconcile_locked(project_id).await
    }

    async fn reconcile_locked(&self, project_id: DbId) -> ProgressResult<ReconcileReport> {
        let project = self.require_project(project_id).await?;
        let objectives = self.store.list_objectives(project_id).await?;
        let steps = self
            .store
            .list_steps(&StepFilter::project(project_id))
            .await?;

        let mut objectives_updated = 0;
        for objective in &objectives {
            let rollup = Rollup::from_completion_flags(
                steps
                    .iter()
                    .filter(|s| s.objective_id == objective.id)
                    .map(|s| s.is_completed),
            );
            if rollup != objective.rollup() {
                self.store
                    .set_objective_progress(objective.id, &rollup)
                    .await?;
                objectives_updated += 1;
            }
        }

        let rollup = Rollup::from_completion_flags(steps.iter().map(|s| s.is_completed));
        let project_updated = rollup != project.rollup() || rollup.status() != project.status;
        let project = if project_updated {
            self.store
                .set_project_progress(project_id, &rollup)
                .await?
                .ok_or_else(|| ProgressError::not_found("project", project_id))?
        } else {
            project
        };

        if objectives_updated > 0 || project_updated {
            tracing::warn!(
                project_id,
                objectives_updated,
                project_updated,
                progress = project.progress,
                "Reconciled drifted counters",
            );
        }
        Ok(ReconcileReport {
            project,
            objectives_updated,
            project_updated,
        })
    }

    /// Best-effort reconciliation after a partial failure. The caller
    /// already holds the project lock.
    async fn repair(&self, project_id: DbId) {
        match self.reconcile_locked(project_id).await {
            Ok(report) => tracing::info!(
                project_id,
                objectives_updated = report.objectives_updated,
                "Counters repaired after partial failure",
            ),
            Err(e) => tracing::error!(
                project_id,
                error = %e,
                "Reconciliation after partial failure failed",
            ),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// All projects, most recently created first.
    pub async fn list_projects(&self) -> ProgressResult<Vec<Project>> {
        Ok(self.store.list_projects().await?)
    }

    pub async fn project_detail(&self, project_id: DbId) -> ProgressResult<ProjectDetail> {
        let project = self.require_project(project_id).await?;
        let objectives = self.store.list_objectives(project_id).await?;
        let steps = self
            .store
            .list_steps(&StepFilter::project(project_id))
            .await?;
        Ok(ProjectDetail {
            project,
            objectives: group_steps(objectives, steps),
        })
    }

    pub async fn list_objectives(&self, project_id: DbId) -> ProgressResult<Vec<Objective>> {
        self.require_project(project_id).await?;
        Ok(self.store.list_objectives(project_id).await?)
    }

    /// Steps of a project, optionally narrowed to one of its objectives.
    pub async fn list_steps(
        &self,
        project_id: DbId,
        objective_id: Option<DbId>,
    ) -> ProgressResult<Vec<Step>> {
        self.require_project(project_id).await?;
        if let Some(objective_id) = objective_id {
            let belongs = self
                .store
                .get_objective(objective_id)
                .await?
                .is_some_and(|o| o.project_id == project_id);
            if !belongs {
                return Err(ProgressError::not_found("objective", objective_id));
            }
        }
        let filter = StepFilter {
            project_id: Some(project_id),
            objective_id,
        };
        Ok(self.store.list_steps(&filter).await?)
    }

    pub async fn project_report(&self, project_id: DbId) -> ProgressResult<ProjectReport> {
        let detail = self.project_detail(project_id).await?;
        Ok(ProjectReport::build(detail.project, detail.objectives))
    }

    pub async fn dashboard(&self) -> ProgressResult<DashboardSummary> {
        let projects = self.store.list_projects().await?;
        Ok(summarize(projects.iter().map(|p| (p.status, p.progress))))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn require_project(&self, project_id: DbId) -> ProgressResult<Project> {
        self.store
            .get_project(project_id)
            .await?
            .ok_or_else(|| ProgressError::not_found("project", project_id))
    }

    async fn require_step(&self, step_id: DbId) -> ProgressResult<Step> {
        self.store
            .get_step(step_id)
            .await?
            .ok_or_else(|| ProgressError::not_found("step", step_id))
    }
}

fn count_completed(steps: &[Step]) -> i32 {
    i32::try_from(steps.iter().filter(|s| s.is_completed).count()).unwrap_or(i32::MAX)
}

fn already_completed(step_id: DbId) -> ProgressError {
    CoreError::InvalidState(format!("step {step_id} is already completed")).into()
}
