//! In-process implementation of [`ProjectStore`].
//!
//! Used by tests and by the server when no `DATABASE_URL` is configured.
//! Each call holds the state lock for its whole duration, so every single
//! operation (including the multi-row ones) is atomic. Failures can be
//! injected per operation to exercise recovery paths.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use stepwise_core::progress::{ProjectStatus, Rollup};
use stepwise_core::types::DbId;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::objective::{NewObjective, Objective};
use crate::models::project::{DeleteSummary, NewProject, Project, UpdateProject};
use crate::models::step::{Step, StepCompletion, StepFilter};
use crate::store::ProjectStore;

/// Write operations that can be made to fail with [`MemoryStore::fail_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    CreateProject,
    UpdateProject,
    SetProjectProgress,
    DeleteProject,
    CreateObjective,
    SetObjectiveProgress,
    CompleteStep,
}

#[derive(Debug, Default)]
struct State {
    last_id: DbId,
    projects: BTreeMap<DbId, Project>,
    objectives: BTreeMap<DbId, Objective>,
    steps: BTreeMap<DbId, Step>,
    failures: Vec<StoreOp>,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.last_id += 1;
        self.last_id
    }

    /// Consume one pending injected failure for `op`, if any.
    fn check(&mut self, op: StoreOp) -> Result<(), StoreError> {
        match self.failures.iter().position(|pending| *pending == op) {
            Some(pos) => {
                self.failures.remove(pos);
                Err(StoreError::Unavailable(format!("injected failure on {op:?}")))
            }
            None => Ok(()),
        }
    }
}

/// A [`ProjectStore`] holding all rows in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `op` fail with [`StoreError::Unavailable`].
    ///
    /// Calls queue up: injecting the same op twice fails its next two calls.
    pub async fn fail_next(&self, op: StoreOp) {
        self.state.write().await.failures.push(op);
    }

    /// Number of rows held, as `(projects, objectives, steps)`.
    pub async fn row_counts(&self) -> (usize, usize, usize) {
        let state = self.state.read().await;
        (
            state.projects.len(),
            state.objectives.len(),
            state.steps.len(),
        )
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create_project(&self, input: &NewProject) -> Result<Project, StoreError> {
        let mut state = self.state.write().await;
        state.check(StoreOp::CreateProject)?;

        let now = Utc::now();
        let project = Project {
            id: state.next_id(),
            name: input.fields.name.clone(),
            what_is: input.fields.what_is.clone(),
            how_to_do: input.fields.how_to_do.clone(),
            what_to_expect: input.fields.what_to_expect.clone(),
            cover_image: input.fields.cover_image.clone(),
            status: ProjectStatus::NotStarted,
            total_steps: input.total_steps,
            completed_steps: 0,
            progress: 0,
            created_at: now,
            updated_at: now,
        };
        state.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: DbId) -> Result<Option<Project>, StoreError> {
        Ok(self.state.read().await.projects.get(&id).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        let state = self.state.read().await;
        let mut projects: Vec<Project> = state.projects.values().cloned().collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(projects)
    }

    async fn update_project(
        &self,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, StoreError> {
        let mut state = self.state.write().await;
        state.check(StoreOp::UpdateProject)?;

        let Some(project) = state.projects.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            project.name = name.clone();
        }
        if let Some(what_is) = &input.what_is {
            project.what_is = what_is.clone();
        }
        if let Some(how_to_do) = &input.how_to_do {
            project.how_to_do = how_to_do.clone();
        }
        if let Some(what_to_expect) = &input.what_to_expect {
            project.what_to_expect = what_to_expect.clone();
        }
        if let Some(cover) = &input.cover_image {
            project.cover_image = (!cover.is_empty()).then(|| cover.clone());
        }
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn set_project_progress(
        &self,
        id: DbId,
        rollup: &Rollup,
    ) -> Result<Option<Project>, StoreError> {
        let mut state = self.state.write().await;
        state.check(StoreOp::SetProjectProgress)?;

        let Some(project) = state.projects.get_mut(&id) else {
            return Ok(None);
        };
        project.total_steps = rollup.total_steps;
        project.completed_steps = rollup.completed_steps;
        project.progress = rollup.progress;
        project.status = rollup.status();
        project.updated_at = Utc::now();
        Ok(Some(project.clone()))
    }

    async fn delete_project(&self, id: DbId) -> Result<DeleteSummary, StoreError> {
        let mut state = self.state.write().await;
        state.check(StoreOp::DeleteProject)?;

        let steps_before = state.steps.len();
        state.steps.retain(|_, s| s.project_id != id);
        let objectives_before = state.objectives.len();
        state.objectives.retain(|_, o| o.project_id != id);
        let project = state.projects.remove(&id).is_some();

        Ok(DeleteSummary {
            steps: (steps_before - state.steps.len()) as u64,
            objectives: (objectives_before - state.objectives.len()) as u64,
            project,
        })
    }

    async fn create_objective(
        &self,
        input: &NewObjective,
        step_titles: &[String],
    ) -> Result<(Objective, Vec<Step>), StoreError> {
        let mut state = self.state.write().await;
        state.check(StoreOp::CreateObjective)?;

        let now = Utc::now();
        let objective = Objective {
            id: state.next_id(),
            project_id: input.project_id,
            title: input.title.clone(),
            sort_order: input.sort_order,
            total_steps: i32::try_from(step_titles.len()).unwrap_or(i32::MAX),
            completed_steps: 0,
            progress: 0,
            created_at: now,
            updated_at: now,
        };
        state.objectives.insert(objective.id, objective.clone());

        let mut steps = Vec::with_capacity(step_titles.len());
        for (index, title) in step_titles.iter().enumerate() {
            let step = Step {
                id: state.next_id(),
                project_id: input.project_id,
                objective_id: objective.id,
                title: title.clone(),
                sort_order: i32::try_from(index).unwrap_or(i32::MAX),
                is_completed: false,
                completion_note: None,
                completed_at: None,
                completed_by: None,
                created_at: now,
            };
            state.steps.insert(step.id, step.clone());
            steps.push(step);
        }

        Ok((objective, steps))
    }

    async fn get_objective(&self, id: DbId) -> Result<Option<Objective>, StoreError> {
        Ok(self.state.read().await.objectives.get(&id).cloned())
    }

    async fn list_objectives(&self, project_id: DbId) -> Result<Vec<Objective>, StoreError> {
        let state = self.state.read().await;
        let mut objectives: Vec<Objective> = state
            .objectives
            .values()
            .filter(|o| o.project_id == project_id)
            .cloned()
            .collect();
        objectives.sort_by_key(|o| (o.sort_order, o.id));
        Ok(objectives)
    }

    async fn set_objective_progress(
        &self,
        id: DbId,
        rollup: &Rollup,
    ) -> Result<Option<Objective>, StoreError> {
        let mut state = self.state.write().await;
        state.check(StoreOp::SetObjectiveProgress)?;

        let Some(objective) = state.objectives.get_mut(&id) else {
            return Ok(None);
        };
        objective.total_steps = rollup.total_steps;
        objective.completed_steps = rollup.completed_steps;
        objective.progress = rollup.progress;
        objective.updated_at = Utc::now();
        Ok(Some(objective.clone()))
    }

    async fn get_step(&self, id: DbId) -> Result<Option<Step>, StoreError> {
        Ok(self.state.read().await.steps.get(&id).cloned())
    }

    async fn list_steps(&self, filter: &StepFilter) -> Result<Vec<Step>, StoreError> {
        let state = self.state.read().await;
        let objective_order =
            |id: DbId| state.objectives.get(&id).map_or(i32::MAX, |o| o.sort_order);

        let mut steps: Vec<Step> = state
            .steps
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        steps.sort_by_key(|s| {
            (
                objective_order(s.objective_id),
                s.objective_id,
                s.sort_order,
                s.id,
            )
        });
        Ok(steps)
    }

    async fn complete_step(
        &self,
        id: DbId,
        input: &StepCompletion,
    ) -> Result<Option<Step>, StoreError> {
        let mut state = self.state.write().await;
        state.check(StoreOp::CompleteStep)?;

        match state.steps.get_mut(&id) {
            Some(step) if !step.is_completed => {
                step.is_completed = true;
                step.completion_note = input.completion_note.clone();
                step.completed_by = input.completed_by.clone();
                step.completed_at = Some(input.completed_at);
                Ok(Some(step.clone()))
            }
            _ => Ok(None),
        }
    }
}
