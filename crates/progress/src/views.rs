//! Read-side shapes returned by the aggregator.

use std::collections::HashMap;

use serde::Serialize;
use stepwise_core::types::DbId;
use stepwise_db::models::objective::Objective;
use stepwise_db::models::project::Project;
use stepwise_db::models::step::Step;

/// An objective with its steps in display order.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectiveWithSteps {
    #[serde(flatten)]
    pub objective: Objective,
    pub steps: Vec<Step>,
}

/// A project with its objectives and steps, as shown on the project page.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub objectives: Vec<ObjectiveWithSteps>,
}

/// Result of adding an objective: the new objective and the project's
/// refreshed counters.
#[derive(Debug, Clone, Serialize)]
pub struct AddedObjective {
    pub project: Project,
    pub objective: ObjectiveWithSteps,
}

/// Result of completing a step: the step and both refreshed aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedStep {
    pub step: Step,
    pub objective: Objective,
    pub project: Project,
}

/// Completed and pending steps of one objective.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectiveReport {
    #[serde(flatten)]
    pub objective: Objective,
    pub completed: Vec<Step>,
    pub pending: Vec<Step>,
}

/// Completion report for a whole project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectReport {
    pub project: Project,
    pub completed_count: usize,
    pub pending_count: usize,
    pub objectives: Vec<ObjectiveReport>,
}

/// Outcome of recomputing a project's counters from its steps.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub project: Project,
    pub objectives_updated: usize,
    pub project_updated: bool,
}

/// Group steps under their objectives, keeping each list's order.
///
/// Steps whose objective is not in `objectives` are dropped.
pub(crate) fn group_steps(
    objectives: Vec<Objective>,
    steps: Vec<Step>,
) -> Vec<ObjectiveWithSteps> {
    let mut by_objective: HashMap<DbId, Vec<Step>> = HashMap::new();
    for step in steps {
        by_objective.entry(step.objective_id).or_default().push(step);
    }
    objectives
        .into_iter()
        .map(|objective| ObjectiveWithSteps {
            steps: by_objective.remove(&objective.id).unwrap_or_default(),
            objective,
        })
        .collect()
}

impl ProjectReport {
    pub(crate) fn build(project: Project, objectives: Vec<ObjectiveWithSteps>) -> Self {
        let objectives: Vec<ObjectiveReport> = objectives
            .into_iter()
            .map(|o| {
                let (completed, pending) = o.steps.into_iter().partition(|s| s.is_completed);
                ObjectiveReport {
                    objective: o.objective,
                    completed,
                    pending,
                }
            })
            .collect();

        Self {
            completed_count: objectives.iter().map(|o| o.completed.len()).sum(),
            pending_count: objectives.iter().map(|o| o.pending.len()).sum(),
            project,
            objectives,
        }
    }
}
