//! Progress percentages and project lifecycle status.
//!
//! These are the only formulas used to derive `progress`, `completed_steps`
//! and `status` for objectives and projects. Callers pass in counts or
//! completion flags they have already loaded; nothing here touches storage.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const STATUS_NOT_STARTED: &str = "not_started";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";

/// All valid project status strings, in lifecycle order.
pub const VALID_PROJECT_STATUSES: &[&str] =
    &[STATUS_NOT_STARTED, STATUS_IN_PROGRESS, STATUS_COMPLETED];

/// Progress value of a fully completed aggregate.
pub const FULL_PROGRESS: i32 = 100;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Project lifecycle status. Always derived, never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl ProjectStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_NOT_STARTED => Ok(Self::NotStarted),
            STATUS_IN_PROGRESS => Ok(Self::InProgress),
            STATUS_COMPLETED => Ok(Self::Completed),
            _ => Err(CoreError::Validation(format!(
                "Invalid project status '{s}'. Must be one of: {}",
                VALID_PROJECT_STATUSES.join(", ")
            ))),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => STATUS_NOT_STARTED,
            Self::InProgress => STATUS_IN_PROGRESS,
            Self::Completed => STATUS_COMPLETED,
        }
    }

    /// Derive the status from a completed-step count and a progress value.
    ///
    /// `completed` iff progress is 100, `not_started` iff nothing is
    /// complete, `in_progress` otherwise.
    pub fn derive(completed_steps: i32, progress: i32) -> Self {
        if progress >= FULL_PROGRESS {
            Self::Completed
        } else if completed_steps <= 0 {
            Self::NotStarted
        } else {
            Self::InProgress
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ProjectStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str_value(&value)
    }
}

// ---------------------------------------------------------------------------
// Percentages
// ---------------------------------------------------------------------------

/// `round(100 * completed / total)` with halves rounded up, or 0 when
/// `total` is not positive.
///
/// Computed in integers so values like 2/3 land on 67 without float error.
/// A `completed` above `total` is clamped to `total`.
pub fn percent_complete(completed: i32, total: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    let completed = i64::from(completed.clamp(0, total));
    let total = i64::from(total);
    // Bounded by 100, so the narrowing is lossless.
    ((200 * completed + total) / (2 * total)) as i32
}

fn count_to_i32(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// Rollup
// ---------------------------------------------------------------------------

/// Derived counters for an objective or a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rollup {
    pub total_steps: i32,
    pub completed_steps: i32,
    pub progress: i32,
}

impl Rollup {
    /// Build a rollup from raw counts.
    pub fn new(completed_steps: i32, total_steps: i32) -> Self {
        Self {
            total_steps,
            completed_steps,
            progress: percent_complete(completed_steps, total_steps),
        }
    }

    /// Count a full set of sibling steps given their completion flags.
    pub fn from_completion_flags<I>(flags: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let (total, completed) = flags
            .into_iter()
            .fold((0usize, 0usize), |(total, done), flag| {
                (total + 1, done + usize::from(flag))
            });
        Self::new(count_to_i32(completed), count_to_i32(total))
    }

    /// Recount `completed_steps` against a fixed `total_steps`.
    pub fn with_completed(self, completed_steps: i32) -> Self {
        Self::new(completed_steps, self.total_steps)
    }

    /// Account for `added` new incomplete steps.
    pub fn with_added_steps(self, added: usize) -> Self {
        let total = self.total_steps.saturating_add(count_to_i32(added));
        Self::new(self.completed_steps, total)
    }

    /// Lifecycle status implied by these counters.
    pub fn status(&self) -> ProjectStatus {
        ProjectStatus::derive(self.completed_steps, self.progress)
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// Counts across all projects, shown on the home dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub total_projects: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
    /// Mean project progress, rounded half up; 0 with no projects.
    pub average_progress: i32,
}

/// Summarize `(status, progress)` pairs, one per project.
pub fn summarize<I>(projects: I) -> DashboardSummary
where
    I: IntoIterator<Item = (ProjectStatus, i32)>,
{
    let mut summary = DashboardSummary {
        total_projects: 0,
        not_started: 0,
        in_progress: 0,
        completed: 0,
        average_progress: 0,
    };
    let mut progress_sum: i64 = 0;

    for (status, progress) in projects {
        summary.total_projects += 1;
        progress_sum += i64::from(progress.clamp(0, FULL_PROGRESS));
        match status {
            ProjectStatus::NotStarted => summary.not_started += 1,
            ProjectStatus::InProgress => summary.in_progress += 1,
            ProjectStatus::Completed => summary.completed += 1,
        }
    }

    if summary.total_projects > 0 {
        let count = i64::try_from(summary.total_projects).unwrap_or(i64::MAX);
        summary.average_progress = ((2 * progress_sum + count) / (2 * count)) as i32;
    }
    summary
}
