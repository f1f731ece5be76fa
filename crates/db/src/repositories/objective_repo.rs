//! Repository for the `objectives` table.

use sqlx::PgExecutor;
use stepwise_core::progress::Rollup;
use stepwise_core::types::DbId;

use crate::models::objective::{NewObjective, Objective};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, title, sort_order, total_steps, completed_steps, \
    progress, created_at, updated_at";

/// Provides CRUD operations for objectives.
pub struct ObjectiveRepo;

impl ObjectiveRepo {
    /// Insert a new objective expecting `total_steps` steps, returning the
    /// created row. Completed steps and progress start at zero.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &NewObjective,
        total_steps: i32,
    ) -> Result<Objective, sqlx::Error> {
        let query = format!(
            "INSERT INTO objectives (project_id, title, sort_order, total_steps)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Objective>(&query)
            .bind(input.project_id)
            .bind(&input.title)
            .bind(input.sort_order)
            .bind(total_steps)
            .fetch_one(executor)
            .await
    }

    /// Find an objective by its internal ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Objective>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM objectives WHERE id = $1");
        sqlx::query_as::<_, Objective>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List all objectives for a project, ordered by `sort_order`.
    pub async fn list_by_project<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
    ) -> Result<Vec<Objective>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM objectives
             WHERE project_id = $1
             ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, Objective>(&query)
            .bind(project_id)
            .fetch_all(executor)
            .await
    }

    /// Overwrite the derived counters.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_progress<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        rollup: &Rollup,
    ) -> Result<Option<Objective>, sqlx::Error> {
        let query = format!(
            "UPDATE objectives SET
                total_steps = $2,
                completed_steps = $3,
                progress = $4,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Objective>(&query)
            .bind(id)
            .bind(rollup.total_steps)
            .bind(rollup.completed_steps)
            .bind(rollup.progress)
            .fetch_optional(executor)
            .await
    }

    /// Delete every objective of a project. Returns the number removed.
    pub async fn delete_by_project<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM objectives WHERE project_id = $1")
            .bind(project_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
