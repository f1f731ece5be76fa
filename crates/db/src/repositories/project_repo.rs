//! Repository for the `projects` table.

use sqlx::PgExecutor;
use stepwise_core::progress::{ProjectStatus, Rollup};
use stepwise_core::types::DbId;

use crate::models::project::{NewProject, Project, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, what_is, how_to_do, what_to_expect, cover_image, status, \
    total_steps, completed_steps, progress, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    ///
    /// Status starts at `not_started` with zero completed steps.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &NewProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                (name, what_is, how_to_do, what_to_expect, cover_image, status, total_steps)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.fields.name)
            .bind(&input.fields.what_is)
            .bind(&input.fields.how_to_do)
            .bind(&input.fields.what_to_expect)
            .bind(&input.fields.cover_image)
            .bind(ProjectStatus::NotStarted.as_str())
            .bind(input.total_steps)
            .fetch_one(executor)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List all projects ordered by most recently created first.
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Project>(&query)
            .fetch_all(executor)
            .await
    }

    /// Update descriptive fields. Only non-`None` fields in `input` are
    /// applied; an empty `cover_image` clears it.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                what_is = COALESCE($3, what_is),
                how_to_do = COALESCE($4, how_to_do),
                what_to_expect = COALESCE($5, what_to_expect),
                cover_image = CASE WHEN $6::TEXT IS NULL THEN cover_image ELSE NULLIF($6, '') END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.what_is)
            .bind(&input.how_to_do)
            .bind(&input.what_to_expect)
            .bind(&input.cover_image)
            .fetch_optional(executor)
            .await
    }

    /// Overwrite the derived counters and the status implied by them.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_progress<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        rollup: &Rollup,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                total_steps = $2,
                completed_steps = $3,
                progress = $4,
                status = $5,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(rollup.total_steps)
            .bind(rollup.completed_steps)
            .bind(rollup.progress)
            .bind(rollup.status().as_str())
            .fetch_optional(executor)
            .await
    }

    /// Permanently delete a project by ID. Returns `true` if a row was removed.
    pub async fn hard_delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
