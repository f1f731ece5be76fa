//! Repository for the `steps` table.

use sqlx::PgExecutor;
use stepwise_core::types::DbId;

use crate::models::step::{Step, StepCompletion, StepFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, objective_id, title, sort_order, is_completed, \
    completion_note, completed_at, completed_by, created_at";

/// Same columns qualified with the `s` alias, for joins.
const S_COLUMNS: &str = "s.id, s.project_id, s.objective_id, s.title, s.sort_order, \
    s.is_completed, s.completion_note, s.completed_at, s.completed_by, s.created_at";

/// Provides CRUD operations for steps.
pub struct StepRepo;

impl StepRepo {
    /// Insert one incomplete step per title, in order, under an objective.
    ///
    /// Each step's `sort_order` is its index in `titles`. Returns the rows
    /// ordered by `sort_order`.
    pub async fn bulk_create<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
        objective_id: DbId,
        titles: &[String],
    ) -> Result<Vec<Step>, sqlx::Error> {
        let query = format!(
            "INSERT INTO steps (project_id, objective_id, title, sort_order)
             SELECT $1, $2, t.title, (t.ord - 1)::INTEGER
             FROM UNNEST($3::TEXT[]) WITH ORDINALITY AS t(title, ord)
             RETURNING {COLUMNS}"
        );
        let mut steps = sqlx::query_as::<_, Step>(&query)
            .bind(project_id)
            .bind(objective_id)
            .bind(titles)
            .fetch_all(executor)
            .await?;
        steps.sort_by_key(|s| s.sort_order);
        Ok(steps)
    }

    /// Find a step by its internal ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Step>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM steps WHERE id = $1");
        sqlx::query_as::<_, Step>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List steps matching `filter`, ordered by their objective's position
    /// and then by step position.
    ///
    /// An empty filter lists every step.
    pub async fn list<'e>(
        executor: impl PgExecutor<'e>,
        filter: &StepFilter,
    ) -> Result<Vec<Step>, sqlx::Error> {
        let query = format!(
            "SELECT {S_COLUMNS} FROM steps s
             JOIN objectives o ON o.id = s.objective_id
             WHERE ($1::BIGINT IS NULL OR s.project_id = $1)
               AND ($2::BIGINT IS NULL OR s.objective_id = $2)
             ORDER BY o.sort_order ASC, s.objective_id ASC, s.sort_order ASC, s.id ASC"
        );
        sqlx::query_as::<_, Step>(&query)
            .bind(filter.project_id)
            .bind(filter.objective_id)
            .fetch_all(executor)
            .await
    }

    /// Mark a step complete if, and only if, it is currently incomplete.
    ///
    /// Returns `None` when the step does not exist or was already complete,
    /// so two racing completions cannot both succeed.
    pub async fn complete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &StepCompletion,
    ) -> Result<Option<Step>, sqlx::Error> {
        let query = format!(
            "UPDATE steps SET
                is_completed = TRUE,
                completion_note = $2,
                completed_by = $3,
                completed_at = $4
             WHERE id = $1 AND is_completed = FALSE
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Step>(&query)
            .bind(id)
            .bind(&input.completion_note)
            .bind(&input.completed_by)
            .bind(input.completed_at)
            .fetch_optional(executor)
            .await
    }

    /// Delete every step of a project. Returns the number removed.
    pub async fn delete_by_project<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM steps WHERE project_id = $1")
            .bind(project_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
