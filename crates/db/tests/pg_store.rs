//! PostgreSQL store tests. Each test gets a fresh migrated database from
//! `sqlx::test`, so they need `DATABASE_URL` pointing at a server.

use chrono::Utc;
use sqlx::PgPool;
use stepwise_core::progress::{ProjectStatus, Rollup};
use stepwise_core::validation::ProjectFields;
use stepwise_db::models::objective::NewObjective;
use stepwise_db::models::project::{NewProject, UpdateProject};
use stepwise_db::models::step::{StepCompletion, StepFilter};
use stepwise_db::store::{PgStore, ProjectStore};

fn new_project(total_steps: i32) -> NewProject {
    NewProject {
        fields: ProjectFields {
            name: "Bake bread".to_string(),
            what_is: "Sourdough".to_string(),
            how_to_do: "Feed starter, mix, proof, bake".to_string(),
            what_to_expect: "A loaf".to_string(),
            cover_image: Some("https://img.example/loaf.png".to_string()),
        },
        total_steps,
    }
}

fn titles(prefix: &str) -> Vec<String> {
    (1..=3).map(|i| format!("{prefix} {i}")).collect()
}

fn completion(note: &str) -> StepCompletion {
    StepCompletion {
        completion_note: Some(note.to_string()),
        completed_by: Some("tester".to_string()),
        completed_at: Utc::now(),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_health_check(pool: PgPool) {
    stepwise_db::health_check(&pool).await.unwrap();
    PgStore::new(pool).ping().await.unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_project_defaults(pool: PgPool) {
    let store = PgStore::new(pool);
    let project = store.create_project(&new_project(6)).await.unwrap();

    assert_eq!(project.status, ProjectStatus::NotStarted);
    assert_eq!(project.total_steps, 6);
    assert_eq!(project.completed_steps, 0);
    assert_eq!(project.progress, 0);

    let fetched = store.get_project(project.id).await.unwrap().unwrap();
    assert_eq!(fetched, project);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_objective_with_steps_in_order(pool: PgPool) {
    let store = PgStore::new(pool);
    let project = store.create_project(&new_project(6)).await.unwrap();

    let (second, _) = store
        .create_objective(
            &NewObjective {
                project_id: project.id,
                title: "Bake".to_string(),
                sort_order: 1,
            },
            &titles("bake"),
        )
        .await
        .unwrap();
    let (first, steps) = store
        .create_objective(
            &NewObjective {
                project_id: project.id,
                title: "Prepare".to_string(),
                sort_order: 0,
            },
            &titles("prep"),
        )
        .await
        .unwrap();

    assert_eq!(first.total_steps, 3);
    assert_eq!(
        steps.iter().map(|s| s.title.as_str()).collect::<Vec<_>>(),
        vec!["prep 1", "prep 2", "prep 3"]
    );

    let objectives = store.list_objectives(project.id).await.unwrap();
    assert_eq!(
        objectives.iter().map(|o| o.id).collect::<Vec<_>>(),
        vec![first.id, second.id]
    );

    // Steps follow objective position, not insertion order.
    let all = store
        .list_steps(&StepFilter::project(project.id))
        .await
        .unwrap();
    assert_eq!(all.len(), 6);
    assert!(all[..3].iter().all(|s| s.objective_id == first.id));
    assert!(all[3..].iter().all(|s| s.objective_id == second.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_complete_step_only_once(pool: PgPool) {
    let store = PgStore::new(pool);
    let project = store.create_project(&new_project(3)).await.unwrap();
    let (_, steps) = store
        .create_objective(
            &NewObjective {
                project_id: project.id,
                title: "Prepare".to_string(),
                sort_order: 0,
            },
            &titles("prep"),
        )
        .await
        .unwrap();

    let done = store
        .complete_step(steps[0].id, &completion("fed the starter"))
        .await
        .unwrap()
        .unwrap();
    assert!(done.is_completed);
    assert!(done.completed_at.is_some());
    assert_eq!(done.completion_note.as_deref(), Some("fed the starter"));

    let again = store
        .complete_step(steps[0].id, &completion("again"))
        .await
        .unwrap();
    assert!(again.is_none());

    let stored = store.get_step(steps[0].id).await.unwrap().unwrap();
    assert_eq!(stored.completion_note.as_deref(), Some("fed the starter"));
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_set_progress_writes_status(pool: PgPool) {
    let store = PgStore::new(pool);
    let project = store.create_project(&new_project(3)).await.unwrap();

    let updated = store
        .set_project_progress(project.id, &Rollup::new(1, 3))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.progress, 33);
    assert_eq!(updated.status, ProjectStatus::InProgress);

    let missing = store
        .set_project_progress(project.id + 1000, &Rollup::new(1, 3))
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_update_clears_cover_and_keeps_counters(pool: PgPool) {
    let store = PgStore::new(pool);
    let project = store.create_project(&new_project(3)).await.unwrap();

    let patch = UpdateProject {
        name: Some("Bake better bread".to_string()),
        cover_image: Some(String::new()),
        ..Default::default()
    };
    let updated = store
        .update_project(project.id, &patch)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "Bake better bread");
    assert_eq!(updated.cover_image, None);
    assert_eq!(updated.what_is, project.what_is);
    assert_eq!(updated.total_steps, 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_cascades(pool: PgPool) {
    let store = PgStore::new(pool);
    let project = store.create_project(&new_project(3)).await.unwrap();
    store
        .create_objective(
            &NewObjective {
                project_id: project.id,
                title: "Prepare".to_string(),
                sort_order: 0,
            },
            &titles("prep"),
        )
        .await
        .unwrap();

    let summary = store.delete_project(project.id).await.unwrap();
    assert_eq!(summary.steps, 3);
    assert_eq!(summary.objectives, 1);
    assert!(summary.project);

    let (remaining,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM steps")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    let again = store.delete_project(project.id).await.unwrap();
    assert!(again.is_noop());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_schema_rejects_completed_above_total(pool: PgPool) {
    let store = PgStore::new(pool);
    let project = store.create_project(&new_project(3)).await.unwrap();

    let result = sqlx::query("UPDATE projects SET completed_steps = 4 WHERE id = $1")
        .bind(project.id)
        .execute(store.pool())
        .await;
    assert!(result.is_err());
}
