//! Integration tests for Role and Step repositories using in-memory
//! SurrealDB.

use surrealdb::engine::local::Mem;
use surrealdb::Surreal;
use uuid::Uuid;
use vetra_core::error::VetraError;
use vetra_core::models::role::CreateRole;
use vetra_core::models::step::CreateStep;
use vetra_core::repository::{RoleRepository, StepRepository};
use vetra_db::repository::{SurrealRoleRepository, SurrealStepRepository};

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    vetra_db::run_migrations(&db).await.unwrap();
    db
}

fn step_input(name: &str, order: u32) -> CreateStep {
    CreateStep {
        name: name.into(),
        description: None,
        order,
        expires_in_months: None,
        requires_manual_review: false,
    }
}

#[tokio::test]
async fn create_and_get_step() {
    let db = setup().await;
    let repo = SurrealStepRepository::new(db);

    let step = repo
        .create(CreateStep {
            name: "Background Check".into(),
            description: Some("National records check".into()),
            order: 2,
            expires_in_months: Some(36),
            requires_manual_review: true,
        })
        .await
        .unwrap();

    assert_eq!(step.name, "Background Check");
    assert_eq!(step.order, 2);
    assert_eq!(step.expires_in_months, Some(36));
    assert!(step.requires_manual_review);

    let fetched = repo.get_by_id(step.id).await.unwrap();
    assert_eq!(fetched.id, step.id);
    assert_eq!(fetched.description.as_deref(), Some("National records check"));
    assert_eq!(fetched.expires_in_months, Some(36));
}

#[tokio::test]
async fn list_steps_ordered_by_display_position() {
    let db = setup().await;
    let repo = SurrealStepRepository::new(db);

    repo.create(step_input("Interview", 3)).await.unwrap();
    repo.create(step_input("Application Form", 1)).await.unwrap();
    repo.create(step_input("References", 2)).await.unwrap();

    let steps = repo.list().await.unwrap();
    let names: Vec<&str> = steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Application Form", "References", "Interview"]);
}

#[tokio::test]
async fn get_many_preserves_requested_order_and_skips_unknown() {
    let db = setup().await;
    let repo = SurrealStepRepository::new(db);

    let first = repo.create(step_input("First", 1)).await.unwrap();
    let second = repo.create(step_input("Second", 2)).await.unwrap();
    let third = repo.create(step_input("Third", 3)).await.unwrap();

    let steps = repo
        .get_many(&[third.id, Uuid::new_v4(), first.id, second.id])
        .await
        .unwrap();

    let names: Vec<&str> = steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Third", "First", "Second"]);
}

#[tokio::test]
async fn create_and_get_role() {
    let db = setup().await;
    let step_repo = SurrealStepRepository::new(db.clone());
    let role_repo = SurrealRoleRepository::new(db);

    let check = step_repo.create(step_input("Record Check", 1)).await.unwrap();
    let training = step_repo.create(step_input("Training", 2)).await.unwrap();

    let role = role_repo
        .create(CreateRole {
            name: "Youth Mentor".into(),
            description: Some("Works directly with young people".into()),
            steps: vec![training.id, check.id],
        })
        .await
        .unwrap();

    assert_eq!(role.name, "Youth Mentor");

    // The step sequence is the role's own ordering, not insertion or
    // display order.
    let fetched = role_repo.get_by_id(role.id).await.unwrap();
    assert_eq!(fetched.steps, vec![training.id, check.id]);
}

#[tokio::test]
async fn list_roles_ordered_by_name() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db);

    for name in ["Youth Mentor", "Branch Trustee", "Driver"] {
        repo.create(CreateRole {
            name: name.into(),
            description: None,
            steps: vec![],
        })
        .await
        .unwrap();
    }

    let roles = repo.list().await.unwrap();
    let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Branch Trustee", "Driver", "Youth Mentor"]);
}

#[tokio::test]
async fn get_missing_role_is_not_found() {
    let db = setup().await;
    let repo = SurrealRoleRepository::new(db);

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(
        matches!(err, VetraError::NotFound { .. }),
        "expected NotFound, got: {err:?}"
    );
}

#[tokio::test]
async fn get_missing_step_is_not_found() {
    let db = setup().await;
    let repo = SurrealStepRepository::new(db);

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(
        matches!(err, VetraError::NotFound { .. }),
        "expected NotFound, got: {err:?}"
    );
}
