//! Integration tests for the Profile repository using in-memory
//! SurrealDB.

use surrealdb::engine::local::Mem;
use surrealdb::Surreal;
use uuid::Uuid;
use vetra_core::error::VetraError;
use vetra_core::models::profile::{CreateProfile, SystemRole, UpdateProfile};
use vetra_core::repository::{Pagination, ProfileRepository};
use vetra_db::repository::SurrealProfileRepository;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    vetra_db::run_migrations(&db).await.unwrap();
    db
}

fn profile_input(email: &str) -> CreateProfile {
    CreateProfile {
        id: Uuid::new_v4(),
        email: email.into(),
        name: "Alice Example".into(),
        system_role: SystemRole::Volunteer,
        role_ids: vec![],
    }
}

#[tokio::test]
async fn create_and_find_profile() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    let input = profile_input("alice@example.org");
    let expected_id = input.id;

    let profile = repo.create(input).await.unwrap();

    // The id comes from the external identity, never generated here.
    assert_eq!(profile.id, expected_id);
    assert_eq!(profile.email, "alice@example.org");
    assert_eq!(profile.system_role, SystemRole::Volunteer);
    assert!(profile.role_ids.is_empty());

    let fetched = repo.find(expected_id).await.unwrap().unwrap();
    assert_eq!(fetched.id, expected_id);
    assert_eq!(fetched.name, "Alice Example");
}

#[tokio::test]
async fn find_missing_profile_is_none() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    let found = repo.find(Uuid::new_v4()).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn update_tracked_roles() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    let profile = repo.create(profile_input("bob@example.org")).await.unwrap();

    let role_a = Uuid::new_v4();
    let role_b = Uuid::new_v4();
    let updated = repo
        .update(
            profile.id,
            UpdateProfile {
                role_ids: Some(vec![role_a, role_b]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.role_ids, vec![role_a, role_b]);
    assert_eq!(updated.email, "bob@example.org"); // unchanged
}

#[tokio::test]
async fn update_system_role() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    let profile = repo
        .create(profile_input("carol@example.org"))
        .await
        .unwrap();
    assert!(!profile.system_role.can_review());

    let updated = repo
        .update(
            profile.id,
            UpdateProfile {
                system_role: Some(SystemRole::Manager),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.system_role, SystemRole::Manager);
    assert!(updated.system_role.can_manage());
}

#[tokio::test]
async fn update_missing_profile_is_not_found() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    let err = repo
        .update(
            Uuid::new_v4(),
            UpdateProfile {
                name: Some("Ghost".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(
        matches!(err, VetraError::NotFound { .. }),
        "expected NotFound, got: {err:?}"
    );
}

#[tokio::test]
async fn delete_removes_profile() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    let profile = repo
        .create(profile_input("dave@example.org"))
        .await
        .unwrap();

    repo.delete(profile.id).await.unwrap();

    let found = repo.find(profile.id).await.unwrap();
    assert!(found.is_none(), "deleted profile should be gone");
}

#[tokio::test]
async fn list_profiles_with_pagination() {
    let db = setup().await;
    let repo = SurrealProfileRepository::new(db);

    for i in 0..5 {
        repo.create(profile_input(&format!("user-{i}@example.org")))
            .await
            .unwrap();
    }

    let page1 = repo
        .list(Pagination {
            offset: 0,
            limit: 3,
        })
        .await
        .unwrap();

    assert_eq!(page1.items.len(), 3);
    assert_eq!(page1.total, 5);

    let page2 = repo
        .list(Pagination {
            offset: 3,
            limit: 3,
        })
        .await
        .unwrap();

    assert_eq!(page2.items.len(), 2);
}
