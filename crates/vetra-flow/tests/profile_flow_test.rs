//! Integration tests for the profile service: sign-in provisioning,
//! tracked-role selection, and account management.

use std::collections::BTreeSet;

use surrealdb::engine::local::{Db, Mem};
use surrealdb::Surreal;
use uuid::Uuid;
use vetra_core::error::VetraError;
use vetra_core::models::profile::{Identity, SystemRole, UpdateProfile};
use vetra_core::repository::Pagination;
use vetra_db::repository::SurrealProfileRepository;
use vetra_flow::{ChangeBus, ProfileService, RoleSelection};

/// Helper: spin up in-memory DB, run migrations, build the service.
async fn setup() -> ProfileService<SurrealProfileRepository<Db>> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    vetra_db::run_migrations(&db).await.unwrap();

    ProfileService::new(SurrealProfileRepository::new(db), ChangeBus::new())
}

fn identity(email: &str) -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        email: email.into(),
        display_name: "Alice Example".into(),
    }
}

#[tokio::test]
async fn ensure_profile_provisions_on_first_sign_in() {
    let service = setup().await;
    let id = identity("alice@example.org");

    let profile = service.ensure_profile(&id).await.unwrap();

    assert_eq!(profile.id, id.user_id);
    assert_eq!(profile.email, "alice@example.org");
    assert_eq!(profile.system_role, SystemRole::Volunteer);
    assert!(profile.role_ids.is_empty());
}

#[tokio::test]
async fn ensure_profile_returns_the_stored_profile_unchanged() {
    let service = setup().await;
    let id = identity("bob@example.org");

    service.ensure_profile(&id).await.unwrap();

    // Promote between sign-ins; the stored profile wins.
    service
        .update_profile(
            id.user_id,
            UpdateProfile {
                system_role: Some(SystemRole::Manager),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let again = service.ensure_profile(&id).await.unwrap();
    assert_eq!(again.system_role, SystemRole::Manager);

    let accounts = service.list_accounts(Pagination::default()).await.unwrap();
    assert_eq!(accounts.total, 1, "repeated sign-in must not duplicate");
}

#[tokio::test]
async fn tracked_role_selection_saves_as_a_set() {
    let service = setup().await;
    let id = identity("carol@example.org");
    let profile = service.ensure_profile(&id).await.unwrap();

    let role_a = Uuid::new_v4();
    let role_b = Uuid::new_v4();

    let mut selection = RoleSelection::new(profile.role_ids.iter().copied());
    assert!(!selection.is_dirty());

    selection.toggle(role_a);
    selection.toggle(role_b);
    assert!(selection.is_dirty());

    // Toggling one back off and on again is still the same set.
    selection.toggle(role_b);
    selection.toggle(role_b);
    assert!(selection.is_dirty());

    let saved = service
        .set_tracked_roles(profile.id, selection.pending())
        .await
        .unwrap();
    selection.mark_saved();
    assert!(!selection.is_dirty());

    let stored: BTreeSet<Uuid> = saved.role_ids.iter().copied().collect();
    let expected: BTreeSet<Uuid> = [role_a, role_b].into_iter().collect();
    assert_eq!(stored, expected);

    // The save survives a fresh read.
    let fetched = service.get_profile(profile.id).await.unwrap().unwrap();
    let fetched_set: BTreeSet<Uuid> = fetched.role_ids.iter().copied().collect();
    assert_eq!(fetched_set, expected);
}

#[tokio::test]
async fn track_role_ignores_duplicates() {
    let service = setup().await;
    let id = identity("dave@example.org");
    service.ensure_profile(&id).await.unwrap();

    let role_a = Uuid::new_v4();
    let role_b = Uuid::new_v4();

    let profile = service.track_role(id.user_id, role_a).await.unwrap();
    assert_eq!(profile.role_ids, vec![role_a]);

    // Tracking the same role twice is a no-op.
    let profile = service.track_role(id.user_id, role_a).await.unwrap();
    assert_eq!(profile.role_ids.len(), 1);

    let profile = service.track_role(id.user_id, role_b).await.unwrap();
    assert_eq!(profile.role_ids.len(), 2);
}

#[tokio::test]
async fn track_role_for_unknown_user_is_not_found() {
    let service = setup().await;

    let err = service
        .track_role(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(
        matches!(err, VetraError::NotFound { .. }),
        "expected NotFound, got: {err:?}"
    );
}

#[tokio::test]
async fn delete_account_removes_the_profile() {
    let service = setup().await;
    let id = identity("eve@example.org");
    service.ensure_profile(&id).await.unwrap();

    service.delete_account(id.user_id).await.unwrap();

    let found = service.get_profile(id.user_id).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn list_accounts_paginates() {
    let service = setup().await;
    for i in 0..4 {
        service
            .ensure_profile(&identity(&format!("user-{i}@example.org")))
            .await
            .unwrap();
    }

    let page = service
        .list_accounts(Pagination {
            offset: 0,
            limit: 3,
        })
        .await
        .unwrap();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total, 4);
}
