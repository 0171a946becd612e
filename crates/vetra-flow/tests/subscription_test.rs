//! Integration tests for change notifications published by the
//! services.

use std::time::Duration;

use chrono::Utc;
use surrealdb::engine::local::{Db, Mem};
use surrealdb::Surreal;
use tokio::time::timeout;
use uuid::Uuid;
use vetra_core::models::profile::{Identity, SystemRole, UserProfile};
use vetra_core::models::role::{CreateRole, Role};
use vetra_core::models::step::{CreateStep, Step};
use vetra_core::repository::{RoleRepository, StepRepository};
use vetra_db::repository::{
    SurrealProfileRepository, SurrealProgressRepository, SurrealReviewRepository,
    SurrealRoleRepository, SurrealStepRepository,
};
use vetra_flow::{ChangeBus, ChangeEvent, ProfileService, ProgressService, Topic};

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    vetra_db::run_migrations(&db).await.unwrap();
    db
}

/// Helper: seed one role with a single step.
async fn seed_role(db: &Surreal<Db>, name: &str) -> (Role, Step) {
    let step_repo = SurrealStepRepository::new(db.clone());
    let step = step_repo
        .create(CreateStep {
            name: format!("{name} Check"),
            description: None,
            order: 1,
            expires_in_months: None,
            requires_manual_review: false,
        })
        .await
        .unwrap();

    let role_repo = SurrealRoleRepository::new(db.clone());
    let role = role_repo
        .create(CreateRole {
            name: name.into(),
            description: None,
            steps: vec![step.id],
        })
        .await
        .unwrap();

    (role, step)
}

fn volunteer() -> UserProfile {
    UserProfile {
        id: Uuid::new_v4(),
        email: "vol@example.org".into(),
        name: "Vol Unteer".into(),
        system_role: SystemRole::Volunteer,
        role_ids: vec![],
        created_at: Utc::now(),
    }
}

fn progress_service(
    db: &Surreal<Db>,
    bus: &ChangeBus,
) -> ProgressService<SurrealProgressRepository<Db>, SurrealReviewRepository<Db>> {
    ProgressService::new(
        SurrealProgressRepository::new(db.clone()),
        SurrealReviewRepository::new(db.clone()),
        bus.clone(),
    )
}

#[tokio::test]
async fn progress_changes_reach_scoped_subscribers() {
    let db = setup().await;
    let (role, step) = seed_role(&db, "Driver").await;
    let bus = ChangeBus::new();
    let service = progress_service(&db, &bus);
    let vol = volunteer();

    let mut sub = bus.subscribe(Topic::Progress(vol.id, role.id));

    service.toggle_step(&vol, &role, &step).await.unwrap();

    let event = timeout(Duration::from_secs(1), sub.next()).await.unwrap();
    assert_eq!(
        event,
        Some(ChangeEvent::ProgressUpdated {
            user_id: vol.id,
            role_id: role.id,
        })
    );
}

#[tokio::test]
async fn review_subscribers_see_submissions() {
    let db = setup().await;
    let (role, step) = seed_role(&db, "Driver").await;
    let bus = ChangeBus::new();
    let service = progress_service(&db, &bus);
    let vol = volunteer();

    let mut sub = bus.subscribe(Topic::Reviews);

    // Completing a step submits it for review.
    service.toggle_step(&vol, &role, &step).await.unwrap();

    let event = timeout(Duration::from_secs(1), sub.next())
        .await
        .unwrap()
        .unwrap();
    assert!(
        matches!(
            event,
            ChangeEvent::ReviewUpdated { user_id, step_id, .. }
                if user_id == vol.id && step_id == step.id
        ),
        "unexpected event: {event:?}"
    );
}

#[tokio::test]
async fn events_outside_the_topic_are_skipped() {
    let db = setup().await;
    let (role_a, step_a) = seed_role(&db, "Driver").await;
    let (role_b, step_b) = seed_role(&db, "Trustee").await;
    let bus = ChangeBus::new();
    let service = progress_service(&db, &bus);
    let vol = volunteer();

    let mut sub = bus.subscribe(Topic::Progress(vol.id, role_b.id));

    service.toggle_step(&vol, &role_a, &step_a).await.unwrap();
    service.toggle_step(&vol, &role_b, &step_b).await.unwrap();

    // The first delivered event is for role B; role A's was skipped.
    let event = timeout(Duration::from_secs(1), sub.next()).await.unwrap();
    assert_eq!(
        event,
        Some(ChangeEvent::ProgressUpdated {
            user_id: vol.id,
            role_id: role_b.id,
        })
    );
}

#[tokio::test]
async fn profile_changes_publish_to_their_topic() {
    let db = setup().await;
    let bus = ChangeBus::new();
    let service = ProfileService::new(SurrealProfileRepository::new(db), bus.clone());

    let identity = Identity {
        user_id: Uuid::new_v4(),
        email: "alice@example.org".into(),
        display_name: "Alice".into(),
    };

    let mut sub = bus.subscribe(Topic::Profile(identity.user_id));

    service.ensure_profile(&identity).await.unwrap();

    let event = timeout(Duration::from_secs(1), sub.next()).await.unwrap();
    assert_eq!(
        event,
        Some(ChangeEvent::ProfileUpdated {
            user_id: identity.user_id,
        })
    );
}

#[tokio::test]
async fn dropping_a_subscription_releases_its_slot() {
    let bus = ChangeBus::new();
    assert_eq!(bus.subscriber_count(), 0);

    let first = bus.subscribe(Topic::Reviews);
    let second = bus.subscribe(Topic::Profile(Uuid::new_v4()));
    assert_eq!(bus.subscriber_count(), 2);

    drop(second);
    assert_eq!(bus.subscriber_count(), 1);

    drop(first);
    assert_eq!(bus.subscriber_count(), 0);
}
