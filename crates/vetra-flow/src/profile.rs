//! Volunteer profiles, tracked-role selection, and account management.

use std::collections::BTreeSet;

use tracing::info;
use uuid::Uuid;
use vetra_core::error::{VetraError, VetraResult};
use vetra_core::models::profile::{
    CreateProfile, Identity, SystemRole, UpdateProfile, UserProfile,
};
use vetra_core::repository::{PaginatedResult, Pagination, ProfileRepository};

use crate::notify::{ChangeBus, ChangeEvent};

/// A pending tracked-role selection, compared against the last-saved
/// set. A selection view toggles roles locally, asks whether anything
/// actually changed, and only then saves.
#[derive(Debug, Clone, Default)]
pub struct RoleSelection {
    saved: BTreeSet<Uuid>,
    pending: BTreeSet<Uuid>,
}

impl RoleSelection {
    pub fn new(saved: impl IntoIterator<Item = Uuid>) -> Self {
        let saved: BTreeSet<Uuid> = saved.into_iter().collect();
        Self {
            pending: saved.clone(),
            saved,
        }
    }

    /// Add the role to the pending selection, or remove it when
    /// already present.
    pub fn toggle(&mut self, role_id: Uuid) {
        if !self.pending.remove(&role_id) {
            self.pending.insert(role_id);
        }
    }

    pub fn contains(&self, role_id: Uuid) -> bool {
        self.pending.contains(&role_id)
    }

    /// Set equality against the last-saved selection; the order roles
    /// were picked in never matters.
    pub fn is_dirty(&self) -> bool {
        self.pending != self.saved
    }

    /// The selection to persist.
    pub fn pending(&self) -> &BTreeSet<Uuid> {
        &self.pending
    }

    /// Record that the pending selection was persisted.
    pub fn mark_saved(&mut self) {
        self.saved = self.pending.clone();
    }
}

/// Profile service handling sign-in provisioning, tracked roles, and
/// the account-management surface.
pub struct ProfileService<P: ProfileRepository> {
    profile_repo: P,
    bus: ChangeBus,
}

impl<P: ProfileRepository> ProfileService<P> {
    pub fn new(profile_repo: P, bus: ChangeBus) -> Self {
        Self { profile_repo, bus }
    }

    /// Fetch-or-create on authentication. An existing profile comes
    /// back unchanged; a missing one is created as a volunteer
    /// tracking no roles, so repeated sign-ins are idempotent.
    pub async fn ensure_profile(&self, identity: &Identity) -> VetraResult<UserProfile> {
        if let Some(profile) = self.profile_repo.find(identity.user_id).await? {
            return Ok(profile);
        }

        info!(user_id = %identity.user_id, "Creating profile on first sign-in");
        let profile = self
            .profile_repo
            .create(CreateProfile {
                id: identity.user_id,
                email: identity.email.clone(),
                name: identity.display_name.clone(),
                system_role: SystemRole::Volunteer,
                role_ids: Vec::new(),
            })
            .await?;

        self.bus.publish(ChangeEvent::ProfileUpdated {
            user_id: profile.id,
        });
        Ok(profile)
    }

    pub async fn get_profile(&self, user_id: Uuid) -> VetraResult<Option<UserProfile>> {
        self.profile_repo.find(user_id).await
    }

    /// Overwrite the tracked-role set with `role_ids`.
    pub async fn set_tracked_roles(
        &self,
        user_id: Uuid,
        role_ids: &BTreeSet<Uuid>,
    ) -> VetraResult<UserProfile> {
        let profile = self
            .profile_repo
            .update(
                user_id,
                UpdateProfile {
                    role_ids: Some(role_ids.iter().copied().collect()),
                    ..Default::default()
                },
            )
            .await?;

        info!(user_id = %user_id, tracked = profile.role_ids.len(), "Tracked roles saved");
        self.bus.publish(ChangeEvent::ProfileUpdated { user_id });
        Ok(profile)
    }

    /// Add one role to the tracked set. Tracking an already-tracked
    /// role is a no-op.
    pub async fn track_role(&self, user_id: Uuid, role_id: Uuid) -> VetraResult<UserProfile> {
        let Some(profile) = self.profile_repo.find(user_id).await? else {
            return Err(VetraError::NotFound {
                entity: "user".to_string(),
                id: user_id.to_string(),
            });
        };

        let mut selection: BTreeSet<Uuid> = profile.role_ids.iter().copied().collect();
        if !selection.insert(role_id) {
            return Ok(profile);
        }
        self.set_tracked_roles(user_id, &selection).await
    }

    /// Partial account update.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfile,
    ) -> VetraResult<UserProfile> {
        let profile = self.profile_repo.update(user_id, input).await?;
        info!(user_id = %user_id, "Profile updated");
        self.bus.publish(ChangeEvent::ProfileUpdated { user_id });
        Ok(profile)
    }

    pub async fn delete_account(&self, user_id: Uuid) -> VetraResult<()> {
        self.profile_repo.delete(user_id).await?;
        info!(user_id = %user_id, "Account deleted");
        self.bus.publish(ChangeEvent::ProfileUpdated { user_id });
        Ok(())
    }

    pub async fn list_accounts(
        &self,
        pagination: Pagination,
    ) -> VetraResult<PaginatedResult<UserProfile>> {
        self.profile_repo.list(pagination).await
    }
}
