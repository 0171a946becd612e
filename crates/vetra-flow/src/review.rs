//! Review workflow: queue listing and reviewer decisions.

use tracing::{info, warn};
use vetra_core::error::VetraResult;
use vetra_core::models::profile::UserProfile;
use vetra_core::models::review::{EntryDisplay, EntryKey, ReviewEntry};
use vetra_core::repository::{EntryFilter, ReviewRepository};

use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::notify::{ChangeBus, ChangeEvent};

/// Review service.
///
/// Permission checks run before any read or write: listing requires a
/// reviewer (supervisor or manager), decisions require a manager, and
/// submission belongs to the owning volunteer.
pub struct ReviewService<R: ReviewRepository> {
    review_repo: R,
    config: FlowConfig,
    bus: ChangeBus,
}

impl<R: ReviewRepository> ReviewService<R> {
    pub fn new(review_repo: R, config: FlowConfig, bus: ChangeBus) -> Self {
        Self {
            review_repo,
            config,
            bus,
        }
    }

    /// Entries newest first, capped at the configured page size.
    pub async fn list_entries(
        &self,
        actor: &UserProfile,
        filter: EntryFilter,
    ) -> VetraResult<Vec<ReviewEntry>> {
        if !actor.system_role.can_review() {
            warn!(user_id = %actor.id, "Review queue access denied");
            return Err(FlowError::ReviewerRequired.into());
        }
        self.review_repo
            .list(filter, self.config.review_page_size)
            .await
    }

    /// One entry, visible to reviewers and to the owning volunteer.
    pub async fn find_entry(
        &self,
        actor: &UserProfile,
        key: EntryKey,
    ) -> VetraResult<Option<ReviewEntry>> {
        if actor.id != key.user_id && !actor.system_role.can_review() {
            warn!(user_id = %actor.id, "Review entry access denied");
            return Err(FlowError::ReviewerRequired.into());
        }
        self.review_repo.find(key).await
    }

    /// Approve the entry, stamping the decision with the acting
    /// manager and the current time.
    pub async fn approve(&self, actor: &UserProfile, key: EntryKey) -> VetraResult<ReviewEntry> {
        self.require_manager(actor, "approve")?;

        let entry = self.review_repo.approve(key, actor.id).await?;
        info!(approver = %actor.id, user_id = %key.user_id, step_id = %key.step_id, "Entry approved");
        self.publish(key);
        Ok(entry)
    }

    /// Send the entry back to the volunteer with reviewer notes. An
    /// earlier approval stamp, if any, stays on the entry.
    pub async fn request_changes(
        &self,
        actor: &UserProfile,
        key: EntryKey,
        notes: String,
    ) -> VetraResult<ReviewEntry> {
        self.require_manager(actor, "request changes")?;

        let entry = self.review_repo.request_changes(key, notes).await?;
        info!(reviewer = %actor.id, user_id = %key.user_id, step_id = %key.step_id, "Changes requested");
        self.publish(key);
        Ok(entry)
    }

    /// Put the entry back in the queue, clearing any approval stamp.
    pub async fn reopen(&self, actor: &UserProfile, key: EntryKey) -> VetraResult<ReviewEntry> {
        self.require_manager(actor, "reopen")?;

        let entry = self.review_repo.reopen(key).await?;
        info!(reviewer = %actor.id, user_id = %key.user_id, step_id = %key.step_id, "Entry reopened");
        self.publish(key);
        Ok(entry)
    }

    /// Volunteer-side submission: first submission or a re-submission
    /// after changes were requested.
    pub async fn submit(
        &self,
        actor: &UserProfile,
        key: EntryKey,
        notes: Option<String>,
        display: EntryDisplay,
    ) -> VetraResult<ReviewEntry> {
        if actor.id != key.user_id {
            warn!(user_id = %actor.id, owner = %key.user_id, "Submission denied");
            return Err(FlowError::OwnerRequired { action: "submit" }.into());
        }

        let entry = self.review_repo.submit(key, notes, display).await?;
        info!(user_id = %key.user_id, step_id = %key.step_id, "Entry submitted");
        self.publish(key);
        Ok(entry)
    }

    fn require_manager(&self, actor: &UserProfile, action: &'static str) -> Result<(), FlowError> {
        if actor.system_role.can_manage() {
            Ok(())
        } else {
            warn!(user_id = %actor.id, action, "Manager permission denied");
            Err(FlowError::ManagerRequired { action })
        }
    }

    fn publish(&self, key: EntryKey) {
        self.bus.publish(ChangeEvent::ReviewUpdated {
            user_id: key.user_id,
            role_id: key.role_id,
            step_id: key.step_id,
        });
    }
}
