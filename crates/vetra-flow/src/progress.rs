//! Per-step progress: the toggle action and completion counters.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use vetra_core::error::VetraResult;
use vetra_core::models::profile::UserProfile;
use vetra_core::models::progress::{
    compute_counts, ProgressCounts, ProgressDoc, StepProgress, StepStatus,
};
use vetra_core::models::review::{EntryDisplay, EntryKey};
use vetra_core::models::role::Role;
use vetra_core::models::step::Step;
use vetra_core::repository::{ProgressRepository, ReviewRepository};

use crate::notify::{ChangeBus, ChangeEvent};

/// Progress service for the acting volunteer's own documents.
pub struct ProgressService<P, R>
where
    P: ProgressRepository,
    R: ReviewRepository,
{
    progress_repo: P,
    review_repo: R,
    bus: ChangeBus,
}

impl<P, R> ProgressService<P, R>
where
    P: ProgressRepository,
    R: ReviewRepository,
{
    pub fn new(progress_repo: P, review_repo: R, bus: ChangeBus) -> Self {
        Self {
            progress_repo,
            review_repo,
            bus,
        }
    }

    /// `None` when the volunteer has never touched a step of this role.
    pub async fn get_progress(
        &self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> VetraResult<Option<ProgressDoc>> {
        self.progress_repo.find(user_id, role_id).await
    }

    /// Flip one step for the acting volunteer and return its new state.
    ///
    /// A step that is not currently completed becomes completed today,
    /// stamping the expiry date when the step has a validity window,
    /// and is submitted for review. A completed step is reset: its
    /// record is cleared from the document, while the review entry is
    /// left alone so the submission trail survives un-toggling.
    pub async fn toggle_step(
        &self,
        actor: &UserProfile,
        role: &Role,
        step: &Step,
    ) -> VetraResult<StepProgress> {
        // 1. Load the current document; absent means an untouched role.
        let mut doc = self
            .progress_repo
            .find(actor.id, role.id)
            .await?
            .unwrap_or_else(|| ProgressDoc::new(actor.id, role.id));

        let currently_completed = doc.step(step.id).is_some_and(|s| s.is_completed());

        // 2. Flip in memory only; nothing is visible until the write
        //    lands.
        let new_state = if currently_completed {
            doc.steps.remove(&step.id);
            StepProgress {
                status: StepStatus::Pending,
                completed_at: None,
                expires_at: None,
                last_reviewed_at: None,
            }
        } else {
            let today = Utc::now().date_naive();
            let progress = StepProgress::completed_on(today, step.expires_in_months);
            doc.steps.insert(step.id, progress.clone());
            progress
        };

        // 3. Durable write, then notify.
        self.progress_repo.upsert(doc).await?;
        info!(
            user_id = %actor.id,
            role_id = %role.id,
            step_id = %step.id,
            completed = new_state.is_completed(),
            "Step toggled"
        );
        self.bus.publish(ChangeEvent::ProgressUpdated {
            user_id: actor.id,
            role_id: role.id,
        });

        // 4. A transition into completed opens (or refreshes) the
        //    review entry. A reset does not touch it.
        if new_state.is_completed() {
            let key = EntryKey {
                user_id: actor.id,
                role_id: role.id,
                step_id: step.id,
            };
            self.review_repo
                .submit(
                    key,
                    None,
                    EntryDisplay {
                        user_email: Some(actor.email.clone()),
                        role_name: Some(role.name.clone()),
                        step_name: Some(step.name.clone()),
                    },
                )
                .await?;
            info!(user_id = %actor.id, role_id = %role.id, step_id = %step.id, "Step submitted for review");
            self.bus.publish(ChangeEvent::ReviewUpdated {
                user_id: actor.id,
                role_id: role.id,
                step_id: step.id,
            });
        }

        Ok(new_state)
    }

    /// Completion counters for one role.
    pub async fn progress_counts(
        &self,
        user_id: Uuid,
        role_id: Uuid,
        total_steps: usize,
    ) -> VetraResult<ProgressCounts> {
        let doc = self.progress_repo.find(user_id, role_id).await?;
        Ok(compute_counts(doc.as_ref(), total_steps))
    }

    /// Counters for every given role at once, keyed by role id.
    pub async fn counts_for_roles(
        &self,
        user_id: Uuid,
        roles: &[Role],
    ) -> VetraResult<BTreeMap<Uuid, ProgressCounts>> {
        let mut counts = BTreeMap::new();
        for role in roles {
            let doc = self.progress_repo.find(user_id, role.id).await?;
            counts.insert(role.id, compute_counts(doc.as_ref(), role.steps.len()));
        }
        Ok(counts)
    }
}
