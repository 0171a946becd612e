//! In-memory review queue with optimistic updates.
//!
//! The view applies an action's expected result to its local items
//! immediately, then replaces the patched item with the stored entry
//! once the write lands. If the write fails, the exact pre-action
//! snapshot is restored and the error is handed back to the caller.
//! A view built with `allow_actions = false` treats every action as a
//! safe no-op.

use chrono::Utc;
use tracing::warn;
use vetra_core::error::VetraResult;
use vetra_core::models::profile::UserProfile;
use vetra_core::models::review::{EntryKey, ReviewEntry, ReviewStatus};
use vetra_core::repository::{EntryFilter, ReviewRepository};

use crate::review::ReviewService;

pub struct ReviewQueueView {
    filter: EntryFilter,
    allow_actions: bool,
    items: Vec<ReviewEntry>,
}

impl ReviewQueueView {
    pub fn new(filter: EntryFilter, allow_actions: bool) -> Self {
        Self {
            filter,
            allow_actions,
            items: Vec::new(),
        }
    }

    /// Re-run the query and replace the local items.
    pub async fn refresh<R: ReviewRepository>(
        &mut self,
        service: &ReviewService<R>,
        actor: &UserProfile,
    ) -> VetraResult<()> {
        self.items = service.list_entries(actor, self.filter.clone()).await?;
        Ok(())
    }

    pub fn items(&self) -> &[ReviewEntry] {
        &self.items
    }

    pub fn allow_actions(&self) -> bool {
        self.allow_actions
    }

    /// Entries still waiting for a decision.
    pub fn pending_count(&self) -> usize {
        self.items
            .iter()
            .filter(|e| e.status == ReviewStatus::Submitted)
            .count()
    }

    pub async fn approve<R: ReviewRepository>(
        &mut self,
        service: &ReviewService<R>,
        actor: &UserProfile,
        key: EntryKey,
    ) -> VetraResult<()> {
        if !self.allow_actions {
            return Ok(());
        }
        let Some(index) = self.position(key) else {
            return Ok(());
        };
        let snapshot = self.items[index].clone();

        {
            let entry = &mut self.items[index];
            entry.status = ReviewStatus::Approved;
            entry.approved_at = Some(Utc::now());
            entry.approver_id = Some(actor.id);
        }

        match service.approve(actor, key).await {
            Ok(entry) => {
                self.items[index] = entry;
                Ok(())
            }
            Err(err) => {
                warn!(step_id = %key.step_id, "Approve failed; restoring the queue item");
                self.items[index] = snapshot;
                Err(err)
            }
        }
    }

    pub async fn request_changes<R: ReviewRepository>(
        &mut self,
        service: &ReviewService<R>,
        actor: &UserProfile,
        key: EntryKey,
        notes: String,
    ) -> VetraResult<()> {
        if !self.allow_actions {
            return Ok(());
        }
        let Some(index) = self.position(key) else {
            return Ok(());
        };
        let snapshot = self.items[index].clone();

        {
            let entry = &mut self.items[index];
            entry.status = ReviewStatus::ChangesRequested;
            entry.notes = Some(notes.clone());
        }

        match service.request_changes(actor, key, notes).await {
            Ok(entry) => {
                self.items[index] = entry;
                Ok(())
            }
            Err(err) => {
                warn!(step_id = %key.step_id, "Request-changes failed; restoring the queue item");
                self.items[index] = snapshot;
                Err(err)
            }
        }
    }

    pub async fn reopen<R: ReviewRepository>(
        &mut self,
        service: &ReviewService<R>,
        actor: &UserProfile,
        key: EntryKey,
    ) -> VetraResult<()> {
        if !self.allow_actions {
            return Ok(());
        }
        let Some(index) = self.position(key) else {
            return Ok(());
        };
        let snapshot = self.items[index].clone();

        {
            let entry = &mut self.items[index];
            entry.status = ReviewStatus::Submitted;
            entry.approved_at = None;
            entry.approver_id = None;
        }

        match service.reopen(actor, key).await {
            Ok(entry) => {
                self.items[index] = entry;
                Ok(())
            }
            Err(err) => {
                warn!(step_id = %key.step_id, "Reopen failed; restoring the queue item");
                self.items[index] = snapshot;
                Err(err)
            }
        }
    }

    fn position(&self, key: EntryKey) -> Option<usize> {
        self.items.iter().position(|e| e.key() == key)
    }
}
