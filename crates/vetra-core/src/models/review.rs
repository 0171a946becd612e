//! Review workflow domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Workflow status of a submitted step. Three states, no terminal one:
/// an approved entry can always be reopened.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Submitted,
    ChangesRequested,
    Approved,
}

/// Identifies the single review entry for one volunteer x role x step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub step_id: Uuid,
}

/// The reviewer-facing workflow record, created lazily on first
/// submission and never deleted by the normal workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub step_id: Uuid,
    pub status: ReviewStatus,
    pub notes: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approver_id: Option<Uuid>,
    pub user_email: Option<String>,
    pub role_name: Option<String>,
    pub step_name: Option<String>,
}

impl ReviewEntry {
    pub fn key(&self) -> EntryKey {
        EntryKey {
            user_id: self.user_id,
            role_id: self.role_id,
            step_id: self.step_id,
        }
    }
}

/// Display fields denormalized onto an entry at submission time so
/// queue rows render without catalog or profile lookups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryDisplay {
    pub user_email: Option<String>,
    pub role_name: Option<String>,
    pub step_name: Option<String>,
}
