//! Per-role step progress domain model and completion arithmetic.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Expired,
}

/// A volunteer's completion state for one step within one role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepProgress {
    pub status: StepStatus,
    pub completed_at: Option<NaiveDate>,
    pub expires_at: Option<NaiveDate>,
    pub last_reviewed_at: Option<NaiveDate>,
}

impl StepProgress {
    /// A completion recorded on `date`, with the expiry stamp derived
    /// from the step's window when it has one.
    pub fn completed_on(date: NaiveDate, expires_in_months: Option<u32>) -> Self {
        Self {
            status: StepStatus::Completed,
            completed_at: Some(date),
            expires_at: expires_in_months.and_then(|months| expiry_date(date, months)),
            last_reviewed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }

    /// Status after the wall-clock expiry rule: a completion whose
    /// `expires_at` lies strictly before `today` reads as expired.
    /// The stored status is left untouched.
    pub fn effective_status(&self, today: NaiveDate) -> StepStatus {
        match (self.status, self.expires_at) {
            (StepStatus::Completed, Some(expires)) if expires < today => StepStatus::Expired,
            (status, _) => status,
        }
    }
}

/// Expiry date for a completion: `completed_at` plus a number of
/// calendar months. When the day of month has no counterpart in the
/// target month the date clamps to that month's last day
/// (Jan 31 + 1 month = Feb 29 in a leap year).
pub fn expiry_date(completed_at: NaiveDate, months: u32) -> Option<NaiveDate> {
    completed_at.checked_add_months(Months::new(months))
}

/// One volunteer's progress document for one role. Absence of a step
/// key means that step has never been touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressDoc {
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub steps: BTreeMap<Uuid, StepProgress>,
}

impl ProgressDoc {
    pub fn new(user_id: Uuid, role_id: Uuid) -> Self {
        Self {
            user_id,
            role_id,
            steps: BTreeMap::new(),
        }
    }

    pub fn step(&self, step_id: Uuid) -> Option<&StepProgress> {
        self.steps.get(&step_id)
    }
}

/// Aggregate completion counters for one role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressCounts {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

/// Counts completed steps in `doc` against the role's required total.
///
/// `percent` is the rounded completion ratio with two fixed points: an
/// empty requirement reports 0 regardless of the stored steps, and 100
/// is reported exactly when every required step is complete (199 of
/// 200 reads as 99, never rounding up to 100).
pub fn compute_counts(doc: Option<&ProgressDoc>, total: usize) -> ProgressCounts {
    let completed = doc
        .map(|d| d.steps.values().filter(|s| s.is_completed()).count())
        .unwrap_or(0);
    ProgressCounts {
        completed,
        total,
        percent: percent_of(completed, total),
    }
}

fn percent_of(completed: usize, total: usize) -> u8 {
    if total == 0 {
        0
    } else if completed >= total {
        100
    } else {
        let rounded = ((completed as f64 / total as f64) * 100.0).round() as u8;
        rounded.min(99)
    }
}
