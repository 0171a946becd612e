//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Absence is part of the normal
//! contract for progress documents, profiles, and review entries
//! (`find` returning `None`); catalog lookups signal not-found as an
//! error for user-facing messaging.

use uuid::Uuid;

use crate::error::VetraResult;
use crate::models::{
    profile::{CreateProfile, UpdateProfile, UserProfile},
    progress::ProgressDoc,
    review::{EntryDisplay, EntryKey, ReviewEntry, ReviewStatus},
    role::{CreateRole, Role},
    step::{CreateStep, Step},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Catalog (reference data, seeded administratively)
// ---------------------------------------------------------------------------

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = VetraResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = VetraResult<Role>> + Send;
    /// All roles, ordered by name.
    fn list(&self) -> impl Future<Output = VetraResult<Vec<Role>>> + Send;
}

pub trait StepRepository: Send + Sync {
    fn create(&self, input: CreateStep) -> impl Future<Output = VetraResult<Step>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = VetraResult<Step>> + Send;
    /// All steps, ordered by display position.
    fn list(&self) -> impl Future<Output = VetraResult<Vec<Step>>> + Send;
    /// Resolve ids preserving the given order; unknown ids are skipped.
    fn get_many(&self, ids: &[Uuid]) -> impl Future<Output = VetraResult<Vec<Step>>> + Send;
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

pub trait ProfileRepository: Send + Sync {
    fn create(
        &self,
        input: CreateProfile,
    ) -> impl Future<Output = VetraResult<UserProfile>> + Send;
    /// `None` when no profile exists for this id.
    fn find(&self, id: Uuid) -> impl Future<Output = VetraResult<Option<UserProfile>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateProfile,
    ) -> impl Future<Output = VetraResult<UserProfile>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = VetraResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = VetraResult<PaginatedResult<UserProfile>>> + Send;
}

// ---------------------------------------------------------------------------
// Progress documents (one per volunteer x role)
// ---------------------------------------------------------------------------

pub trait ProgressRepository: Send + Sync {
    /// `None` when the volunteer has never touched a step of this role.
    fn find(
        &self,
        user_id: Uuid,
        role_id: Uuid,
    ) -> impl Future<Output = VetraResult<Option<ProgressDoc>>> + Send;
    /// Writes the whole per-role document, creating it on first write.
    fn upsert(&self, doc: ProgressDoc) -> impl Future<Output = VetraResult<ProgressDoc>> + Send;
}

// ---------------------------------------------------------------------------
// Review entries
// ---------------------------------------------------------------------------

/// Query filters for the review queue. Filters combine with AND.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub role_id: Option<Uuid>,
    pub status: Option<ReviewStatus>,
}

pub trait ReviewRepository: Send + Sync {
    /// Create or overwrite the entry as a fresh submission: status
    /// becomes `submitted` and `submitted_at` is stamped. Approval
    /// fields from an earlier decision are left in place.
    fn submit(
        &self,
        key: EntryKey,
        notes: Option<String>,
        display: EntryDisplay,
    ) -> impl Future<Output = VetraResult<ReviewEntry>> + Send;
    /// `None` when the step has never been submitted.
    fn find(&self, key: EntryKey) -> impl Future<Output = VetraResult<Option<ReviewEntry>>> + Send;
    fn approve(
        &self,
        key: EntryKey,
        approver_id: Uuid,
    ) -> impl Future<Output = VetraResult<ReviewEntry>> + Send;
    fn request_changes(
        &self,
        key: EntryKey,
        notes: String,
    ) -> impl Future<Output = VetraResult<ReviewEntry>> + Send;
    /// Back to `submitted`; clears `approved_at`/`approver_id`.
    fn reopen(&self, key: EntryKey) -> impl Future<Output = VetraResult<ReviewEntry>> + Send;
    /// Newest submissions first, capped at `limit`.
    fn list(
        &self,
        filter: EntryFilter,
        limit: u64,
    ) -> impl Future<Output = VetraResult<Vec<ReviewEntry>>> + Send;
}
