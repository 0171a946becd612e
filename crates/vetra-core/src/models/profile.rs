//! User profile domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// System-wide permission level carried on the profile.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SystemRole {
    #[default]
    Volunteer,
    Supervisor,
    Manager,
}

impl SystemRole {
    /// May read the review queue.
    pub fn can_review(self) -> bool {
        matches!(self, SystemRole::Supervisor | SystemRole::Manager)
    }

    /// May mutate review entries (approve, request changes, reopen).
    pub fn can_manage(self) -> bool {
        matches!(self, SystemRole::Manager)
    }
}

/// Authenticated identity supplied by the external identity provider.
/// Vetra stores no credentials; this is the trust boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub system_role: SystemRole,
    /// Roles the volunteer is actively tracking. A set: no duplicates,
    /// order not meaningful.
    pub role_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// The profile id comes from the external identity, not from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub system_role: SystemRole,
    pub role_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProfile {
    pub email: Option<String>,
    pub name: Option<String>,
    pub system_role: Option<SystemRole>,
    pub role_ids: Option<Vec<Uuid>>,
}
