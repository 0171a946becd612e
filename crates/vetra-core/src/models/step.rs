//! Step domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single vetting requirement (record check, reference form, ...).
///
/// `expires_in_months` absent means a completion never expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Display position within listings.
    pub order: u32,
    pub expires_in_months: Option<u32>,
    pub requires_manual_review: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStep {
    pub name: String,
    pub description: Option<String>,
    pub order: u32,
    pub expires_in_months: Option<u32>,
    pub requires_manual_review: bool,
}
