//! Role domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A volunteer position. The `steps` list is ordered and defines the
/// required vetting sequence for the role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub description: Option<String>,
    pub steps: Vec<Uuid>,
}
