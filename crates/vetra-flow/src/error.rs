//! Workflow error types.

use thiserror::Error;
use vetra_core::error::VetraError;

/// Errors raised by the workflow services before any repository call.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The action mutates review state and is reserved for managers.
    #[error("{action} requires manager permission")]
    ManagerRequired { action: &'static str },

    /// Reading the review queue requires supervisor or manager.
    #[error("the review queue requires supervisor or manager permission")]
    ReviewerRequired,

    /// The action is only valid for the volunteer who owns the record.
    #[error("{action} is only permitted for the owning volunteer")]
    OwnerRequired { action: &'static str },
}

impl From<FlowError> for VetraError {
    fn from(err: FlowError) -> Self {
        VetraError::PermissionDenied {
            reason: err.to_string(),
        }
    }
}
