//! Database-specific error types and conversions.

use vetra_core::error::VetraError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Row decoding failed: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for VetraError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => VetraError::NotFound { entity, id },
            other => VetraError::Database(other.to_string()),
        }
    }
}
