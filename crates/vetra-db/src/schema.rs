//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Status enums are stored as strings
//! with ASSERT constraints matching the domain wire values. The
//! per-role `progress.steps` object is FLEXIBLE because its keys are
//! step ids and its values may still carry the legacy boolean
//! `completed` shape.

use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, Deserialize)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Roles (catalog, seeded administratively)
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD description ON TABLE role TYPE option<string>;
DEFINE FIELD steps ON TABLE role TYPE array DEFAULT [];
DEFINE FIELD steps.* ON TABLE role TYPE string;
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_name ON TABLE role COLUMNS name UNIQUE;

-- =======================================================================
-- Steps (catalog, seeded administratively)
-- =======================================================================
DEFINE TABLE step SCHEMAFULL;
DEFINE FIELD name ON TABLE step TYPE string;
DEFINE FIELD description ON TABLE step TYPE option<string>;
DEFINE FIELD display_order ON TABLE step TYPE int DEFAULT 0;
DEFINE FIELD expires_in_months ON TABLE step TYPE option<int>;
DEFINE FIELD requires_manual_review ON TABLE step TYPE bool \
    DEFAULT false;
DEFINE FIELD created_at ON TABLE step TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- User profiles (system role embedded; no separate permission table)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD system_role ON TABLE user TYPE string \
    ASSERT $value IN ['volunteer', 'supervisor', 'manager'];
DEFINE FIELD role_ids ON TABLE user TYPE array DEFAULT [];
DEFINE FIELD role_ids.* ON TABLE user TYPE string;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Progress documents (one per volunteer x role)
-- =======================================================================
DEFINE TABLE progress SCHEMAFULL;
DEFINE FIELD user_id ON TABLE progress TYPE string;
DEFINE FIELD role_id ON TABLE progress TYPE string;
DEFINE FIELD steps ON TABLE progress FLEXIBLE TYPE object DEFAULT {};
DEFINE FIELD updated_at ON TABLE progress TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_progress_user_role ON TABLE progress \
    COLUMNS user_id, role_id UNIQUE;

-- =======================================================================
-- Review entries (one per volunteer x role x step)
-- =======================================================================
DEFINE TABLE review_entry SCHEMAFULL;
DEFINE FIELD user_id ON TABLE review_entry TYPE string;
DEFINE FIELD role_id ON TABLE review_entry TYPE string;
DEFINE FIELD step_id ON TABLE review_entry TYPE string;
DEFINE FIELD status ON TABLE review_entry TYPE string \
    ASSERT $value IN ['submitted', 'changes_requested', 'approved'];
DEFINE FIELD notes ON TABLE review_entry TYPE option<string>;
DEFINE FIELD submitted_at ON TABLE review_entry TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD approved_at ON TABLE review_entry TYPE option<datetime>;
DEFINE FIELD approver_id ON TABLE review_entry TYPE option<string>;
DEFINE FIELD user_email ON TABLE review_entry TYPE option<string>;
DEFINE FIELD role_name ON TABLE review_entry TYPE option<string>;
DEFINE FIELD step_name ON TABLE review_entry TYPE option<string>;
DEFINE INDEX idx_entry_user_role_step ON TABLE review_entry \
    COLUMNS user_id, role_id, step_id UNIQUE;
DEFINE INDEX idx_entry_role ON TABLE review_entry COLUMNS role_id;
DEFINE INDEX idx_entry_status ON TABLE review_entry COLUMNS status;
DEFINE INDEX idx_entry_submitted ON TABLE review_entry \
    COLUMNS submitted_at;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum. The
/// version gate makes re-running safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
