//! SurrealDB implementation of [`ProgressRepository`].
//!
//! A progress document is a singleton per volunteer x role, stored
//! under the deterministic record id `{user_id}_{role_id}` so writes
//! are idempotent upserts. Step values are decoded permissively: older
//! documents carry a boolean `completed` flag instead of the string
//! `status` field, and that translation happens here and nowhere else.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;
use vetra_core::error::VetraResult;
use vetra_core::models::progress::{ProgressDoc, StepProgress, StepStatus};
use vetra_core::repository::ProgressRepository;

use crate::error::DbError;

fn progress_id(user_id: Uuid, role_id: Uuid) -> String {
    format!("{user_id}_{role_id}")
}

/// Stored step value. Every field is optional so both the current
/// shape (`status` string) and the legacy shape (`completed` boolean)
/// decode without errors.
#[derive(Debug, Deserialize)]
struct StepRecord {
    status: Option<String>,
    completed: Option<bool>,
    completed_at: Option<String>,
    expires_at: Option<String>,
    last_reviewed_at: Option<String>,
}

fn parse_step_status(s: &str) -> Result<StepStatus, DbError> {
    match s {
        "pending" => Ok(StepStatus::Pending),
        "in-progress" => Ok(StepStatus::InProgress),
        "completed" => Ok(StepStatus::Completed),
        "expired" => Ok(StepStatus::Expired),
        other => Err(DbError::Decode(format!("unknown step status: {other}"))),
    }
}

fn parse_date_opt(raw: Option<&str>) -> Result<Option<NaiveDate>, DbError> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| DbError::Decode(format!("invalid date '{s}': {e}")))
    })
    .transpose()
}

impl StepRecord {
    fn into_step_progress(self) -> Result<StepProgress, DbError> {
        let status = match (self.status.as_deref(), self.completed) {
            (Some(s), _) => parse_step_status(s)?,
            (None, Some(true)) => StepStatus::Completed,
            (None, _) => StepStatus::Pending,
        };
        Ok(StepProgress {
            status,
            completed_at: parse_date_opt(self.completed_at.as_deref())?,
            expires_at: parse_date_opt(self.expires_at.as_deref())?,
            last_reviewed_at: parse_date_opt(self.last_reviewed_at.as_deref())?,
        })
    }
}

/// DB-side row struct for the whole progress document.
#[derive(Debug, Deserialize)]
struct ProgressRow {
    user_id: String,
    role_id: String,
    steps: BTreeMap<String, StepRecord>,
}

impl ProgressRow {
    fn into_doc(self) -> Result<ProgressDoc, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Decode(format!("invalid user UUID: {e}")))?;
        let role_id = Uuid::parse_str(&self.role_id)
            .map_err(|e| DbError::Decode(format!("invalid role UUID: {e}")))?;

        let mut steps = BTreeMap::new();
        for (key, record) in self.steps {
            let step_id = Uuid::parse_str(&key)
                .map_err(|e| DbError::Decode(format!("invalid step UUID: {e}")))?;
            steps.insert(step_id, record.into_step_progress()?);
        }

        Ok(ProgressDoc {
            user_id,
            role_id,
            steps,
        })
    }
}

/// SurrealDB implementation of the Progress repository.
#[derive(Clone)]
pub struct SurrealProgressRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProgressRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProgressRepository for SurrealProgressRepository<C> {
    async fn find(&self, user_id: Uuid, role_id: Uuid) -> VetraResult<Option<ProgressDoc>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::thing('progress', $id)")
            .bind(("id", progress_id(user_id, role_id)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProgressRow> = result.take(0).map_err(DbError::from)?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_doc()?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, doc: ProgressDoc) -> VetraResult<ProgressDoc> {
        let id_str = progress_id(doc.user_id, doc.role_id);
        let steps: BTreeMap<String, StepProgress> = doc
            .steps
            .iter()
            .map(|(step_id, progress)| (step_id.to_string(), progress.clone()))
            .collect();

        let result = self
            .db
            .query(
                "UPSERT type::thing('progress', $id) SET \
                 user_id = $user_id, \
                 role_id = $role_id, \
                 steps = $steps, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", doc.user_id.to_string()))
            .bind(("role_id", doc.role_id.to_string()))
            .bind(("steps", steps))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<ProgressRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "progress".into(),
            id: id_str,
        })?;

        Ok(row.into_doc()?)
    }
}
