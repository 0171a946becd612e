//! SurrealDB implementation of [`ReviewRepository`].
//!
//! Entries live under the deterministic record id
//! `{user_id}_{role_id}_{step_id}`: one entry per volunteer x role x
//! step, created on first submission and overwritten afterwards.
//! `submit` deliberately leaves `approved_at`/`approver_id` in place;
//! only `reopen` clears them.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;
use vetra_core::error::VetraResult;
use vetra_core::models::review::{EntryDisplay, EntryKey, ReviewEntry, ReviewStatus};
use vetra_core::repository::{EntryFilter, ReviewRepository};

use crate::error::DbError;

fn entry_id(key: &EntryKey) -> String {
    format!("{}_{}_{}", key.user_id, key.role_id, key.step_id)
}

fn parse_review_status(s: &str) -> Result<ReviewStatus, DbError> {
    match s {
        "submitted" => Ok(ReviewStatus::Submitted),
        "changes_requested" => Ok(ReviewStatus::ChangesRequested),
        "approved" => Ok(ReviewStatus::Approved),
        other => Err(DbError::Decode(format!("unknown review status: {other}"))),
    }
}

fn review_status_to_str(status: ReviewStatus) -> &'static str {
    match status {
        ReviewStatus::Submitted => "submitted",
        ReviewStatus::ChangesRequested => "changes_requested",
        ReviewStatus::Approved => "approved",
    }
}

/// DB-side row struct for review entries.
#[derive(Debug, Deserialize)]
struct EntryRow {
    user_id: String,
    role_id: String,
    step_id: String,
    status: String,
    notes: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
    approved_at: Option<DateTime<Utc>>,
    approver_id: Option<String>,
    user_email: Option<String>,
    role_name: Option<String>,
    step_name: Option<String>,
}

impl EntryRow {
    fn try_into_entry(self) -> Result<ReviewEntry, DbError> {
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Decode(format!("invalid user UUID: {e}")))?;
        let role_id = Uuid::parse_str(&self.role_id)
            .map_err(|e| DbError::Decode(format!("invalid role UUID: {e}")))?;
        let step_id = Uuid::parse_str(&self.step_id)
            .map_err(|e| DbError::Decode(format!("invalid step UUID: {e}")))?;
        let approver_id = self
            .approver_id
            .as_deref()
            .map(|s| {
                Uuid::parse_str(s)
                    .map_err(|e| DbError::Decode(format!("invalid approver UUID: {e}")))
            })
            .transpose()?;

        Ok(ReviewEntry {
            user_id,
            role_id,
            step_id,
            status: parse_review_status(&self.status)?,
            notes: self.notes,
            submitted_at: self.submitted_at,
            approved_at: self.approved_at,
            approver_id,
            user_email: self.user_email,
            role_name: self.role_name,
            step_name: self.step_name,
        })
    }
}

/// SurrealDB implementation of the Review repository.
#[derive(Clone)]
pub struct SurrealReviewRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealReviewRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    fn take_entry(
        &self,
        result: surrealdb::Response,
        id_str: String,
    ) -> Result<ReviewEntry, DbError> {
        let mut result = result.check().map_err(DbError::from)?;
        let rows: Vec<EntryRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or(DbError::NotFound {
            entity: "review_entry".into(),
            id: id_str,
        })?;
        row.try_into_entry()
    }
}

impl<C: Connection> ReviewRepository for SurrealReviewRepository<C> {
    async fn submit(
        &self,
        key: EntryKey,
        notes: Option<String>,
        display: EntryDisplay,
    ) -> VetraResult<ReviewEntry> {
        let id_str = entry_id(&key);

        let result = self
            .db
            .query(
                "UPSERT type::thing('review_entry', $id) SET \
                 user_id = $user_id, \
                 role_id = $role_id, \
                 step_id = $step_id, \
                 status = 'submitted', \
                 notes = $notes, \
                 submitted_at = time::now(), \
                 user_email = $user_email, \
                 role_name = $role_name, \
                 step_name = $step_name",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", key.user_id.to_string()))
            .bind(("role_id", key.role_id.to_string()))
            .bind(("step_id", key.step_id.to_string()))
            .bind(("notes", notes))
            .bind(("user_email", display.user_email))
            .bind(("role_name", display.role_name))
            .bind(("step_name", display.step_name))
            .await
            .map_err(DbError::from)?;

        Ok(self.take_entry(result, id_str)?)
    }

    async fn find(&self, key: EntryKey) -> VetraResult<Option<ReviewEntry>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::thing('review_entry', $id)")
            .bind(("id", entry_id(&key)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EntryRow> = result.take(0).map_err(DbError::from)?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_entry()?)),
            None => Ok(None),
        }
    }

    async fn approve(&self, key: EntryKey, approver_id: Uuid) -> VetraResult<ReviewEntry> {
        let id_str = entry_id(&key);

        let result = self
            .db
            .query(
                "UPDATE type::thing('review_entry', $id) SET \
                 status = 'approved', \
                 approved_at = time::now(), \
                 approver_id = $approver_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("approver_id", approver_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(self.take_entry(result, id_str)?)
    }

    async fn request_changes(&self, key: EntryKey, notes: String) -> VetraResult<ReviewEntry> {
        let id_str = entry_id(&key);

        // approved_at/approver_id intentionally untouched.
        let result = self
            .db
            .query(
                "UPDATE type::thing('review_entry', $id) SET \
                 status = 'changes_requested', \
                 notes = $notes",
            )
            .bind(("id", id_str.clone()))
            .bind(("notes", notes))
            .await
            .map_err(DbError::from)?;

        Ok(self.take_entry(result, id_str)?)
    }

    async fn reopen(&self, key: EntryKey) -> VetraResult<ReviewEntry> {
        let id_str = entry_id(&key);

        let result = self
            .db
            .query(
                "UPDATE type::thing('review_entry', $id) SET \
                 status = 'submitted', \
                 approved_at = NONE, \
                 approver_id = NONE",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        Ok(self.take_entry(result, id_str)?)
    }

    async fn list(&self, filter: EntryFilter, limit: u64) -> VetraResult<Vec<ReviewEntry>> {
        let mut clauses = Vec::new();
        if filter.role_id.is_some() {
            clauses.push("role_id = $role_id");
        }
        if filter.status.is_some() {
            clauses.push("status = $status");
        }
        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {} ", clauses.join(" AND "))
        };

        let query = format!(
            "SELECT * FROM review_entry {where_clause}\
             ORDER BY submitted_at DESC LIMIT $limit"
        );

        let mut builder = self.db.query(&query).bind(("limit", limit));
        if let Some(role_id) = filter.role_id {
            builder = builder.bind(("role_id", role_id.to_string()));
        }
        if let Some(status) = filter.status {
            builder = builder.bind(("status", review_status_to_str(status).to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<EntryRow> = result.take(0).map_err(DbError::from)?;

        let entries = rows
            .into_iter()
            .map(|row| row.try_into_entry())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(entries)
    }
}
