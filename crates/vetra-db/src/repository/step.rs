//! SurrealDB implementation of [`StepRepository`].

use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;
use vetra_core::error::VetraResult;
use vetra_core::models::step::{CreateStep, Step};
use vetra_core::repository::StepRepository;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
/// The model's `order` field is stored as `display_order`.
#[derive(Debug, Deserialize)]
struct StepRow {
    name: String,
    description: Option<String>,
    display_order: u32,
    expires_in_months: Option<u32>,
    requires_manual_review: bool,
}

/// DB-side row struct that includes the record ID via `record::id(id)`.
#[derive(Debug, Deserialize)]
struct StepRowWithId {
    record_id: String,
    name: String,
    description: Option<String>,
    display_order: u32,
    expires_in_months: Option<u32>,
    requires_manual_review: bool,
}

impl StepRow {
    fn into_step(self, id: Uuid) -> Step {
        Step {
            id,
            name: self.name,
            description: self.description,
            order: self.display_order,
            expires_in_months: self.expires_in_months,
            requires_manual_review: self.requires_manual_review,
        }
    }
}

impl StepRowWithId {
    fn try_into_step(self) -> Result<Step, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(Step {
            id,
            name: self.name,
            description: self.description,
            order: self.display_order,
            expires_in_months: self.expires_in_months,
            requires_manual_review: self.requires_manual_review,
        })
    }
}

/// SurrealDB implementation of the Step repository.
#[derive(Clone)]
pub struct SurrealStepRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealStepRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> StepRepository for SurrealStepRepository<C> {
    async fn create(&self, input: CreateStep) -> VetraResult<Step> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('step', $id) SET \
                 name = $name, \
                 description = $description, \
                 display_order = $display_order, \
                 expires_in_months = $expires_in_months, \
                 requires_manual_review = $requires_manual_review",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("display_order", input.order))
            .bind(("expires_in_months", input.expires_in_months))
            .bind(("requires_manual_review", input.requires_manual_review))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<StepRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "step".into(),
            id: id_str,
        })?;

        Ok(row.into_step(id))
    }

    async fn get_by_id(&self, id: Uuid) -> VetraResult<Step> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('step', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StepRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "step".into(),
            id: id_str,
        })?;

        Ok(row.into_step(id))
    }

    async fn list(&self) -> VetraResult<Vec<Step>> {
        let mut result = self
            .db
            .query(
                "SELECT record::id(id) AS record_id, * FROM step \
                 ORDER BY display_order ASC, name ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<StepRowWithId> = result.take(0).map_err(DbError::from)?;

        let steps = rows
            .into_iter()
            .map(|row| row.try_into_step())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(steps)
    }

    async fn get_many(&self, ids: &[Uuid]) -> VetraResult<Vec<Step>> {
        // Resolved one by one so the caller's ordering is preserved;
        // unknown ids are skipped rather than failing the whole batch.
        let mut steps = Vec::with_capacity(ids.len());

        for &id in ids {
            let mut result = self
                .db
                .query("SELECT * FROM type::thing('step', $id)")
                .bind(("id", id.to_string()))
                .await
                .map_err(DbError::from)?;

            let rows: Vec<StepRow> = result.take(0).map_err(DbError::from)?;
            if let Some(row) = rows.into_iter().next() {
                steps.push(row.into_step(id));
            }
        }

        Ok(steps)
    }
}
