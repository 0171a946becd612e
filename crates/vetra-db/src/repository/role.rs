//! SurrealDB implementation of [`RoleRepository`].

use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;
use vetra_core::error::VetraResult;
use vetra_core::models::role::{CreateRole, Role};
use vetra_core::repository::RoleRepository;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, Deserialize)]
struct RoleRow {
    name: String,
    description: Option<String>,
    steps: Vec<String>,
}

/// DB-side row struct that includes the record ID via `record::id(id)`.
#[derive(Debug, Deserialize)]
struct RoleRowWithId {
    record_id: String,
    name: String,
    description: Option<String>,
    steps: Vec<String>,
}

fn parse_step_ids(raw: Vec<String>) -> Result<Vec<Uuid>, DbError> {
    raw.iter()
        .map(|s| {
            Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid step UUID: {e}")))
        })
        .collect()
}

impl RoleRow {
    fn into_role(self, id: Uuid) -> Result<Role, DbError> {
        Ok(Role {
            id,
            name: self.name,
            description: self.description,
            steps: parse_step_ids(self.steps)?,
        })
    }
}

impl RoleRowWithId {
    fn try_into_role(self) -> Result<Role, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(Role {
            id,
            name: self.name,
            description: self.description,
            steps: parse_step_ids(self.steps)?,
        })
    }
}

/// SurrealDB implementation of the Role repository.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: CreateRole) -> VetraResult<Role> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let step_ids: Vec<String> = input.steps.iter().map(|s| s.to_string()).collect();

        let result = self
            .db
            .query(
                "CREATE type::thing('role', $id) SET \
                 name = $name, \
                 description = $description, \
                 steps = $steps",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("steps", step_ids))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> VetraResult<Role> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::thing('role', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id)?)
    }

    async fn list(&self) -> VetraResult<Vec<Role>> {
        let mut result = self
            .db
            .query("SELECT record::id(id) AS record_id, * FROM role ORDER BY name ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let roles = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(roles)
    }
}
