//! SurrealDB implementation of [`ProfileRepository`].
//!
//! The profile id comes from the external identity provider, so
//! `create` never generates one. The system role is embedded on the
//! profile row; there is no separate permission table.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use surrealdb::{Connection, Surreal};
use uuid::Uuid;
use vetra_core::error::VetraResult;
use vetra_core::models::profile::{CreateProfile, SystemRole, UpdateProfile, UserProfile};
use vetra_core::repository::{PaginatedResult, Pagination, ProfileRepository};

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, Deserialize)]
struct ProfileRow {
    email: String,
    name: String,
    system_role: String,
    role_ids: Vec<String>,
    created_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `record::id(id)`.
#[derive(Debug, Deserialize)]
struct ProfileRowWithId {
    record_id: String,
    email: String,
    name: String,
    system_role: String,
    role_ids: Vec<String>,
    created_at: DateTime<Utc>,
}

/// Row struct for count queries.
#[derive(Debug, Deserialize)]
struct CountRow {
    total: u64,
}

fn parse_system_role(s: &str) -> Result<SystemRole, DbError> {
    match s {
        "volunteer" => Ok(SystemRole::Volunteer),
        "supervisor" => Ok(SystemRole::Supervisor),
        "manager" => Ok(SystemRole::Manager),
        other => Err(DbError::Decode(format!("unknown system role: {other}"))),
    }
}

fn system_role_to_str(role: SystemRole) -> &'static str {
    match role {
        SystemRole::Volunteer => "volunteer",
        SystemRole::Supervisor => "supervisor",
        SystemRole::Manager => "manager",
    }
}

fn parse_role_ids(raw: Vec<String>) -> Result<Vec<Uuid>, DbError> {
    raw.iter()
        .map(|s| {
            Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid role UUID: {e}")))
        })
        .collect()
}

impl ProfileRow {
    fn into_profile(self, id: Uuid) -> Result<UserProfile, DbError> {
        Ok(UserProfile {
            id,
            email: self.email,
            name: self.name,
            system_role: parse_system_role(&self.system_role)?,
            role_ids: parse_role_ids(self.role_ids)?,
            created_at: self.created_at,
        })
    }
}

impl ProfileRowWithId {
    fn try_into_profile(self) -> Result<UserProfile, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(UserProfile {
            id,
            email: self.email,
            name: self.name,
            system_role: parse_system_role(&self.system_role)?,
            role_ids: parse_role_ids(self.role_ids)?,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Profile repository.
#[derive(Clone)]
pub struct SurrealProfileRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProfileRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProfileRepository for SurrealProfileRepository<C> {
    async fn create(&self, input: CreateProfile) -> VetraResult<UserProfile> {
        let id = input.id;
        let id_str = id.to_string();
        let role_ids: Vec<String> = input.role_ids.iter().map(|r| r.to_string()).collect();

        let result = self
            .db
            .query(
                "CREATE type::thing('user', $id) SET \
                 email = $email, \
                 name = $name, \
                 system_role = $system_role, \
                 role_ids = $role_ids",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("name", input.name))
            .bind(("system_role", system_role_to_str(input.system_role).to_string()))
            .bind(("role_ids", role_ids))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_profile(id)?)
    }

    async fn find(&self, id: Uuid) -> VetraResult<Option<UserProfile>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::thing('user', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_profile(id)?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: Uuid, input: UpdateProfile) -> VetraResult<UserProfile> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.system_role.is_some() {
            sets.push("system_role = $system_role");
        }
        if input.role_ids.is_some() {
            sets.push("role_ids = $role_ids");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::thing('user', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(system_role) = input.system_role {
            builder = builder.bind(("system_role", system_role_to_str(system_role).to_string()));
        }
        if let Some(role_ids) = input.role_ids {
            let role_ids: Vec<String> = role_ids.iter().map(|r| r.to_string()).collect();
            builder = builder.bind(("role_ids", role_ids));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_profile(id)?)
    }

    async fn delete(&self, id: Uuid) -> VetraResult<()> {
        self.db
            .query("DELETE type::thing('user', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> VetraResult<PaginatedResult<UserProfile>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM user GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT record::id(id) AS record_id, * FROM user \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_profile())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
