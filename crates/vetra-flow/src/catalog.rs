//! The role and step catalog: read access for every surface, create
//! operations for seeding.

use tracing::info;
use uuid::Uuid;
use vetra_core::error::VetraResult;
use vetra_core::models::role::{CreateRole, Role};
use vetra_core::models::step::{CreateStep, Step};
use vetra_core::repository::{RoleRepository, StepRepository};

/// Catalog service over the role and step repositories.
///
/// Generic over the repository traits so the workflow layer never
/// depends on a concrete database.
pub struct CatalogService<R, S>
where
    R: RoleRepository,
    S: StepRepository,
{
    role_repo: R,
    step_repo: S,
}

impl<R, S> CatalogService<R, S>
where
    R: RoleRepository,
    S: StepRepository,
{
    pub fn new(role_repo: R, step_repo: S) -> Self {
        Self {
            role_repo,
            step_repo,
        }
    }

    /// All roles, ordered by name.
    pub async fn list_roles(&self) -> VetraResult<Vec<Role>> {
        self.role_repo.list().await
    }

    pub async fn get_role(&self, id: Uuid) -> VetraResult<Role> {
        self.role_repo.get_by_id(id).await
    }

    pub async fn list_steps(&self) -> VetraResult<Vec<Step>> {
        self.step_repo.list().await
    }

    pub async fn get_step(&self, id: Uuid) -> VetraResult<Step> {
        self.step_repo.get_by_id(id).await
    }

    /// The role's required steps, in the role's own order. Ids that no
    /// longer resolve are skipped rather than failing the lookup.
    pub async fn steps_for_role(&self, role: &Role) -> VetraResult<Vec<Step>> {
        self.step_repo.get_many(&role.steps).await
    }

    pub async fn create_role(&self, input: CreateRole) -> VetraResult<Role> {
        let role = self.role_repo.create(input).await?;
        info!(role_id = %role.id, name = %role.name, "Role created");
        Ok(role)
    }

    pub async fn create_step(&self, input: CreateStep) -> VetraResult<Step> {
        let step = self.step_repo.create(input).await?;
        info!(step_id = %step.id, name = %step.name, "Step created");
        Ok(step)
    }
}
