//! Vetra Server — Application entry point.

use tracing_subscriber::EnvFilter;
use vetra_db::repository::{SurrealRoleRepository, SurrealStepRepository};
use vetra_db::{run_migrations, DbConfig, DbManager};
use vetra_flow::CatalogService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local overrides from a .env file, ignored when absent.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("vetra=info".parse().unwrap()))
        .json()
        .init();

    tracing::info!("Starting Vetra server...");

    let config = DbConfig::from_env();
    let manager = DbManager::connect(&config).await?;
    run_migrations(manager.client()).await?;

    let catalog = CatalogService::new(
        SurrealRoleRepository::new(manager.client().clone()),
        SurrealStepRepository::new(manager.client().clone()),
    );
    let roles = catalog.list_roles().await?;
    tracing::info!(roles = roles.len(), "Vetra server ready.");

    tokio::signal::ctrl_c().await?;

    tracing::info!("Vetra server stopped.");
    Ok(())
}
