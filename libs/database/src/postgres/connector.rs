use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use super::PostgresConfig;
use crate::common::{RetryConfig, retry_with_backoff};

/// Retries with exponential backoff so the API can start before the database is up
pub async fn connect_from_config_with_retry(
    config: PostgresConfig,
    retry_config: Option<RetryConfig>,
) -> Result<DatabaseConnection, DbErr> {
    let options = config.into_connect_options();
    retry_with_backoff(
        || connect_with_options(options.clone()),
        retry_config.unwrap_or_default(),
    )
    .await
}

async fn connect_with_options(options: ConnectOptions) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(options).await?;
    info!("Connected to PostgreSQL");
    Ok(db)
}

/// Apply all pending migrations of `M`
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> Result<(), DbErr> {
    info!("Running {} database migrations", app_name);
    M::up(db, None).await?;
    info!("Migrations completed for {}", app_name);
    Ok(())
}
