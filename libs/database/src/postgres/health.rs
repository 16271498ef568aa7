use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::debug;

use crate::common::DatabaseError;

/// `SELECT 1` against the pool, used by the readiness probe
pub async fn check_health(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    let stmt = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_owned());
    db.query_one_raw(stmt)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;

    debug!("PostgreSQL health check passed");
    Ok(())
}
