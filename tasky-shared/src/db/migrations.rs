/// Database migration runner
///
/// Runs the SQL migrations embedded from the workspace-level `migrations/`
/// directory using sqlx's migration system. Each migration is a single
/// `{version}_{name}.sql` file applied in order and tracked in the
/// `_sqlx_migrations` table.
///
/// # Example
///
/// ```no_run
/// use tasky_shared::db::pool::{create_pool, DatabaseConfig};
/// use tasky_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending database migrations
///
/// # Errors
///
/// Returns an error if a migration fails to apply or the connection is
/// lost mid-run. Failed migrations are rolled back where Postgres allows.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    let migrations = sqlx::migrate!("../migrations");

    match migrations.run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
