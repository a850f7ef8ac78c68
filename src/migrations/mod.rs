// Embedded Diesel migration runner.
// diesel_migrations requires sync connections, so migrations run on a
// blocking task with their own connection.

use diesel::{Connection, PgConnection};
use diesel_migrations::MigrationHarness;
use std::error::Error;
use tracing::{debug, info};

use crate::db::diesel_pool::MIGRATIONS;

/// Whether embedded migrations should run at startup
pub fn should_run_migrations() -> bool {
    std::env::var("DISABLE_EMBEDDED_MIGRATIONS")
        .map(|v| v.to_lowercase() != "true")
        .unwrap_or(true)
}

/// Run all pending migrations; returns how many were applied
pub async fn run_migrations(database_url: String) -> Result<usize, Box<dyn Error + Send + Sync>> {
    info!("Starting migration process...");

    let applied_count =
        tokio::task::spawn_blocking(move || -> Result<usize, Box<dyn Error + Send + Sync>> {
            let mut conn = PgConnection::establish(&database_url)
                .map_err(|e| format!("Failed to establish sync connection: {}", e))?;

            let pending = conn
                .pending_migrations(MIGRATIONS)
                .map_err(|e| format!("Failed to check pending migrations: {}", e))?;

            if pending.is_empty() {
                debug!("No pending migrations found");
                return Ok(0);
            }

            info!("Found {} pending migrations", pending.len());

            let applied = conn
                .run_pending_migrations(MIGRATIONS)
                .map_err(|e| format!("Failed to run migrations: {}", e))?;

            for migration in &applied {
                debug!("Applied migration: {}", migration);
            }

            Ok(applied.len())
        })
        .await
        .map_err(|e| format!("Migration task panicked: {}", e))??;

    info!("Migration process completed, {} applied", applied_count);
    Ok(applied_count)
}
