//! Embedded schema migrations
//!
//! Files under `migrations/` are compiled in by `sqlx::migrate!` and applied
//! in version order. sqlx records each applied version with its checksum in
//! `_sqlx_migrations`, takes an advisory lock so concurrently starting
//! instances apply each file exactly once, and refuses to start if an
//! already-applied file has been edited.

use sqlx::PgPool;
use sqlx::migrate::{MigrateError, Migrator};
use tracing::{error, info};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply pending migrations.
pub async fn run(pool: &PgPool) -> Result<(), MigrateError> {
    if let Err(e) = MIGRATOR.run(pool).await {
        error!(error = %e, "Migration failed");
        return Err(e);
    }
    info!(known = MIGRATOR.iter().count(), "Migrations up to date");
    Ok(())
}
