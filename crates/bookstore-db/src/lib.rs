//! # Bookstore DB
//!
//! PostgreSQL connection pool and embedded migrations for the bookstore API.
//!
//! # Example
//!
//! ```ignore
//! use bookstore_db::{init_db_pool, run_migrations};
//!
//! let url = std::env::var("DATABASE_URL")?;
//! let pool = init_db_pool(&url, 10).await?;
//! run_migrations(&pool).await?;
//! ```

use std::time::Duration;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;

pub use sqlx::PgPool;

/// Schema migrations shipped in the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Opens a PostgreSQL connection pool.
///
/// Should be called once during startup; the returned pool is cheaply
/// cloneable and is shared by every store handle.
///
/// # Errors
///
/// Returns the underlying [`sqlx::Error`] when the URL is invalid or the
/// server cannot be reached within the acquire timeout.
pub async fn init_db_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    tracing::info!(max_connections, "Database pool initialized");
    Ok(pool)
}

/// Applies any pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
