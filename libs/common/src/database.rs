//! Database module for handling PostgreSQL connections and operations
//!
//! This module provides connection pooling, configuration, migrations and
//! health checks for the PostgreSQL database. The pool is created once at
//! startup, handed to every repository, and closed explicitly at shutdown.

use crate::error::{DatabaseError, DatabaseResult};
use sqlx::{
    PgPool,
    migrate::Migrator,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use std::time::Duration;
use tracing::{error, info};

/// Default maximum number of pooled connections
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default minimum number of pooled connections
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;

/// Default time to wait for a free connection, in seconds
pub const DEFAULT_ACQUIRE_TIMEOUT: u64 = 30;

/// Database configuration struct
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections in the pool
    pub min_connections: u32,
    /// Acquire timeout in seconds
    pub acquire_timeout: u64,
}

impl DatabaseConfig {
    /// Create a configuration for `database_url` with default pool sizing
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    /// Override the maximum pool size
    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self.min_connections = self.min_connections.min(self.max_connections);
        self
    }

    fn connect_options(&self) -> DatabaseResult<PgConnectOptions> {
        self.database_url
            .parse()
            .map_err(|e| DatabaseError::Configuration(format!("Invalid database URL: {}", e)))
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout))
    }
}

/// Initialize a PostgreSQL connection pool
///
/// # Arguments
///
/// * `config` - Database configuration
///
/// # Returns
///
/// * `DatabaseResult<PgPool>` - PostgreSQL connection pool or error
pub async fn init_pool(config: &DatabaseConfig) -> DatabaseResult<PgPool> {
    info!("Initializing database connection pool");

    let options = config.connect_options()?;
    let pool = config
        .pool_options()
        .connect_with(options)
        .await
        .map_err(DatabaseError::Connection)?;

    info!(
        max_connections = config.max_connections,
        "Database connection pool initialized successfully"
    );
    Ok(pool)
}

/// Build a pool that only connects when a query first needs a connection.
///
/// Useful for wiring an application together in tests that never touch the
/// database.
pub fn init_lazy_pool(config: &DatabaseConfig) -> DatabaseResult<PgPool> {
    let options = config.connect_options()?;
    Ok(config.pool_options().connect_lazy_with(options))
}

/// Check database connectivity
///
/// # Arguments
///
/// * `pool` - PostgreSQL connection pool
///
/// # Returns
///
/// * `DatabaseResult<bool>` - True if connection is successful
pub async fn health_check(pool: &PgPool) -> DatabaseResult<bool> {
    sqlx::query("SELECT 1").execute(pool).await.map_err(|e| {
        error!("Database health check failed: {}", e);
        DatabaseError::Query(e)
    })?;

    Ok(true)
}

/// Apply every pending migration of `migrator`
pub async fn run_migrations(pool: &PgPool, migrator: &Migrator) -> DatabaseResult<()> {
    migrator
        .run(pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    info!("Database migrations applied");
    Ok(())
}

/// Close the pool, waiting for checked-out connections to be returned
pub async fn close_pool(pool: &PgPool) {
    pool.close().await;
    info!("Database connection pool closed");
}
