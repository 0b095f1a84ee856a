//! PostgreSQL persistence for the Load phase.
//!
//! Connection pooling, schema migrations, and the per-table repositories
//! that perform the transactional bulk insert described in the pipeline's
//! Load stage.

pub mod error;
mod migrations;
pub mod repositories;
pub mod schema;

pub use error::PostgresError;
pub use sqlx::PgPool;

use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::log::LevelFilter;

use crate::core::config::DatabaseConfig;

/// Owns the connection pool used by every repository in this module.
/// Created once per run and shared across the Load phase.
pub struct PostgresService {
    pool: PgPool,
}

impl PostgresService {
    pub async fn init(config: &DatabaseConfig) -> Result<Self, PostgresError> {
        if config.url.is_empty() {
            return Err(PostgresError::Config("database URL is required".into()));
        }

        let max_connections = config.resolved_max_connections();
        let min_connections = config.resolved_min_connections();
        let acquire_timeout = config.resolved_acquire_timeout_secs();
        let idle_timeout = config.resolved_idle_timeout_secs();
        let max_lifetime = config.resolved_max_lifetime_secs();
        let statement_timeout = config.resolved_statement_timeout_secs();

        let mut options: PgConnectOptions = config
            .url
            .parse()
            .map_err(|e| PostgresError::Config(format!("invalid database URL: {}", e)))?;

        options = options.log_statements(LevelFilter::Trace);
        if statement_timeout > 0 {
            options = options.options([("statement_timeout", format!("{}s", statement_timeout))]);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout))
            .idle_timeout(Duration::from_secs(idle_timeout))
            .max_lifetime(Duration::from_secs(max_lifetime))
            .connect_with(options)
            .await?;

        migrations::run_migrations(&pool).await?;

        tracing::debug!(
            max_connections,
            min_connections,
            acquire_timeout_secs = acquire_timeout,
            idle_timeout_secs = idle_timeout,
            max_lifetime_secs = max_lifetime,
            statement_timeout_secs = statement_timeout,
            "PostgresService initialized"
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("PostgreSQL pool closed");
    }
}

#[cfg(test)]
mod tests {
    // Exercised as integration tests against a running PostgreSQL instance.
}
