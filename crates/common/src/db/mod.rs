//! Database layer for Inkpress
//!
//! Provides:
//! - SeaORM entity models
//! - Repository traits and their SeaORM and in-memory implementations
//! - Connection pool management
//! - Schema bootstrap

mod memory;
pub mod models;
mod repository;
mod store;

pub use memory::MemoryStore;
pub use repository::{ArticleRepository, CategoryRepository, TagRepository};
pub use store::SqlStore;

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use models::{ArticleEntity, ArticleTagEntity, CategoryEntity, TagEntity};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::time::Duration;
use tracing::info;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    /// Primary connection (for writes)
    pub primary: DatabaseConnection,

    /// Read replica connection (optional)
    pub replica: Option<DatabaseConnection>,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to primary database...");

        let primary = Database::connect(connect_options(&config.url, config))
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect to primary: {}", e),
            })?;

        let replica = match config.read_url {
            Some(ref read_url) => {
                info!("Connecting to read replica...");

                let replica_conn = Database::connect(connect_options(read_url, config))
                    .await
                    .map_err(|e| AppError::DatabaseConnection {
                        message: format!("Failed to connect to replica: {}", e),
                    })?;

                Some(replica_conn)
            }
            None => None,
        };

        info!("Database connections established");

        Ok(Self { primary, replica })
    }

    /// Get the connection for reads (replica if available, otherwise primary)
    pub fn read(&self) -> &DatabaseConnection {
        self.replica.as_ref().unwrap_or(&self.primary)
    }

    /// Get the connection for writes (always primary)
    pub fn write(&self) -> &DatabaseConnection {
        &self.primary
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.primary
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Primary ping failed: {}", e),
            })?;

        if let Some(ref replica) = self.replica {
            replica
                .execute_unprepared("SELECT 1")
                .await
                .map_err(|e| AppError::DatabaseConnection {
                    message: format!("Replica ping failed: {}", e),
                })?;
        }

        Ok(())
    }

    /// Create any missing content tables on the primary
    ///
    /// Tables are created parents first so foreign keys resolve.
    pub async fn ensure_schema(&self) -> Result<()> {
        let conn = self.write();
        let backend = conn.get_database_backend();
        let schema = Schema::new(backend);

        let mut statements = vec![
            schema.create_table_from_entity(CategoryEntity),
            schema.create_table_from_entity(TagEntity),
            schema.create_table_from_entity(ArticleEntity),
            schema.create_table_from_entity(ArticleTagEntity),
        ];

        for statement in statements.iter_mut() {
            statement.if_not_exists();
            conn.execute(backend.build(&*statement)).await?;
        }

        info!("Database schema ensured");
        Ok(())
    }
}

fn connect_options(url: &str, config: &DatabaseConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .sqlx_logging(true);
    options
}


#[cfg(test)]
mod tests {
    use super::testing::sqlite_pool;

    #[tokio::test]
    async fn test_ping_and_idempotent_schema() {
        let pool = sqlite_pool().await;
        pool.ping().await.unwrap();
        pool.ensure_schema().await.unwrap();
    }
}
