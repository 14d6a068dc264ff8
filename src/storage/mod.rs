pub mod cached;
pub mod postgres;
pub mod sqlite;
pub mod trait_def;

pub use cached::CachedStorage;
pub use postgres::PostgresStorage;
pub use sqlite::SqliteStorage;
pub use trait_def::{SettingsStore, StorageError, StorageResult};

use crate::config::{DatabaseBackend, DatabaseConfig};
use std::sync::Arc;

/// Open the configured backend. Tables are created by `init`.
pub async fn connect(database: &DatabaseConfig) -> anyhow::Result<Arc<dyn SettingsStore>> {
    let storage: Arc<dyn SettingsStore> = match database.backend {
        DatabaseBackend::Sqlite => {
            tracing::info!("Using SQLite storage: {}", database.url);
            Arc::new(SqliteStorage::new(&database.url, database.max_connections).await?)
        }
        DatabaseBackend::Postgres => {
            tracing::info!("Using PostgreSQL storage: {}", database.url);
            Arc::new(PostgresStorage::new(&database.url, database.max_connections).await?)
        }
    };
    Ok(storage)
}
