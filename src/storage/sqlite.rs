use crate::models::{AnalyticsConfig, AnalyticsRecord};
use crate::storage::{SettingsStore, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

const SELECT_COLUMNS: &str = r#"
    SELECT id, enabled, vendor_type, site_id, site_url, track_admin,
           masquerade_handling, clean_url, image_track, use_dimensions, dimensions
    FROM analytics
"#;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn fetch(&self, filter: &str) -> StorageResult<Vec<AnalyticsConfig>> {
        let records = sqlx::query_as::<_, AnalyticsRecord>(&format!(
            "{SELECT_COLUMNS} {filter} ORDER BY id ASC"
        ))
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        records
            .into_iter()
            .map(|record| AnalyticsConfig::try_from(record).map_err(StorageError::from))
            .collect()
    }
}

#[async_trait]
impl SettingsStore for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS analytics (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                enabled INTEGER NOT NULL DEFAULT 1,
                vendor_type TEXT NOT NULL DEFAULT 'piwik',
                site_id TEXT NOT NULL DEFAULT '1',
                site_url TEXT,
                track_admin INTEGER NOT NULL DEFAULT 0,
                masquerade_handling INTEGER NOT NULL DEFAULT 1,
                clean_url INTEGER NOT NULL DEFAULT 1,
                image_track INTEGER NOT NULL DEFAULT 1,
                use_dimensions INTEGER NOT NULL DEFAULT 0,
                dimensions TEXT
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_analytics_enabled ON analytics(enabled)")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn get(&self, id: i64) -> StorageResult<Option<AnalyticsConfig>> {
        let record = sqlx::query_as::<_, AnalyticsRecord>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(|e| StorageError::Other(e.into()))?;

        record
            .map(AnalyticsConfig::try_from)
            .transpose()
            .map_err(StorageError::from)
    }

    async fn get_all(&self) -> StorageResult<Vec<AnalyticsConfig>> {
        self.fetch("").await
    }

    async fn get_enabled(&self) -> StorageResult<Vec<AnalyticsConfig>> {
        self.fetch("WHERE enabled = 1").await
    }

    async fn save(&self, config: &AnalyticsConfig) -> StorageResult<i64> {
        let dimensions = config.dimensions_blob()?;

        match config.id {
            None => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO analytics (enabled, vendor_type, site_id, site_url, track_admin,
                        masquerade_handling, clean_url, image_track, use_dimensions, dimensions)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(config.enabled as i32)
                .bind(&config.vendor)
                .bind(&config.site_id)
                .bind(config.site_url.as_deref())
                .bind(config.track_admin as i32)
                .bind(config.masquerade_handling as i32)
                .bind(config.clean_url as i32)
                .bind(config.image_track as i32)
                .bind(config.use_dimensions as i32)
                .bind(dimensions)
                .execute(self.pool.as_ref())
                .await
                .map_err(|e| StorageError::Other(e.into()))?;

                Ok(result.last_insert_rowid())
            }
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE analytics
                    SET enabled = ?, vendor_type = ?, site_id = ?, site_url = ?, track_admin = ?,
                        masquerade_handling = ?, clean_url = ?, image_track = ?,
                        use_dimensions = ?, dimensions = ?
                    WHERE id = ?
                    "#,
                )
                .bind(config.enabled as i32)
                .bind(&config.vendor)
                .bind(&config.site_id)
                .bind(config.site_url.as_deref())
                .bind(config.track_admin as i32)
                .bind(config.masquerade_handling as i32)
                .bind(config.clean_url as i32)
                .bind(config.image_track as i32)
                .bind(config.use_dimensions as i32)
                .bind(dimensions)
                .bind(id)
                .execute(self.pool.as_ref())
                .await
                .map_err(|e| StorageError::Other(e.into()))?;

                if result.rows_affected() == 0 {
                    return Err(StorageError::NotFound(id));
                }
                Ok(id)
            }
        }
    }

    async fn set_enabled(&self, id: i64, enabled: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE analytics SET enabled = ? WHERE id = ?")
            .bind(enabled as i32)
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM analytics WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
