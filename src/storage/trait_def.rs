use crate::models::{AnalyticsConfig, SettingsError};
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("analytics record {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Initialize the storage (create tables)
    async fn init(&self) -> Result<()>;

    /// Get one analytics record by id
    async fn get(&self, id: i64) -> StorageResult<Option<AnalyticsConfig>>;

    /// All records ordered by id
    async fn get_all(&self) -> StorageResult<Vec<AnalyticsConfig>>;

    /// Enabled records ordered by id; this is what gets injected
    async fn get_enabled(&self) -> StorageResult<Vec<AnalyticsConfig>>;

    /// Insert when `config.id` is `None`, update otherwise. Returns the id.
    async fn save(&self, config: &AnalyticsConfig) -> StorageResult<i64>;

    /// Flip the enabled flag. Returns false when the record does not exist.
    async fn set_enabled(&self, id: i64, enabled: bool) -> Result<bool>;

    async fn delete(&self, id: i64) -> Result<bool>;
}
