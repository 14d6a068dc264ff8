use crate::models::AnalyticsConfig;
use crate::storage::{SettingsStore, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Listing {
    All,
    Enabled,
}

/// Cached storage wrapper. Every page render reads the enabled records, so
/// reads are served from memory and any write drops the cached state.
pub struct CachedStorage {
    /// Underlying storage implementation
    inner: Arc<dyn SettingsStore>,
    /// Single record lookups by id
    record_cache: Cache<i64, Option<AnalyticsConfig>>,
    /// `get_all` and `get_enabled` results
    list_cache: Cache<Listing, Arc<Vec<AnalyticsConfig>>>,
}

impl CachedStorage {
    pub fn new(inner: Arc<dyn SettingsStore>, max_cache_entries: u64, ttl_secs: u64) -> Self {
        let record_cache = Cache::builder()
            .max_capacity(max_cache_entries)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        let list_cache = Cache::builder()
            .max_capacity(2)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            inner,
            record_cache,
            list_cache,
        }
    }

    /// Drop everything derived from the table after a write
    async fn invalidate(&self, id: i64) {
        self.record_cache.invalidate(&id).await;
        self.list_cache.invalidate_all();
    }

    async fn listing(&self, listing: Listing) -> StorageResult<Vec<AnalyticsConfig>> {
        if let Some(cached) = self.list_cache.get(&listing).await {
            return Ok(cached.as_ref().clone());
        }

        let records = match listing {
            Listing::All => self.inner.get_all().await?,
            Listing::Enabled => self.inner.get_enabled().await?,
        };

        self.list_cache
            .insert(listing, Arc::new(records.clone()))
            .await;

        Ok(records)
    }
}

#[async_trait]
impl SettingsStore for CachedStorage {
    async fn init(&self) -> Result<()> {
        self.inner.init().await
    }

    async fn get(&self, id: i64) -> StorageResult<Option<AnalyticsConfig>> {
        // Try to get from cache first
        if let Some(cached) = self.record_cache.get(&id).await {
            return Ok(cached);
        }

        let result = self.inner.get(id).await?;
        self.record_cache.insert(id, result.clone()).await;

        Ok(result)
    }

    async fn get_all(&self) -> StorageResult<Vec<AnalyticsConfig>> {
        self.listing(Listing::All).await
    }

    async fn get_enabled(&self) -> StorageResult<Vec<AnalyticsConfig>> {
        self.listing(Listing::Enabled).await
    }

    async fn save(&self, config: &AnalyticsConfig) -> StorageResult<i64> {
        let id = self.inner.save(config).await?;
        self.invalidate(id).await;

        Ok(id)
    }

    async fn set_enabled(&self, id: i64, enabled: bool) -> Result<bool> {
        let result = self.inner.set_enabled(id, enabled).await?;

        if result {
            self.invalidate(id).await;
        }

        Ok(result)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = self.inner.delete(id).await?;

        if result {
            self.invalidate(id).await;
        }

        Ok(result)
    }
}
