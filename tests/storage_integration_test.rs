//! Integration tests for the settings store
//!
//! Tests can be filtered by database backend using the DATABASE_BACKEND environment variable:
//! - `DATABASE_BACKEND=sqlite cargo test` - Run only SQLite tests
//! - `DATABASE_BACKEND=postgres cargo test` - Run only PostgreSQL tests
//! - By default, both backends are tested (PostgreSQL only when DATABASE_URL is set)

use headtrack::models::{AnalyticsConfig, DimensionBinding, Scope};
use headtrack::storage::{
    CachedStorage, PostgresStorage, SettingsStore, SqliteStorage, StorageError,
};
use std::sync::Arc;

/// Get the database backend to test from environment variable
fn should_test_backend(backend: &str) -> bool {
    match std::env::var("DATABASE_BACKEND") {
        Ok(val) => val.to_lowercase() == backend.to_lowercase(),
        Err(_) => true, // Test all backends if not specified
    }
}

/// Helper to create SQLite test storage
async fn create_sqlite_storage() -> Arc<dyn SettingsStore> {
    let storage = SqliteStorage::new("sqlite::memory:", 5).await.unwrap();
    storage.init().await.unwrap();
    Arc::new(storage)
}

/// Helper to create PostgreSQL test storage
async fn create_postgres_storage() -> Option<Arc<dyn SettingsStore>> {
    let db_url = std::env::var("DATABASE_URL").ok()?;
    if !db_url.starts_with("postgres") {
        return None;
    }
    let storage = PostgresStorage::new(&db_url, 5).await.ok()?;
    storage.init().await.ok()?;
    Some(Arc::new(storage))
}

fn piwik(site_id: &str) -> AnalyticsConfig {
    let mut config = AnalyticsConfig {
        site_id: site_id.to_string(),
        site_url: Some("stats.example.org".to_string()),
        use_dimensions: true,
        ..AnalyticsConfig::default()
    };
    config.dimensions.insert(
        Scope::Visit,
        vec![
            DimensionBinding::new("2468", "user_name"),
            DimensionBinding::new("", ""),
        ],
    );
    config.dimensions.insert(
        Scope::Action,
        vec![DimensionBinding::new("1357", "course_full_name")],
    );
    config
}

fn google(vendor: &str, site_id: &str) -> AnalyticsConfig {
    AnalyticsConfig {
        vendor: vendor.to_string(),
        site_id: site_id.to_string(),
        ..AnalyticsConfig::default()
    }
}

async fn exercise_crud(storage: Arc<dyn SettingsStore>) {
    let id = storage.save(&piwik("2468")).await.unwrap();

    let stored = storage.get(id).await.unwrap().unwrap();
    assert_eq!(stored.id, Some(id));
    assert_eq!(stored.vendor, "piwik");
    assert_eq!(stored.site_url.as_deref(), Some("stats.example.org"));
    assert_eq!(stored.dimensions, piwik("2468").dimensions);

    let mut updated = stored.clone();
    updated.site_id = "9".to_string();
    updated.dimensions.clear();
    assert_eq!(storage.save(&updated).await.unwrap(), id);

    let reloaded = storage.get(id).await.unwrap().unwrap();
    assert_eq!(reloaded.site_id, "9");
    assert!(reloaded.dimensions.is_empty());

    assert!(storage.delete(id).await.unwrap());
    assert!(storage.get(id).await.unwrap().is_none());
    assert!(!storage.delete(id).await.unwrap());
}

async fn exercise_enabled_filter(storage: Arc<dyn SettingsStore>) {
    let first = storage.save(&piwik("1")).await.unwrap();
    let second = storage
        .save(&google("guniversal", "UA-1-1"))
        .await
        .unwrap();
    let third = storage
        .save(&google("ganalytics", "UA-2-2"))
        .await
        .unwrap();

    assert!(storage.set_enabled(second, false).await.unwrap());

    let enabled: Vec<i64> = storage
        .get_enabled()
        .await
        .unwrap()
        .into_iter()
        .filter_map(|config| config.id)
        .collect();
    assert_eq!(enabled, vec![first, third]);

    let all: Vec<i64> = storage
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .filter_map(|config| config.id)
        .collect();
    assert_eq!(all, vec![first, second, third]);

    assert!(!storage.set_enabled(9999, true).await.unwrap());
}

#[tokio::test]
async fn test_crud_sqlite() {
    if !should_test_backend("sqlite") {
        return;
    }
    exercise_crud(create_sqlite_storage().await).await;
}

#[tokio::test]
async fn test_enabled_filter_sqlite() {
    if !should_test_backend("sqlite") {
        return;
    }
    exercise_enabled_filter(create_sqlite_storage().await).await;
}

#[tokio::test]
async fn test_crud_postgres() {
    if !should_test_backend("postgres") {
        return;
    }
    let Some(storage) = create_postgres_storage().await else {
        return;
    };
    exercise_crud(storage).await;
}

#[tokio::test]
async fn test_update_missing_record_is_not_found() {
    let storage = create_sqlite_storage().await;
    let mut config = piwik("1");
    config.id = Some(42);

    let err = storage.save(&config).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(42)));
}

#[tokio::test]
async fn test_cached_storage_invalidates_on_writes() {
    let inner = create_sqlite_storage().await;
    let cached: Arc<dyn SettingsStore> =
        Arc::new(CachedStorage::new(Arc::clone(&inner), 100, 300));

    let id = cached.save(&piwik("1")).await.unwrap();
    assert_eq!(cached.get_enabled().await.unwrap().len(), 1);

    // A write behind the cache's back is not seen until the entry expires
    inner.set_enabled(id, false).await.unwrap();
    assert_eq!(cached.get_enabled().await.unwrap().len(), 1);

    // Writes through the cache drop the cached listings and record
    cached.set_enabled(id, false).await.unwrap();
    assert!(cached.get_enabled().await.unwrap().is_empty());
    assert!(!cached.get(id).await.unwrap().unwrap().enabled);

    cached.set_enabled(id, true).await.unwrap();
    let mut config = cached.get(id).await.unwrap().unwrap();
    assert!(config.enabled);

    config.site_id = "77".to_string();
    cached.save(&config).await.unwrap();
    assert_eq!(cached.get(id).await.unwrap().unwrap().site_id, "77");
    assert_eq!(cached.get_all().await.unwrap()[0].site_id, "77");

    cached.delete(id).await.unwrap();
    assert!(cached.get(id).await.unwrap().is_none());
    assert!(cached.get_all().await.unwrap().is_empty());
}
