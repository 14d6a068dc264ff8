use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use headtrack::api::create_api_router;
use headtrack::auth::AuthService;
use headtrack::config::Config;
use headtrack::dimension::{campus::parse_networks, registry};
use headtrack::models::Scope;
use headtrack::storage::{self, CachedStorage, SettingsStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage
    let backend = storage::connect(&config.database).await?;

    info!("Initializing database...");
    backend.init().await?;
    info!("Database initialized successfully");

    let storage: Arc<dyn SettingsStore> = Arc::new(CachedStorage::new(
        backend,
        config.cache.max_entries,
        config.cache.ttl_secs,
    ));
    info!(
        "Settings cache enabled (max entries: {}, ttl: {}s)",
        config.cache.max_entries, config.cache.ttl_secs
    );

    // Build the dimension registry up front so plugin failures show at startup
    for scope in Scope::ALL {
        info!(
            "{} dimension plugins for scope '{}'",
            registry().plugins(scope).count(),
            scope
        );
    }

    let on_campus_networks = parse_networks(&config.tracking.on_campus_ips);
    info!("{} on-campus networks configured", on_campus_networks.len());

    // Initialize auth service
    let auth_service = Arc::new(AuthService::new(
        config.auth.enabled,
        config.auth.api_keys.clone(),
    ));
    if auth_service.is_enabled() {
        info!("🔐 API key authentication enabled");
    } else {
        info!("🔓 Authentication is disabled - all API requests are allowed");
    }

    let api_router = create_api_router(storage, auth_service, on_campus_networks);

    // Start API server
    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("🚀 API server listening on http://{}", api_addr);

    axum::serve(api_listener, api_router).await?;

    Ok(())
}
