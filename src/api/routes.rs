use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use ipnet::IpNet;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{auth_middleware, AuthService};
use crate::storage::SettingsStore;

use super::handlers::{
    create_analytics, delete_analytics, dimension_options, get_analytics, health_check,
    list_analytics, render, toggle_status, update_analytics, AppState,
};

pub fn create_api_router(
    storage: Arc<dyn SettingsStore>,
    auth_service: Arc<AuthService>,
    on_campus_networks: Vec<IpNet>,
) -> Router {
    let state = Arc::new(AppState {
        storage,
        on_campus_networks: Arc::new(on_campus_networks),
    });

    let protected_routes = Router::new()
        .route("/analytics", get(list_analytics).post(create_analytics))
        .route(
            "/analytics/{id}",
            get(get_analytics)
                .put(update_analytics)
                .delete(delete_analytics),
        )
        .route("/analytics/{id}/status", post(toggle_status))
        .route("/dimensions/{scope}", get(dimension_options))
        .route("/render", post(render))
        .route_layer(middleware::from_fn(move |headers, req, next| {
            let auth = Arc::clone(&auth_service);
            auth_middleware(auth, headers, req, next)
        }))
        .with_state(Arc::clone(&state));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
