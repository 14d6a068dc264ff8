use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use ipnet::IpNet;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::dimension::registry;
use crate::injector::{HeadBuffer, Injector};
use crate::models::{AnalyticsConfig, RequestContext, Scope};
use crate::storage::{SettingsStore, StorageError};
use crate::tracking::Diagnostics;

pub struct AppState {
    pub storage: Arc<dyn SettingsStore>,
    pub on_campus_networks: Arc<Vec<IpNet>>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DimensionOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub html: String,
    pub diagnostics: Diagnostics,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn not_found(id: i64) -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        format!("Analytics record {id} not found"),
    )
}

fn storage_error(action: &str, e: StorageError) -> ApiError {
    match e {
        StorageError::NotFound(id) => not_found(id),
        StorageError::Settings(e) => {
            error!("Stored analytics settings are invalid: {}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {action}: {e}"),
            )
        }
        StorageError::Other(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to {action}: {e}"),
        ),
    }
}

async fn load(state: &AppState, id: i64) -> Result<AnalyticsConfig, ApiError> {
    match state.storage.get(id).await {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Err(not_found(id)),
        Err(e) => Err(storage_error("get analytics record", e)),
    }
}

async fn validate_and_save(
    state: &AppState,
    config: &AnalyticsConfig,
) -> Result<AnalyticsConfig, ApiError> {
    config
        .validate()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let id = state
        .storage
        .save(config)
        .await
        .map_err(|e| storage_error("save analytics record", e))?;

    load(state, id).await
}

/// List every configured analytics record
pub async fn list_analytics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AnalyticsConfig>>, ApiError> {
    state
        .storage
        .get_all()
        .await
        .map(Json)
        .map_err(|e| storage_error("list analytics records", e))
}

/// Create a new analytics record
pub async fn create_analytics(
    State(state): State<Arc<AppState>>,
    Json(mut payload): Json<AnalyticsConfig>,
) -> Result<(StatusCode, Json<AnalyticsConfig>), ApiError> {
    payload.id = None;
    let created = validate_and_save(&state, &payload).await?;
    info!(id = ?created.id, vendor = %created.vendor, "Created analytics record");

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<AnalyticsConfig>, ApiError> {
    load(&state, id).await.map(Json)
}

/// Replace an existing analytics record
pub async fn update_analytics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(mut payload): Json<AnalyticsConfig>,
) -> Result<Json<AnalyticsConfig>, ApiError> {
    payload.id = Some(id);
    let updated = validate_and_save(&state, &payload).await?;
    info!(id, "Updated analytics record");

    Ok(Json(updated))
}

pub async fn delete_analytics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SuccessResponse>, ApiError> {
    match state.storage.delete(id).await {
        Ok(true) => Ok(Json(SuccessResponse {
            message: "Analytics record deleted successfully".to_string(),
        })),
        Ok(false) => Err(not_found(id)),
        Err(e) => Err(storage_error("delete analytics record", e.into())),
    }
}

/// Flip the enabled flag of a record
pub async fn toggle_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<AnalyticsConfig>, ApiError> {
    let current = load(&state, id).await?;

    match state.storage.set_enabled(id, !current.enabled).await {
        Ok(true) => load(&state, id).await.map(Json),
        Ok(false) => Err(not_found(id)),
        Err(e) => Err(storage_error("update analytics status", e.into())),
    }
}

/// Dimension plugins selectable for a scope, led by the empty option
pub async fn dimension_options(
    Path(scope): Path<String>,
) -> Result<Json<Vec<DimensionOption>>, ApiError> {
    let scope = scope
        .parse::<Scope>()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let options = registry()
        .options_for_scope(scope)
        .into_iter()
        .map(|(value, label)| DimensionOption { value, label })
        .collect();

    Ok(Json(options))
}

/// Render the head fragment for one page request
pub async fn render(
    State(state): State<Arc<AppState>>,
    Json(mut ctx): Json<RequestContext>,
) -> Result<Json<RenderResponse>, ApiError> {
    let records = state
        .storage
        .get_enabled()
        .await
        .map_err(|e| storage_error("load enabled analytics records", e))?;

    ctx.on_campus_networks = state.on_campus_networks.as_ref().clone();

    let mut injector = Injector::new(registry());
    let mut head = HeadBuffer::new();
    let mut diagnostics = Diagnostics::new();
    injector.inject(&records, &ctx, &mut head, &mut diagnostics);

    Ok(Json(RenderResponse {
        html: head.into_string(),
        diagnostics,
    }))
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
