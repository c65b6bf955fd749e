//! REST API handlers
//!
//! CRUD endpoints for generator configs plus the run endpoints. These
//! are thin data-entry plumbing over the repositories; all of the
//! interesting control flow lives in the run engine.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::adapters::run_engine::RunEngine;
use crate::domain::auth::AuthContext;
use crate::domain::{ConfigData, Field, GeneratorConfig, Run, RunSettings};
use crate::persistence::{ConfigRepository, RunRepository};

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub configs: Arc<dyn ConfigRepository>,
    pub runs: Arc<dyn RunRepository>,
    pub engine: Arc<RunEngine>,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

/// Body of config create/update requests
#[derive(Deserialize)]
pub struct ConfigRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<Field>,
    #[serde(default)]
    pub destination: Option<Value>,
}

impl ConfigRequest {
    fn into_data(self) -> (String, ConfigData) {
        (
            self.name,
            ConfigData {
                fields: self.fields,
                description: self.description,
                destination: self.destination,
                status: Some("active".to_string()),
            },
        )
    }
}

/// Reject schemas with empty or duplicate field names. Generation
/// tolerates duplicates (later wins), but accepting them here would
/// silently drop a column from every record.
fn validate_fields(fields: &[Field]) -> Result<(), String> {
    let mut seen = std::collections::HashSet::new();
    for field in fields {
        if field.name.trim().is_empty() {
            return Err("Field names must not be empty".to_string());
        }
        if !seen.insert(field.name.as_str()) {
            return Err(format!("Duplicate field name: '{}'", field.name));
        }
    }
    Ok(())
}

/// Resolve the caller identity from the auth context, if any.
///
/// When auth is disabled no middleware runs and no context is present;
/// everything is attributed to a single local identity.
fn caller_id(auth: Option<&AuthContext>) -> String {
    auth.and_then(|ctx| ctx.user_id.clone())
        .unwrap_or_else(|| "local".to_string())
}

// ============================================================================
// Health
// ============================================================================

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ============================================================================
// Config CRUD
// ============================================================================

pub async fn list_configs(
    State(state): State<ApiState>,
    auth: Option<Extension<AuthContext>>,
) -> impl IntoResponse {
    let owner = caller_id(auth.as_deref());
    match state.configs.list_by_owner(&owner).await {
        Ok(configs) => (StatusCode::OK, Json(ApiResponse::success(configs))),
        Err(e) => (
            e.status_code(),
            Json(ApiResponse::<Vec<GeneratorConfig>>::error(e.to_string())),
        ),
    }
}

pub async fn create_config(
    State(state): State<ApiState>,
    auth: Option<Extension<AuthContext>>,
    Json(request): Json<ConfigRequest>,
) -> impl IntoResponse {
    if let Err(message) = validate_fields(&request.fields) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<GeneratorConfig>::error(message)),
        );
    }

    let owner = caller_id(auth.as_deref());
    let (name, data) = request.into_data();
    match state.configs.create(&name, &owner, &data).await {
        Ok(config) => (StatusCode::CREATED, Json(ApiResponse::success(config))),
        Err(e) => (
            e.status_code(),
            Json(ApiResponse::<GeneratorConfig>::error(e.to_string())),
        ),
    }
}

pub async fn get_config(
    State(state): State<ApiState>,
    auth: Option<Extension<AuthContext>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let owner = caller_id(auth.as_deref());
    match state.configs.get(&id).await {
        Ok(Some(config)) if config.owner_id == owner => {
            (StatusCode::OK, Json(ApiResponse::success(config)))
        }
        Ok(Some(_)) => (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<GeneratorConfig>::error(
                "Caller does not own this config",
            )),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<GeneratorConfig>::error(format!(
                "Configuration not found: '{}'",
                id
            ))),
        ),
        Err(e) => (
            e.status_code(),
            Json(ApiResponse::<GeneratorConfig>::error(e.to_string())),
        ),
    }
}

pub async fn update_config(
    State(state): State<ApiState>,
    auth: Option<Extension<AuthContext>>,
    Path(id): Path<String>,
    Json(request): Json<ConfigRequest>,
) -> impl IntoResponse {
    if let Err(message) = validate_fields(&request.fields) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<GeneratorConfig>::error(message)),
        );
    }

    let owner = caller_id(auth.as_deref());
    match state.configs.get(&id).await {
        Ok(Some(existing)) if existing.owner_id == owner => {
            let (name, data) = request.into_data();
            match state.configs.update(&id, &name, &data).await {
                Ok(config) => (StatusCode::OK, Json(ApiResponse::success(config))),
                Err(e) => (
                    e.status_code(),
                    Json(ApiResponse::<GeneratorConfig>::error(e.to_string())),
                ),
            }
        }
        Ok(Some(_)) => (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<GeneratorConfig>::error(
                "Caller does not own this config",
            )),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<GeneratorConfig>::error(format!(
                "Configuration not found: '{}'",
                id
            ))),
        ),
        Err(e) => (
            e.status_code(),
            Json(ApiResponse::<GeneratorConfig>::error(e.to_string())),
        ),
    }
}

pub async fn delete_config(
    State(state): State<ApiState>,
    auth: Option<Extension<AuthContext>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let owner = caller_id(auth.as_deref());
    match state.configs.get(&id).await {
        Ok(Some(existing)) if existing.owner_id == owner => {
            match state.configs.delete(&id).await {
                Ok(_) => (StatusCode::OK, Json(ApiResponse::ok())),
                Err(e) => (e.status_code(), Json(ApiResponse::<()>::error(e.to_string()))),
            }
        }
        Ok(Some(_)) => (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<()>::error("Caller does not own this config")),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error(format!(
                "Configuration not found: '{}'",
                id
            ))),
        ),
        Err(e) => (e.status_code(), Json(ApiResponse::<()>::error(e.to_string()))),
    }
}

// ============================================================================
// Runs
// ============================================================================

pub async fn start_run(
    State(state): State<ApiState>,
    auth: Option<Extension<AuthContext>>,
    Path(id): Path<String>,
    Json(settings): Json<RunSettings>,
) -> impl IntoResponse {
    let caller = caller_id(auth.as_deref());
    match state.engine.start_run(&id, &caller, settings).await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "runId": outcome.run_id,
                "recordsGenerated": outcome.records_generated,
            })),
        ),
        Err(e) => {
            let status = e.status_code();
            (status, Json(json!({ "error": e.to_string() })))
        }
    }
}

pub async fn list_runs(
    State(state): State<ApiState>,
    auth: Option<Extension<AuthContext>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let owner = caller_id(auth.as_deref());
    match state.configs.get(&id).await {
        Ok(Some(config)) if config.owner_id == owner => {
            match state.runs.list_by_config(&id, 50, 0).await {
                Ok(runs) => (StatusCode::OK, Json(ApiResponse::success(runs))),
                Err(e) => (
                    e.status_code(),
                    Json(ApiResponse::<Vec<Run>>::error(e.to_string())),
                ),
            }
        }
        Ok(Some(_)) => (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<Vec<Run>>::error(
                "Caller does not own this config",
            )),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Vec<Run>>::error(format!(
                "Configuration not found: '{}'",
                id
            ))),
        ),
        Err(e) => (
            e.status_code(),
            Json(ApiResponse::<Vec<Run>>::error(e.to_string())),
        ),
    }
}

pub async fn get_run(
    State(state): State<ApiState>,
    auth: Option<Extension<AuthContext>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let owner = caller_id(auth.as_deref());
    match state.runs.get(&id).await {
        Ok(Some(run)) if run.owner_id == owner => {
            (StatusCode::OK, Json(ApiResponse::success(run)))
        }
        Ok(Some(_)) => (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<Run>::error("Caller does not own this run")),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Run>::error(format!("Run not found: '{}'", id))),
        ),
        Err(e) => (
            e.status_code(),
            Json(ApiResponse::<Run>::error(e.to_string())),
        ),
    }
}
