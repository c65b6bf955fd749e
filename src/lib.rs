//! # Synthrun - Synthetic Data Run Engine
//!
//! Synthrun lets a user define a reusable schema of typed fields, then
//! execute it as a "run" that generates a requested number of synthetic
//! records in batches, checkpointing cumulative progress to the
//! database after every batch and ending in a terminal status.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use synthrun::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Load configuration
//!     let settings = Settings::new()?;
//!
//!     // Server will start on configured host:port
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: schema, run, and settings types
//! - **Adapters**: generator, run engine, HTTP handlers, auth
//! - **Persistence**: sqlx-backed config and run repositories
//! - **Config**: configuration management

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod persistence;

use crate::adapters::api_handler::{self, ApiState};
use crate::adapters::auth_middleware::{auth_middleware, AuthMiddleware, SharedAuthMiddleware};
use crate::adapters::run_engine::RunEngine;
use crate::domain::auth::AuthConfig;
use crate::persistence::{ConfigRepository, RunRepository};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates the Axum application router with all endpoints configured.
///
/// # Arguments
///
/// * `configs` - Config repository
/// * `runs` - Run repository
/// * `auth_config` - Authentication settings; middleware is layered
///   onto the API routes only when enabled
///
/// # Returns
///
/// Configured Axum Router
pub fn create_app(
    configs: Arc<dyn ConfigRepository>,
    runs: Arc<dyn RunRepository>,
    auth_config: &AuthConfig,
) -> Router {
    let engine = Arc::new(RunEngine::new(configs.clone(), runs.clone()));

    let api_state = ApiState {
        configs,
        runs,
        engine,
    };

    // API routes: config CRUD plus run execution and polling
    let mut api_router = Router::new()
        .route(
            "/configs",
            get(api_handler::list_configs).post(api_handler::create_config),
        )
        .route(
            "/configs/:id",
            get(api_handler::get_config)
                .put(api_handler::update_config)
                .delete(api_handler::delete_config),
        )
        .route("/configs/:id/run", post(api_handler::start_run))
        .route("/configs/:id/runs", get(api_handler::list_runs))
        .route("/runs/:id", get(api_handler::get_run))
        .with_state(api_state);

    // Apply authentication middleware to the API routes if enabled
    if auth_config.enabled {
        let auth: SharedAuthMiddleware =
            Arc::new(AuthMiddleware::new(Arc::new(auth_config.clone())));
        api_router = api_router.layer(axum::middleware::from_fn_with_state(auth, auth_middleware));
    }

    // Health stays public
    let router = Router::new()
        .route("/health", get(api_handler::health))
        .nest("/api", api_router);

    router.layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
