pub mod api_handler;
pub mod auth_middleware;
pub mod generator;
pub mod run_engine;
