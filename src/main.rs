use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use synthrun::cli::Cli;
use synthrun::config::Settings;
use synthrun::persistence::{ConfigRepository, DataStore, RunRepository};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting Synthrun on {}:{}", host, port);

    // Connect to the database and bring the schema up to date
    let store = DataStore::new(&settings.persistence).await?;
    if settings.persistence.auto_migrate {
        let result = store.migrate().await?;
        info!(
            "Migrations: {} applied, {} already in place",
            result.applied, result.skipped
        );
    }

    let configs: Arc<dyn ConfigRepository> = store.configs().clone();
    let runs: Arc<dyn RunRepository> = store.runs().clone();

    // Create application using the library function
    let app = synthrun::create_app(configs, runs, &settings.auth);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
