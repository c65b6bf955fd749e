use config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::domain::auth::AuthConfig;
use crate::persistence::PersistenceConfig;

#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_path(std::path::Path::new("synthrun.toml"))
    }

    /// Create settings from CLI arguments (config file plus overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::from_path(&cli.config)?;
        settings.apply_cli_overrides(cli);
        Ok(settings)
    }

    pub fn from_path(config_path: &std::path::Path) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .add_source(File::from(config_path.to_path_buf()).required(false))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("persistence.url", "sqlite://synthrun.db")?
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        Ok(settings)
    }

    /// Apply CLI argument overrides to settings (CLI > env > file)
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(url) = &cli.database_url {
            self.persistence.url = url.clone();
        }
    }
}
