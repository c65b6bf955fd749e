use clap::Parser;
use std::path::PathBuf;

/// Synthetic data run engine - define field schemas and execute batch
/// generation runs against them
#[derive(Parser, Debug, Clone)]
#[command(name = "synthrun", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "SYNTHRUN_CONFIG", default_value = "synthrun.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "SYNTHRUN_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "SYNTHRUN_PORT")]
    pub port: Option<u16>,

    /// Database URL (sqlite://, postgres://, or mysql://)
    #[arg(long, env = "SYNTHRUN_DATABASE_URL")]
    pub database_url: Option<String>,
}
