/// Configuration management for the DevSync development server.
/// Handles command-line argument parsing and config structure.
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "DevSync Server")]
#[command(about = "DevSync backend for local development", long_about = None)]
pub struct Config {
    /// Server port (default: 8080)
    #[arg(long, default_value = "8080")]
    pub port: u16,

    /// Address to bind (default: 127.0.0.1)
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Database file path (default: devsync.db); `:memory:` keeps nothing on disk
    #[arg(long, default_value = "devsync.db")]
    pub database: PathBuf,

    /// Skip seeding the admin account and #general
    #[arg(long)]
    pub no_seed: bool,

    /// PID file path (optional) - write server PID to this file on startup
    #[arg(long)]
    pub pidfile: Option<PathBuf>,
}

impl Config {
    /// Parse command-line arguments into Config
    pub fn from_args() -> Self {
        Config::parse()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
