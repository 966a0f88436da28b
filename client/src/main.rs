/// DevSync client - command-line entry point
///
/// Wires storage, session, API client and controller together, then runs
/// a single subcommand.
use clap::Parser;
use devsync_client::{
    cli, ClientConfig, DevSyncApi, LocalStore, Result, SessionController, SessionStore,
};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "devsync")]
#[command(about = "DevSync chat client")]
struct Args {
    /// Backend base URL (default: $DEVSYNC_API_URL or http://localhost:8080/api)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory for the session database (default: $DEVSYNC_DATA_DIR or ~/.devsync)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging (DEBUG level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: cli::Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let config = ClientConfig::resolve(args.api_url, args.data_dir)?;
    info!("API: {}", config.api_url);
    info!("Data directory: {}", config.data_dir.display());

    std::fs::create_dir_all(&config.data_dir)?;
    let store = LocalStore::new(&config.session_db_path())?;

    let session = SessionStore::new(Arc::new(store));
    let api = Arc::new(DevSyncApi::new(&config.api_url, session)?);
    let controller = SessionController::new(api);

    if let Err(e) = cli::run(args.command, &controller).await {
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}
