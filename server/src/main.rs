/// DevSync Server - development backend
///
/// Main server entry point. Handles:
/// - Command-line argument parsing
/// - Database initialization
/// - HTTP server startup
use actix_web::web;
use anyhow::Context;
use devsync_server::{config::Config, db, server};
use std::fs;
use std::process;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let config = Config::from_args();

    log::info!("Starting DevSync Server");
    log::info!("Port: {}", config.port);

    // Write PID file if specified
    if let Some(pidfile) = &config.pidfile {
        let pid = process::id().to_string();
        fs::write(pidfile, pid)
            .with_context(|| format!("Failed to write PID file {:?}", pidfile))?;
        log::info!("PID file written to: {:?}", pidfile);
    }

    log::info!("Database: {:?}", config.database);
    if !config.no_seed {
        log::info!(
            "Seeding account '{}' and #{}",
            db::init::ADMIN_USERNAME,
            db::init::DEFAULT_CHANNEL
        );
    }
    let pool = db::create_pool(&config.database, !config.no_seed)
        .with_context(|| format!("Failed to open database {:?}", config.database))?;

    let bind_addr = config.bind_addr();
    log::info!("Starting HTTP server on {}", bind_addr);

    let http_server = server::create_http_server(web::Data::new(pool), &bind_addr)
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    http_server.await.context("HTTP server terminated")?;
    Ok(())
}
