//! TikTok Downloader Bot - Main Entry Point
//!
//! A Telegram bot that downloads TikTok videos without watermark, with a
//! web dashboard and stats API on the same port.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use tiktok_downloader_bot::bot::UpdateHandler;
use tiktok_downloader_bot::config::AppConfig;
use tiktok_downloader_bot::downloader::SsstikClient;
use tiktok_downloader_bot::server::{self, AppState};
use tiktok_downloader_bot::storage::Database;
use tiktok_downloader_bot::telegram::BotApi;

/// Telegram bot and web service for downloading TikTok videos.
#[derive(Parser, Debug)]
#[command(name = "tiktok_bot")]
#[command(about = "Download TikTok videos without watermark via Telegram")]
#[command(version)]
struct Args {
    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args.log_level);

    // Load environment variables
    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    // Load configuration
    let config = AppConfig::from_env().context("Failed to load configuration from environment")?;

    info!(
        "Supabase: {}",
        if config.store.is_some() {
            "configured"
        } else {
            "not configured, using in-memory storage"
        }
    );

    // Build components
    let api = Arc::new(
        BotApi::new(&config.telegram.bot_token).context("Failed to build Bot API client")?,
    );

    let downloader = Arc::new(
        SsstikClient::new(config.service.download_dir.clone())
            .context("Failed to set up the downloader")?,
    );

    let db = Arc::new(
        Database::new(config.store.as_ref()).context("Failed to set up the persistence layer")?,
    );
    db.initialize().await;

    let handler = Arc::new(UpdateHandler::new(
        Arc::clone(&api),
        downloader,
        Arc::clone(&db),
        config.service.cooldown_secs,
    ));

    // Register the webhook. Not fatal: the dashboard and stats API still
    // work, and Telegram retries once the registration succeeds on a
    // later restart.
    match api.set_webhook(&config.telegram.webhook_url()).await {
        Ok(()) => info!("Webhook registered"),
        Err(e) => warn!("Failed to register webhook, updates will not arrive: {}", e),
    }

    info!("Starting on port {}", config.service.port);

    server::run(AppState { db, handler }, config.service.port)
        .await
        .context("HTTP server failed")
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
