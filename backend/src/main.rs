//! Main entry point for the Books API backend.
//!
//! This file loads configuration, builds the auth and dataset services, loads
//! the books dataset and serves the Axum router.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod middleware;
mod scraper;
mod services;

use anyhow::Context;
use auth::service::AuthService;
use config::Config;
use database::BooksDatabase;
use scraper::RemoteCsvScraper;
use services::scraping_service::ScrapingService;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config);

    let auth_service = Arc::new(AuthService::from_config(&config)?);

    let database = Arc::new(BooksDatabase::new(&config.data_path));
    if let Err(e) = database.reload().await {
        warn!("Starting without data ({}); trigger a scrape or reload to populate", e);
    }

    let scraper = Arc::new(RemoteCsvScraper::new(config.scraping_url.clone())?);
    let scraping_service = Arc::new(ScrapingService::new(Arc::clone(&database), scraper));

    let bind_address = format!("{}:{}", config.server_host, config.server_port);
    let environment = config.environment.clone();
    let app = api::router(Arc::new(config), auth_service, database, scraping_service);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!("Starting Books API on {} ({})", bind_address, environment);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

fn init_tracing(config: &Config) {
    let level = config.log_level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    if config.uses_default_secret() {
        if config.is_development() {
            warn!("SECRET_KEY not set, using the development default");
        } else {
            warn!(
                "SECRET_KEY not set outside development; tokens are signed with a public default"
            );
        }
    }
}
