//! # Mars Scrape
//!
//! Collects public information about Mars from five unrelated web sources
//! and merges it into one snapshot for display:
//!
//! - the latest NASA Mars news headline, summary and opening paragraph
//! - JPL's featured Mars image (full-size URL)
//! - the latest "Sol" weather report from the Mars weather feed
//! - the Space Facts planet profile table
//! - the four USGS enhanced hemisphere images
//!
//! ## Usage
//!
//! ```sh
//! chromedriver --port=9515 &
//! mars_scrape scrape --print
//! mars_scrape serve --bind 127.0.0.1:5000
//! ```
//!
//! ## Architecture
//!
//! 1. **Sessions**: each browser-backed source gets its own WebDriver session
//! 2. **Extraction**: one extractor per source parses a typed fragment
//! 3. **Aggregation**: fragments are merged in a fixed order; failed sources
//!    become empty fields
//! 4. **Output**: the record replaces the stored JSON document and is
//!    rendered as an HTML page on demand

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod outputs;
mod scrapers;
mod server;
mod session;
mod utils;

#[cfg(test)]
mod testing;

use aggregator::Aggregator;
use cli::{Cli, Command};
use config::Config;
use fetch::HttpFetcher;
use outputs::html::render_page;
use outputs::json::DocumentStore;
use session::WebDriverSessions;
use utils::ensure_writable_parent;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("mars_scrape starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = load_config(&args)?;
    let store = DocumentStore::new(&config.store_path);

    match args.command {
        Command::Scrape { print } => {
            if let Err(e) = ensure_writable_parent(store.path()).await {
                error!(path = %config.store_path, error = %e, "Store directory is not writable");
                return Err(e);
            }

            let aggregator = build_aggregator(&config)?;
            let record = aggregator.run().await?;

            store.replace(&record).await?;
            if print {
                println!("{}", serde_json::to_string_pretty(&record)?);
            }
        }
        Command::Serve { bind } => {
            ensure_writable_parent(store.path()).await?;
            let state = server::AppState::new(build_aggregator(&config)?, store);
            server::serve(&bind, state).await?;
        }
        Command::Render { out } => {
            let record = store.load_or_default().await?;
            let page = render_page(&record);
            match out {
                Some(path) => {
                    tokio::fs::write(&path, page).await?;
                    info!(%path, "Wrote HTML page");
                }
                None => println!("{page}"),
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    Ok(())
}

/// Config file values with command-line overrides applied.
fn load_config(args: &Cli) -> Result<Config, Box<dyn Error + Send + Sync>> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(url) = &args.webdriver_url {
        config.webdriver_url = url.clone();
    }
    if args.headless {
        config.headless = true;
    }
    if let Some(store) = &args.store {
        config.store_path = store.clone();
    }
    debug!(?config, "Effective configuration");
    Ok(config)
}

fn build_aggregator(config: &Config) -> Result<server::LiveAggregator, Box<dyn Error + Send + Sync>> {
    let fetcher = HttpFetcher::new(config.http_timeout())?;
    Ok(Aggregator::new(WebDriverSessions::new(config), fetcher, config))
}
