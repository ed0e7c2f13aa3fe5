//! # estate_news
//!
//! Collects real-estate news from RSS/Atom feeds and HTML search-result
//! pages, resolves every article's date into a single orderable instant,
//! removes duplicate stories, and publishes the newest-first list into a
//! static HTML page built from a template.
//!
//! ## Usage
//!
//! ```sh
//! estate_news                      # built-in defaults
//! estate_news -c news.yaml         # custom sources, paths and timezone
//! ```
//!
//! ## Architecture
//!
//! The application is a single sequential batch run:
//! 1. **Collecting**: fetch each source and extract raw entries
//! 2. **Normalizing**: validate, resolve dates, deduplicate, sort
//! 3. **Rendering**: build the HTML fragment
//! 4. **Publishing**: fill the template placeholder and write the page
//!
//! Unreachable or malformed sources only shrink the article list. The exit
//! status is nonzero only for configuration and file-system failures.

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod dates;
mod fetch;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use config::Config;
use fetch::HttpFetcher;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
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
    info!(version = env!("CARGO_PKG_VERSION"), "estate_news starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Configuration ----
    let mut config = match &args.config {
        Some(path) => Config::load(path).inspect_err(|e| {
            error!(error = %e, "Configuration could not be loaded");
        })?,
        None => {
            info!("No config file given; using built-in defaults");
            Config::default()
        }
    };
    args.apply(&mut config);
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }
    info!(
        sources = config.sources.len(),
        timezone = %config.timezone,
        template = %config.template_path.display(),
        output = %config.output_path.display(),
        "Configuration ready"
    );

    // ---- Run ----
    let fetcher = HttpFetcher::new(config.timeout(), &config.user_agent)?;
    let summary = match pipeline::run(&config, &fetcher, Utc::now()).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(error = %e, "Run failed");
            return Err(e);
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        articles = summary.articles.len(),
        generated_at = %summary.generated_at,
        "Execution complete"
    );

    Ok(())
}
