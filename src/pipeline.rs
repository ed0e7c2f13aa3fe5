//! One complete run: collect, normalize, render, publish.

use crate::config::Config;
use crate::dates::DateResolver;
use crate::fetch::FetchText;
use crate::models::Article;
use crate::normalize::normalize;
use crate::outputs::html::{RenderOptions, render_fragment};
use crate::outputs::json;
use crate::outputs::template::Publisher;
use crate::scrapers::Collector;
use chrono::{DateTime, Utc};
use std::error::Error;
use tracing::{error, info, instrument};

/// What a successful run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub articles: Vec<Article>,
    pub generated_at: DateTime<Utc>,
}

/// Run the whole batch against `fetcher`, treating `now` as the current time.
///
/// Source failures only reduce the article count. Errors returned from here
/// are configuration or file-system problems.
#[instrument(level = "info", skip_all, fields(%now))]
pub async fn run<F: FetchText>(
    config: &Config,
    fetcher: &F,
    now: DateTime<Utc>,
) -> Result<RunSummary, Box<dyn Error>> {
    let resolver = DateResolver::new(config.timezone, now);

    let collector = Collector::new(config, fetcher, &resolver)?;
    let articles = normalize(collector.collect().await);

    let fragment = render_fragment(
        &articles,
        now,
        &RenderOptions {
            display_timezone: config.display_timezone,
            max_articles: config.max_articles,
        },
    );

    Publisher::from_config(config).publish(&fragment).await?;
    info!(
        articles = articles.len(),
        output = %config.output_path.display(),
        "Page updated"
    );

    if let Some(path) = &config.json_output_path {
        if let Err(e) = json::write_articles(&articles, now, path).await {
            error!(path = %path.display(), error = %e, "Failed to write JSON export");
        }
    }

    Ok(RunSummary {
        articles,
        generated_at: now,
    })
}
