//! JSON export of the published article list.
//!
//! An optional side output for anything that wants the data without parsing
//! the page. The file is overwritten on every run.
//!
//! # Output Structure
//!
//! ```text
//! {
//!   "generated_at": "2025-01-01T12:00:00Z",
//!   "count": 2,
//!   "articles": [ { "title": ..., "link": ..., "resolved_at": ... }, ... ]
//! }
//! ```

use crate::models::Article;
use crate::utils::ensure_parent_dir;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialized form of one run's articles.
#[derive(Debug, Serialize)]
pub struct NewsDigest<'a> {
    pub generated_at: DateTime<Utc>,
    pub count: usize,
    pub articles: &'a [Article],
}

/// Write `articles` as pretty-printed JSON to `path`.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_articles(
    articles: &[Article],
    generated_at: DateTime<Utc>,
    path: &Path,
) -> Result<(), Box<dyn Error>> {
    let digest = NewsDigest {
        generated_at,
        count: articles.len(),
        articles,
    };
    let json = serde_json::to_string_pretty(&digest)?;

    if let Err(e) = ensure_parent_dir(path).await {
        error!(error = %e, "Failed to create JSON output directory");
        return Err(e.into());
    }

    fs::write(path, json).await?;
    info!(count = articles.len(), "Wrote JSON export");
    Ok(())
}
