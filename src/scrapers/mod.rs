//! News source readers.
//!
//! Each configured source is read in two steps:
//!
//! 1. **Fetching**: download the document through a [`FetchText`]
//! 2. **Extraction**: turn it into raw entries, then validate them into articles
//!
//! # Source kinds
//!
//! | Kind | Module | Method |
//! |------|--------|--------|
//! | `feed` | [`feed`] | RSS 2.0 / Atom 1.0 via `quick-xml` |
//! | `page` | [`page`] | HTML search results via CSS selectors |
//!
//! Sources are read one after another. A source that fails to download or
//! parse contributes nothing; the others are unaffected.

pub mod feed;
pub mod page;

use crate::config::{CompiledSelectors, Config, ConfigError, Source, SourceKind};
use crate::dates::DateResolver;
use crate::fetch::FetchText;
use crate::models::{Article, LinkContext};
use crate::normalize::{Validated, validate_entries};
use crate::utils::truncate_for_log;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Reads every configured source into one article list.
#[derive(Debug)]
pub struct Collector<'a, F> {
    config: &'a Config,
    fetcher: &'a F,
    resolver: &'a DateResolver,
    selectors: Option<CompiledSelectors>,
}

impl<'a, F: FetchText> Collector<'a, F> {
    pub fn new(
        config: &'a Config,
        fetcher: &'a F,
        resolver: &'a DateResolver,
    ) -> Result<Self, ConfigError> {
        let selectors = if config.sources.iter().any(|s| s.kind == SourceKind::Page) {
            Some(config.selectors.compile()?)
        } else {
            None
        };
        Ok(Self {
            config,
            fetcher,
            resolver,
            selectors,
        })
    }

    /// Articles from all sources, concatenated in configured order.
    ///
    /// Not deduplicated or sorted; see [`crate::normalize::normalize`].
    #[instrument(level = "info", skip_all, fields(sources = self.config.sources.len()))]
    pub async fn collect(&self) -> Vec<Article> {
        let mut articles = Vec::new();

        for source in &self.config.sources {
            match self.collect_source(source).await {
                Ok(validated) => {
                    info!(
                        source = %source.label,
                        kept = validated.articles.len(),
                        dropped = validated.dropped_total(),
                        reasons = ?validated.dropped,
                        "Collected source"
                    );
                    articles.extend(validated.articles);
                }
                Err(e) => {
                    warn!(
                        source = %source.label,
                        url = %source.url,
                        error = %e,
                        "Source failed; continuing without it"
                    );
                }
            }
        }

        info!(count = articles.len(), "Total articles collected");
        articles
    }

    #[instrument(level = "info", skip_all, fields(source = %source.label))]
    async fn collect_source(&self, source: &Source) -> Result<Validated, Box<dyn Error>> {
        let url = Url::parse(&source.url)?;
        let body = self.fetcher.fetch_text(&source.url).await?;

        let (entries, links) = match source.kind {
            SourceKind::Feed => {
                let entries = feed::parse_feed(&body, &source.label).inspect_err(|_| {
                    debug!(preview = %truncate_for_log(&body, 200), "Unreadable feed body");
                })?;
                (entries, LinkContext::for_feed(&url))
            }
            SourceKind::Page => {
                let Some(selectors) = self.selectors.as_ref() else {
                    error!("Page source without compiled selectors");
                    return Err("selectors not compiled".into());
                };
                (page::parse_page(&body, selectors), LinkContext::for_page(&url))
            }
        };

        Ok(validate_entries(entries, &links, self.resolver))
    }
}
