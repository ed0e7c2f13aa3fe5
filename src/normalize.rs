//! Validation, deduplication and ordering of scraped entries.
//!
//! Every source's raw entries pass through [`validate_entries`]; the combined
//! list then goes through [`normalize`], which drops repeated stories and puts
//! the newest first.

use crate::dates::DateResolver;
use crate::models::{Article, LinkContext, RawEntry, Rejection};
use itertools::Itertools;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Articles that survived validation, plus what was thrown away and why.
#[derive(Debug, Default)]
pub struct Validated {
    pub articles: Vec<Article>,
    pub dropped: BTreeMap<String, usize>,
}

impl Validated {
    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }

    fn reject(&mut self, reason: Rejection) {
        *self.dropped.entry(reason.to_string()).or_default() += 1;
    }
}

/// Turn raw entries into articles, dropping those that break the
/// required-field rules. Never fails.
pub fn validate_entries(
    entries: Vec<RawEntry>,
    links: &LinkContext,
    resolver: &DateResolver,
) -> Validated {
    let mut out = Validated::default();
    for entry in entries {
        match Article::from_raw(entry, links, resolver) {
            Ok(article) => out.articles.push(article),
            Err(reason) => {
                debug!(%reason, "Dropping entry");
                out.reject(reason);
            }
        }
    }
    out
}

/// Keep the first occurrence of each (title, link) pair.
pub fn dedup(articles: Vec<Article>) -> Vec<Article> {
    articles.into_iter().unique_by(Article::dedup_key).collect()
}

/// Newest first; equal timestamps keep their discovery order.
pub fn sort_by_recency(articles: &mut [Article]) {
    articles.sort_by(|a, b| b.resolved_at.cmp(&a.resolved_at));
}

/// Deduplicate then sort.
#[instrument(level = "info", skip_all, fields(input = articles.len()))]
pub fn normalize(articles: Vec<Article>) -> Vec<Article> {
    let total = articles.len();
    let mut articles = dedup(articles);
    sort_by_recency(&mut articles);
    info!(
        unique = articles.len(),
        duplicates = total - articles.len(),
        "Normalized article list"
    );
    articles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::Resolution;
    use crate::models::DateEvidence;
    use chrono::{TimeZone, Utc};
    use chrono_tz::UTC;
    use url::Url;

    fn resolver() -> DateResolver {
        DateResolver::new(UTC, Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap())
    }

    fn entry(title: &str, link: &str, source: &str, date: &str) -> RawEntry {
        RawEntry {
            title: Some(title.to_string()),
            link: Some(link.to_string()),
            source: Some(source.to_string()),
            date: DateEvidence {
                published: Some(date.to_string()),
                ..Default::default()
            },
        }
    }

    fn articles(entries: Vec<RawEntry>) -> Vec<Article> {
        validate_entries(entries, &LinkContext::default(), &resolver()).articles
    }

    #[test]
    fn test_worked_example() {
        let list = articles(vec![
            entry("A", "http://x/1", "feed-one", "Wed, 01 Jan 2025 10:00:00 GMT"),
            entry("A", "http://x/1", "feed-two", "Wed, 01 Jan 2025 11:00:00 GMT"),
            entry("B", "http://x/2", "feed-two", "2 hours ago"),
        ]);

        let out = normalize(list);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title, "A");
        assert_eq!(out[0].source, "feed-one");
        assert_eq!(out[0].resolution, Resolution::Absolute);
        assert_eq!(out[1].title, "B");
        assert_eq!(out[1].resolution, Resolution::Relative);
        assert_eq!(out[0].resolved_at, out[1].resolved_at);
    }

    #[test]
    fn test_dedup_keeps_first_source() {
        let out = dedup(articles(vec![
            entry("Rates climb", "https://x.com/r", "First", "1 hour ago"),
            entry("RATES CLIMB ", "https://X.com/r", "Second", "5 hours ago"),
        ]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source, "First");
    }

    #[test]
    fn test_sort_is_descending_and_stable() {
        let mut list = articles(vec![
            entry("old", "https://x.com/1", "s", "3 days ago"),
            entry("tie-1", "https://x.com/2", "s", "1 hour ago"),
            entry("new", "https://x.com/3", "s", "5 mins ago"),
            entry("tie-2", "https://x.com/4", "s", "1 hour ago"),
        ]);
        sort_by_recency(&mut list);

        let titles: Vec<_> = list.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["new", "tie-1", "tie-2", "old"]);
        assert!(list.windows(2).all(|w| w[0].resolved_at >= w[1].resolved_at));
    }

    #[test]
    fn test_validate_counts_rejections() {
        let page = Url::parse("https://news.example.com/search").unwrap();
        let entries = vec![
            entry("kept", "https://elsewhere.com/a", "s", ""),
            RawEntry {
                title: None,
                link: Some("https://elsewhere.com/b".to_string()),
                ..Default::default()
            },
            entry("nav", "/topics/homes", "s", ""),
            entry("bad", "ftp://files.example.com/x", "s", ""),
        ];

        let validated = validate_entries(entries, &LinkContext::for_page(&page), &resolver());
        assert_eq!(validated.articles.len(), 1);
        assert_eq!(validated.articles[0].title, "kept");
        assert_eq!(validated.dropped_total(), 3);
        assert_eq!(validated.dropped.get("missing title"), Some(&1));
        assert_eq!(validated.dropped.get("link points back at the aggregator"), Some(&1));
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize(Vec::new()).is_empty());
    }
}
