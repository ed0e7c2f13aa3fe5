//! Data models for scraped news entries and validated articles.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RawEntry`]: An unvalidated record as produced by a feed or page extractor
//! - [`DateEvidence`]: Whatever date information the raw record carried
//! - [`Article`]: A validated record with an absolute link and a resolved timestamp
//! - [`LinkContext`]: Per-source rules for resolving and filtering links
//!
//! Raw entries are turned into articles by [`Article::from_raw`], which is the
//! single place where the required-field rules are enforced.

use crate::dates::{DateResolver, Resolution};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Source label used when an entry does not name its publisher.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Date information found on a raw entry.
///
/// Extractors fill in whatever they find; the [`DateResolver`] decides which
/// piece wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateEvidence {
    /// Machine-readable value, e.g. a `<time datetime="...">` attribute or an Atom `<published>`.
    pub datetime: Option<String>,
    /// Absolute free text, e.g. an RSS `pubDate`.
    pub published: Option<String>,
    /// Relative phrase such as `"3 hours ago"` or `"Yesterday"`.
    pub relative: Option<String>,
}

impl DateEvidence {
    /// The text shown to readers when the article is rendered.
    pub fn display_text(&self) -> Option<String> {
        [&self.published, &self.relative, &self.datetime]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn is_empty(&self) -> bool {
        self.display_text().is_none()
    }
}

/// A news entry exactly as an extractor found it.
#[derive(Debug, Clone, Default)]
pub struct RawEntry {
    pub title: Option<String>,
    /// Link as written in the document; may be relative.
    pub link: Option<String>,
    pub source: Option<String>,
    pub date: DateEvidence,
}

/// How links found in one source are resolved and filtered.
#[derive(Debug, Clone, Default)]
pub struct LinkContext {
    /// Base URL relative links are joined against.
    pub base: Option<Url>,
    /// Host of the aggregator itself. Links pointing back at it are navigation, not news.
    pub self_host: Option<String>,
}

impl LinkContext {
    /// Context for a scraped page: relative links resolve against the page,
    /// and links back onto the page's own host are rejected.
    pub fn for_page(page_url: &Url) -> Self {
        Self {
            base: Some(page_url.clone()),
            self_host: page_url.host_str().map(|h| h.to_ascii_lowercase()),
        }
    }

    /// Context for a feed: relative links resolve against the feed URL,
    /// no self-link filtering.
    pub fn for_feed(feed_url: &Url) -> Self {
        Self {
            base: Some(feed_url.clone()),
            self_host: None,
        }
    }

    /// Resolve `link` to an absolute `http(s)` URL accepted by this context.
    pub fn resolve(&self, link: &str) -> Result<Url, Rejection> {
        let link = link.trim();
        if link.is_empty() {
            return Err(Rejection::MissingLink);
        }

        let url = match Url::parse(link) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base
                .as_ref()
                .and_then(|base| base.join(link).ok())
                .ok_or(Rejection::UnresolvableLink)?,
            Err(_) => return Err(Rejection::UnresolvableLink),
        };

        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(Rejection::UnresolvableLink);
        }

        if let (Some(own), Some(host)) = (&self.self_host, url.host_str()) {
            if host.eq_ignore_ascii_case(own) {
                return Err(Rejection::SelfReferential);
            }
        }

        Ok(url)
    }
}

/// Why a raw entry did not become an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    MissingTitle,
    MissingLink,
    UnresolvableLink,
    SelfReferential,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Rejection::MissingTitle => "missing title",
            Rejection::MissingLink => "missing link",
            Rejection::UnresolvableLink => "link cannot be resolved to an absolute URL",
            Rejection::SelfReferential => "link points back at the aggregator",
        };
        f.write_str(reason)
    }
}

/// A validated news article ready for sorting and rendering.
///
/// # Fields
///
/// * `title` - Non-empty, trimmed headline
/// * `link` - Absolute `http(s)` URL
/// * `source` - Publisher label, [`UNKNOWN_SOURCE`] when absent
/// * `raw_date_text` - Date text as found in the source, kept for display
/// * `resolved_at` - Instant used for ordering; always set
/// * `resolution` - Which strategy produced `resolved_at`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub source: String,
    pub raw_date_text: Option<String>,
    pub resolved_at: DateTime<Utc>,
    pub resolution: Resolution,
}

impl Article {
    /// Validate a raw entry and resolve its date.
    ///
    /// Entries without a title, or whose link cannot be made absolute (or
    /// points back at the aggregator), are rejected. A missing source label is
    /// replaced with [`UNKNOWN_SOURCE`]. Date problems never reject an entry.
    pub fn from_raw(
        raw: RawEntry,
        links: &LinkContext,
        resolver: &DateResolver,
    ) -> Result<Article, Rejection> {
        let title = raw
            .title
            .as_deref()
            .map(collapse_whitespace)
            .filter(|t| !t.is_empty())
            .ok_or(Rejection::MissingTitle)?;

        let link = links.resolve(raw.link.as_deref().ok_or(Rejection::MissingLink)?)?;

        let source = raw
            .source
            .as_deref()
            .map(collapse_whitespace)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

        let resolved = resolver.resolve(&raw.date);

        Ok(Article {
            title,
            link: link.to_string(),
            source,
            raw_date_text: raw.date.display_text(),
            resolved_at: resolved.at,
            resolution: resolved.via,
        })
    }

    /// Key used to detect the same story published by several sources.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}\u{1f}{}",
            collapse_whitespace(&self.title).to_lowercase(),
            collapse_whitespace(&self.link).to_lowercase()
        )
    }
}

/// Trim and collapse internal whitespace runs to a single space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn resolver() -> DateResolver {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        DateResolver::new(New_York, now)
    }

    fn page_context() -> LinkContext {
        LinkContext::for_page(&Url::parse("https://news.example.com/search?q=homes").unwrap())
    }

    fn raw(title: Option<&str>, link: Option<&str>) -> RawEntry {
        RawEntry {
            title: title.map(str::to_string),
            link: link.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_raw_defaults_source() {
        let article = Article::from_raw(
            raw(Some("  Mortgage   rates fall "), Some("https://www.realty.com/a")),
            &page_context(),
            &resolver(),
        )
        .unwrap();

        assert_eq!(article.title, "Mortgage rates fall");
        assert_eq!(article.source, UNKNOWN_SOURCE);
        assert_eq!(article.raw_date_text, None);
        assert_eq!(article.resolution, Resolution::Fallback);
    }

    #[test]
    fn test_from_raw_rejects_missing_title() {
        let err = Article::from_raw(raw(Some("   "), Some("https://a.com/x")), &page_context(), &resolver())
            .unwrap_err();
        assert_eq!(err, Rejection::MissingTitle);

        let err = Article::from_raw(raw(None, Some("https://a.com/x")), &page_context(), &resolver())
            .unwrap_err();
        assert_eq!(err, Rejection::MissingTitle);
    }

    #[test]
    fn test_from_raw_rejects_missing_link() {
        let err = Article::from_raw(raw(Some("Title"), None), &page_context(), &resolver()).unwrap_err();
        assert_eq!(err, Rejection::MissingLink);
    }

    #[test]
    fn test_relative_link_resolves_against_base() {
        let ctx = LinkContext::for_feed(&Url::parse("https://feeds.example.org/rss/homes.xml").unwrap());
        let url = ctx.resolve("/story/42").unwrap();
        assert_eq!(url.as_str(), "https://feeds.example.org/story/42");
    }

    #[test]
    fn test_relative_link_without_base_is_unresolvable() {
        let ctx = LinkContext::default();
        assert_eq!(ctx.resolve("./articles/1").unwrap_err(), Rejection::UnresolvableLink);
    }

    #[test]
    fn test_non_http_link_is_unresolvable() {
        let ctx = page_context();
        assert_eq!(ctx.resolve("javascript:void(0)").unwrap_err(), Rejection::UnresolvableLink);
        assert_eq!(ctx.resolve("mailto:desk@example.com").unwrap_err(), Rejection::UnresolvableLink);
    }

    #[test]
    fn test_self_referential_link_rejected() {
        let ctx = page_context();
        assert_eq!(
            ctx.resolve("./read/CBMi123").unwrap_err(),
            Rejection::SelfReferential
        );
        assert_eq!(
            ctx.resolve("https://NEWS.example.com/topics").unwrap_err(),
            Rejection::SelfReferential
        );
        assert!(ctx.resolve("https://www.example.com/story").is_ok());
    }

    #[test]
    fn test_dedup_key_ignores_case_and_spacing() {
        let a = Article::from_raw(
            raw(Some("Home Prices Rise"), Some("https://x.com/1")),
            &LinkContext::default(),
            &resolver(),
        )
        .unwrap();
        let mut b = a.clone();
        b.title = "  home   prices RISE ".to_string();
        b.source = "Other".to_string();
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_display_text_prefers_published() {
        let evidence = DateEvidence {
            datetime: Some("2025-01-01T10:00:00Z".to_string()),
            published: Some("Wed, 01 Jan 2025 10:00:00 GMT".to_string()),
            relative: None,
        };
        assert_eq!(
            evidence.display_text().as_deref(),
            Some("Wed, 01 Jan 2025 10:00:00 GMT")
        );
        assert!(DateEvidence::default().is_empty());
    }

    #[test]
    fn test_article_serialization() {
        let article = Article::from_raw(
            RawEntry {
                title: Some("Condo sales slow".to_string()),
                link: Some("https://x.com/condos".to_string()),
                source: Some("Realty Daily".to_string()),
                date: DateEvidence {
                    published: Some("Wed, 01 Jan 2025 10:00:00 GMT".to_string()),
                    ..Default::default()
                },
            },
            &LinkContext::default(),
            &resolver(),
        )
        .unwrap();

        let json = serde_json::to_string(&article).unwrap();
        assert!(json.contains("Condo sales slow"));
        assert!(json.contains("2025-01-01T10:00:00Z"));
        assert!(json.contains("\"absolute\""));
    }
}
