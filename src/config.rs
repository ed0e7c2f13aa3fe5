//! Runtime configuration.
//!
//! Everything the pipeline needs to know about the outside world lives in a
//! [`Config`] value: which sources to read, how to pick articles out of a
//! search page, which timezone to read dates in, and where the template and
//! the output go. The value is loaded from an optional YAML file; every field
//! has a default, so the binary runs with no file at all.
//!
//! # Example
//!
//! ```yaml
//! sources:
//!   - label: Google News
//!     kind: feed
//!     url: https://news.google.com/rss/search?q=real+estate+USA&hl=en-US&gl=US&ceid=US:en
//!   - label: Bing News
//!     kind: page
//!     url: https://www.bing.com/news/search?q=real+estate+USA
//! timezone: America/New_York
//! template_path: template.html
//! output_path: index.html
//! timeout_secs: 15
//! ```

use chrono_tz::Tz;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

pub const DEFAULT_PLACEHOLDER: &str = "<!-- NEWS_CONTENT_PLACEHOLDER -->";

const DEFAULT_FEED_URL: &str =
    "https://news.google.com/rss/search?q=real+estate+USA&hl=en-US&gl=US&ceid=US:en";

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Problems that stop a run before anything is fetched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid {field} selector {selector:?}: {reason}")]
    Selector {
        field: &'static str,
        selector: String,
        reason: String,
    },

    #[error("invalid source {label:?}: {reason}")]
    Source { label: String, reason: String },

    #[error("no sources configured")]
    NoSources,

    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("placeholder must not be empty")]
    EmptyPlaceholder,
}

/// How a source is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// RSS or Atom document.
    Feed,
    /// HTML search-results page read through [`Selectors`].
    Page,
}

/// One configured source of news.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Label used in logs and as the fallback publisher name for feed entries.
    pub label: String,
    pub kind: SourceKind,
    pub url: String,
}

/// CSS selectors locating articles on a search-results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// Repeating element wrapping one article.
    pub container: String,
    /// Anchor inside the container; its text is the title and `href` the link.
    pub title_link: String,
    /// Element holding the publisher name.
    pub source: String,
    /// Date-bearing element, usually a `<time datetime="...">` or a label
    /// whose `aria-label` spells out a relative phrase.
    pub date: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            container: "div.news-card, article".to_string(),
            title_link: "a.title, h3 a, h4 a".to_string(),
            source: "div.source > a, cite".to_string(),
            date: "time, div.source > span[aria-label]".to_string(),
        }
    }
}

/// Selectors after parsing.
#[derive(Debug)]
pub struct CompiledSelectors {
    pub container: Selector,
    pub title_link: Selector,
    pub source: Selector,
    pub date: Selector,
}

impl Selectors {
    pub fn compile(&self) -> Result<CompiledSelectors, ConfigError> {
        Ok(CompiledSelectors {
            container: parse_selector("container", &self.container)?,
            title_link: parse_selector("title_link", &self.title_link)?,
            source: parse_selector("source", &self.source)?,
            date: parse_selector("date", &self.date)?,
        })
    }
}

fn parse_selector(field: &'static str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::Selector {
        field,
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sources in the order their articles are discovered.
    pub sources: Vec<Source>,
    pub selectors: Selectors,
    /// Zone used for zone-less dates and relative phrases.
    pub timezone: Tz,
    /// Zone used for the "last updated" line and formatted dates.
    pub display_timezone: Tz,
    pub template_path: PathBuf,
    pub output_path: PathBuf,
    pub placeholder: String,
    /// Optional JSON dump of the sorted article list.
    pub json_output_path: Option<PathBuf>,
    /// Per-request network timeout.
    pub timeout_secs: u64,
    /// Render at most this many articles.
    pub max_articles: Option<usize>,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: vec![Source {
                label: "Google News".to_string(),
                kind: SourceKind::Feed,
                url: DEFAULT_FEED_URL.to_string(),
            }],
            selectors: Selectors::default(),
            timezone: chrono_tz::America::New_York,
            display_timezone: chrono_tz::America::New_York,
            template_path: PathBuf::from("template.html"),
            output_path: PathBuf::from("index.html"),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            json_output_path: None,
            timeout_secs: 15,
            max_articles: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file and validate it.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(sources = config.sources.len(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Check everything that can be checked before the run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.placeholder.trim().is_empty() {
            return Err(ConfigError::EmptyPlaceholder);
        }
        for source in &self.sources {
            url::Url::parse(&source.url).map_err(|e| ConfigError::Source {
                label: source.label.clone(),
                reason: e.to_string(),
            })?;
        }
        if self.sources.iter().any(|s| s.kind == SourceKind::Page) {
            self.selectors.compile()?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
