//! RSS 2.0 and Atom 1.0 feed parsing.
//!
//! Feeds are deserialized with `quick-xml`'s serde support into just the
//! fields we read; everything else in the document is ignored. RSS is tried
//! first, then Atom.
//!
//! # Field mapping
//!
//! | Article field | RSS | Atom |
//! |---------------|-----|------|
//! | title | `<title>` | `<title>` |
//! | link | `<link>` | `<link rel="alternate" href>` (or the first link) |
//! | source | `<source>` text, else the feed label | feed label |
//! | date | `<pubDate>` (absolute text) | `<published>`, else `<updated>` (attribute) |

use crate::models::{DateEvidence, RawEntry};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::error::Error;
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    source: Option<RssSource>,
}

#[derive(Debug, Deserialize)]
struct RssSource {
    #[serde(rename = "$text", default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    /// Required by Atom; also keeps arbitrary XML from passing as an empty feed.
    title: AtomText,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl AtomEntry {
    fn alternate_link(&self) -> Option<String> {
        self.links
            .iter()
            .find(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
            .or_else(|| self.links.first())
            .and_then(|l| l.href.clone())
    }
}

/// Parse a feed document into raw entries.
///
/// Returns an error only when the document is neither RSS nor Atom. Entries
/// with missing fields are returned as-is; validation happens later.
#[instrument(level = "debug", skip(body), fields(bytes = body.len()))]
pub fn parse_feed(body: &str, label: &str) -> Result<Vec<RawEntry>, Box<dyn Error>> {
    match from_str::<Rss>(body) {
        Ok(rss) => {
            debug!(items = rss.channel.items.len(), "Parsed RSS feed");
            return Ok(rss
                .channel
                .items
                .into_iter()
                .map(|item| rss_entry(item, label))
                .collect());
        }
        Err(rss_err) => {
            debug!(error = %rss_err, "Not an RSS document; trying Atom");
        }
    }

    let atom = from_str::<AtomFeed>(body)?;
    debug!(
        feed_title = atom.title.value.as_deref().unwrap_or_default(),
        entries = atom.entries.len(),
        "Parsed Atom feed"
    );
    Ok(atom
        .entries
        .into_iter()
        .map(|entry| atom_entry(entry, label))
        .collect())
}

fn rss_entry(item: RssItem, label: &str) -> RawEntry {
    let source = item
        .source
        .and_then(|s| s.name)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| label.to_string());

    RawEntry {
        title: item.title,
        link: item.link,
        source: Some(source),
        date: DateEvidence {
            published: item.pub_date,
            ..Default::default()
        },
    }
}

fn atom_entry(entry: AtomEntry, label: &str) -> RawEntry {
    let link = entry.alternate_link();
    RawEntry {
        title: entry.title.and_then(|t| t.value),
        link,
        source: Some(label.to_string()),
        date: DateEvidence {
            datetime: entry.published.or(entry.updated),
            ..Default::default()
        },
    }
}
