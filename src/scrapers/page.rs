//! Search-results page scraping.
//!
//! A result page is a list of repeating containers, each holding an anchor
//! (title + link), a publisher label, and a date element. The selectors for
//! these come from configuration because the markup belongs to someone else.
//!
//! A container whose sub-element is missing still yields an entry; the gaps
//! are filled later with defaults or rejected by validation.

use crate::config::CompiledSelectors;
use crate::models::{DateEvidence, RawEntry};
use scraper::{ElementRef, Html};
use tracing::{debug, instrument};

/// Extract raw entries from a search-results page.
#[instrument(level = "debug", skip_all, fields(bytes = body.len()))]
pub fn parse_page(body: &str, selectors: &CompiledSelectors) -> Vec<RawEntry> {
    let document = Html::parse_document(body);

    let entries: Vec<RawEntry> = document
        .select(&selectors.container)
        .map(|container| extract_entry(container, selectors))
        .collect();

    debug!(containers = entries.len(), "Scanned result page");
    entries
}

fn extract_entry(container: ElementRef<'_>, selectors: &CompiledSelectors) -> RawEntry {
    let anchor = container.select(&selectors.title_link).next();

    let title = anchor.map(element_text).filter(|t| !t.is_empty());
    let link = anchor
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string);

    let source = container
        .select(&selectors.source)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty());

    let date = container
        .select(&selectors.date)
        .next()
        .map(|el| DateEvidence {
            datetime: el.value().attr("datetime").map(str::to_string),
            published: Some(element_text(el)).filter(|t| !t.is_empty()),
            // Compact labels like "3h" spell the phrase out for screen readers.
            relative: el.value().attr("aria-label").map(str::to_string),
        })
        .unwrap_or_default();

    RawEntry {
        title,
        link,
        source,
        date,
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
