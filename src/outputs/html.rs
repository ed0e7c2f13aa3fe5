//! HTML fragment rendering.
//!
//! Produces the markup that replaces the template placeholder: a "last
//! updated" line followed by either the article list or a "no news" notice.
//! All text that came from the outside (titles, sources, dates, links) is
//! escaped before it is embedded.

use crate::models::Article;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use quick_xml::escape::escape;

/// Marker text shown when there is nothing to list.
pub const NO_NEWS_TEXT: &str = "No news found.";

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M %Z";

/// Display settings for [`render_fragment`].
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub display_timezone: Tz,
    /// Render at most this many articles.
    pub max_articles: Option<usize>,
}

/// Render a sorted article list into an HTML fragment.
pub fn render_fragment(
    articles: &[Article],
    generated_at: DateTime<Utc>,
    options: &RenderOptions,
) -> String {
    let mut html = format!(
        "<p class=\"last-updated\">Last updated: {}</p>\n",
        format_instant(generated_at, options.display_timezone)
    );

    let limit = options.max_articles.unwrap_or(articles.len()).min(articles.len());
    let shown = &articles[..limit];
    if shown.is_empty() {
        html.push_str(&format!("<p class=\"no-news\">{NO_NEWS_TEXT}</p>\n"));
        return html;
    }

    html.push_str("<ul class=\"news-list\">\n");
    for article in shown {
        html.push_str(&render_item(article, options.display_timezone));
    }
    html.push_str("</ul>\n");
    html
}

fn render_item(article: &Article, tz: Tz) -> String {
    let date = article
        .raw_date_text
        .clone()
        .unwrap_or_else(|| format_instant(article.resolved_at, tz));

    format!(
        "  <li><a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a><br><small>{} &middot; {}</small></li>\n",
        escape(&article.link),
        escape(&article.title),
        escape(&article.source),
        escape(&date),
    )
}

/// Human-readable instant in the display timezone.
pub fn format_instant(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format(DISPLAY_FORMAT).to_string()
}
