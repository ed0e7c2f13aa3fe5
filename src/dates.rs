//! Best-effort resolution of article dates into one orderable instant.
//!
//! Feeds and result pages describe dates in whatever form they like: an
//! ISO-8601 `datetime` attribute, an RFC-822 `pubDate`, a loose
//! `"Oct 2, 2024"`, or a relative phrase such as `"3 hours ago"`. The
//! [`DateResolver`] tries each strategy in a fixed order and always produces
//! an answer:
//!
//! 1. **Attribute**: the machine-readable value
//! 2. **Absolute**: the published text, through a tolerant parser
//! 3. **Relative**: `"N minutes|hours|days ago"` or `"yesterday"`, against "now",
//!    read from the relative field or, failing that, the published text
//! 4. **Fallback**: "now"
//!
//! Zone-less values are read in the resolver's reference timezone. "Now" is
//! captured once per run and handed in, so a run resolves every article
//! against the same instant.

use crate::models::DateEvidence;
use chrono::{
    DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// `N <unit> ago`, with `a`/`an` standing in for one.
static RELATIVE_AGO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+|an?)\s+(minute|min|hour|hr|day)s?\s+ago\b")
        .expect("relative date pattern is valid")
});

static YESTERDAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\byesterday\b").expect("yesterday pattern is valid"));

/// Layouts carrying their own numeric offset.
const ZONED_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
];

const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%b %d, %Y %I:%M %p",
    "%B %d, %Y %I:%M %p",
    "%b %d, %Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%a, %b %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%m/%d/%Y",
];

/// ISO-8601 forms beyond strict RFC 3339: basic offsets, minute precision.
const ISO_ZONED_LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];

/// Suffixes meaning the preceding zone-less text is in UTC.
const UTC_MARKERS: &[&str] = &[" GMT", " UTC", " UT", "Z"];

/// Which strategy produced an article's timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Attribute,
    Absolute,
    Relative,
    Fallback,
}

/// The outcome of [`DateResolver::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub at: DateTime<Utc>,
    pub via: Resolution,
}

/// Turns [`DateEvidence`] into a single instant. Never fails.
#[derive(Debug, Clone)]
pub struct DateResolver {
    tz: Tz,
    now: DateTime<Utc>,
}

impl DateResolver {
    /// Create a resolver reading zone-less values in `tz` and relative
    /// phrases against `now`.
    pub fn new(tz: Tz, now: DateTime<Utc>) -> Self {
        Self { tz, now }
    }

    /// Resolve the evidence, first success wins.
    pub fn resolve(&self, evidence: &DateEvidence) -> Resolved {
        if let Some(raw) = non_empty(&evidence.datetime) {
            match self.parse_attribute(raw) {
                Some(at) => return Resolved { at, via: Resolution::Attribute },
                None => debug!(%raw, "Datetime attribute did not parse"),
            }
        }

        if let Some(raw) = non_empty(&evidence.published) {
            match self.parse_absolute(raw) {
                Some(at) => return Resolved { at, via: Resolution::Absolute },
                None => debug!(%raw, "Published text is not an absolute date"),
            }
        }

        // A relative phrase may sit in either field; extractors cannot always tell.
        let relative = [&evidence.relative, &evidence.published]
            .into_iter()
            .filter_map(non_empty)
            .find_map(|raw| {
                let at = self.parse_relative(raw);
                if at.is_none() {
                    debug!(%raw, "Relative phrase did not parse");
                }
                at
            });
        if let Some(at) = relative {
            return Resolved { at, via: Resolution::Relative };
        }

        if !evidence.is_empty() {
            warn!(
                datetime = ?evidence.datetime,
                published = ?evidence.published,
                relative = ?evidence.relative,
                "Unparseable date evidence; using current time"
            );
        }
        Resolved {
            at: self.now,
            via: Resolution::Fallback,
        }
    }

    /// Parse a machine-readable (ISO-8601) value.
    pub fn parse_attribute(&self, raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Some(dt) = DateTime::parse_from_rfc3339(raw).ok().or_else(|| {
            ISO_ZONED_LAYOUTS
                .iter()
                .find_map(|layout| DateTime::parse_from_str(raw, layout).ok())
        }) {
            return Some(dt.with_timezone(&Utc));
        }

        let (body, is_utc) = strip_utc_marker(raw);
        let naive = DATETIME_LAYOUTS[..4]
            .iter()
            .find_map(|layout| NaiveDateTime::parse_from_str(body, layout).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(body, "%Y-%m-%d")
                    .ok()
                    .map(|d| d.and_time(NaiveTime::MIN))
            })?;

        if is_utc {
            Some(Utc.from_utc_datetime(&naive))
        } else {
            self.localize(naive)
        }
    }

    /// Parse free text in absolute form with a tolerant set of layouts.
    pub fn parse_absolute(&self, raw: &str) -> Option<DateTime<Utc>> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Some(dt) = ZONED_LAYOUTS
            .iter()
            .find_map(|layout| DateTime::parse_from_str(text, layout).ok())
        {
            return Some(dt.with_timezone(&Utc));
        }

        let (body, is_utc) = strip_utc_marker(text);
        let naive = DATETIME_LAYOUTS
            .iter()
            .find_map(|layout| NaiveDateTime::parse_from_str(body, layout).ok())
            .or_else(|| {
                DATE_LAYOUTS
                    .iter()
                    .find_map(|layout| NaiveDate::parse_from_str(body, layout).ok())
                    .map(|d| d.and_time(NaiveTime::MIN))
            })?;

        if is_utc {
            Some(Utc.from_utc_datetime(&naive))
        } else {
            self.localize(naive)
        }
    }

    /// Interpret `"N <unit> ago"` or `"yesterday"` against "now".
    pub fn parse_relative(&self, raw: &str) -> Option<DateTime<Utc>> {
        let local_now = self.now.with_timezone(&self.tz);

        if let Some(caps) = RELATIVE_AGO.captures(raw) {
            let amount = match caps[1].to_ascii_lowercase().as_str() {
                "a" | "an" => 1,
                digits => digits.parse::<i64>().ok()?,
            };
            let unit = caps[2].to_ascii_lowercase();
            let then = match unit.as_str() {
                "minute" | "min" => local_now.checked_sub_signed(TimeDelta::try_minutes(amount)?)?,
                "hour" | "hr" => local_now.checked_sub_signed(TimeDelta::try_hours(amount)?)?,
                "day" => local_now.checked_sub_days(Days::new(u64::try_from(amount).ok()?))?,
                _ => return None,
            };
            return Some(then.with_timezone(&Utc));
        }

        if YESTERDAY.is_match(raw) {
            return local_now
                .checked_sub_days(Days::new(1))
                .map(|dt| dt.with_timezone(&Utc));
        }

        None
    }

    fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn strip_utc_marker(text: &str) -> (&str, bool) {
    UTC_MARKERS
        .iter()
        .find_map(|marker| text.strip_suffix(marker))
        .map(|body| (body.trim_end(), true))
        .unwrap_or((text, false))
}
