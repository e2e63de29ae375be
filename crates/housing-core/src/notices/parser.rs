use std::sync::OnceLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::domain::Notice;

/// Link text must mention at least one of these terms to count as a
/// housing-policy announcement.
pub const HOUSING_KEYWORDS: [&str; 7] = [
    "安居房",
    "人才房",
    "公租房",
    "保障房",
    "配售",
    "配租",
    "住房",
];

/// Listing pages mix announcements with years of archive links; keep only the
/// first matches per source to hold noise down.
pub const MAX_NOTICES_PER_SOURCE: usize = 20;

/// Structural extraction strategies, tried in order. The first strategy that
/// yields a non-empty candidate set wins; later ones are never consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    NoticeContainers,
    ContentPathAnchors,
    KeywordScan,
}

impl ExtractionStrategy {
    pub const fn ordered() -> [Self; 3] {
        [
            Self::NoticeContainers,
            Self::ContentPathAnchors,
            Self::KeywordScan,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NoticeContainers => "notice-list containers",
            Self::ContentPathAnchors => "content-path anchors",
            Self::KeywordScan => "keyword anchor scan",
        }
    }

    const fn selector(self) -> &'static str {
        match self {
            Self::NoticeContainers => {
                ".notice-list a, .article-list a, ul.list-txt li a, .txt-list li a"
            }
            Self::ContentPathAnchors => r#"a[href*="content/post"], a[href*="/tzgg/"]"#,
            Self::KeywordScan => "a[href]",
        }
    }
}

/// Result of parsing one listing page: the retained notices and the strategy
/// that produced the candidate set (absent when nothing matched at all).
#[derive(Debug)]
pub struct ParseOutcome {
    pub notices: Vec<Notice>,
    pub strategy: Option<ExtractionStrategy>,
}

/// Parse a notice-listing page into candidate [`Notice`] records.
///
/// Malformed entries (missing href, unresolvable link) are skipped without
/// aborting the batch; a notice without a recognizable date falls back to
/// `today`.
pub fn parse_notices(
    html: &str,
    listing_url: &str,
    source_name: &str,
    today: NaiveDate,
) -> ParseOutcome {
    let document = Html::parse_document(html);
    let base = Url::parse(listing_url).ok();
    let fetched_at = Utc::now();

    let Some((strategy, candidates)) = select_candidates(&document) else {
        debug!(source = source_name, "no extraction strategy matched");
        return ParseOutcome {
            notices: Vec::new(),
            strategy: None,
        };
    };
    debug!(
        source = source_name,
        strategy = strategy.label(),
        candidates = candidates.len(),
        "candidate anchors selected"
    );

    let mut notices = Vec::new();
    for anchor in candidates {
        if notices.len() >= MAX_NOTICES_PER_SOURCE {
            break;
        }

        let title = collapse_whitespace(&anchor.text().collect::<String>());
        if title.is_empty() || !contains_housing_keyword(&title) {
            continue;
        }

        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_href(href, base.as_ref()) else {
            continue;
        };

        let publish_date = extract_date(&title)
            .or_else(|| date_from_nearby(anchor))
            .unwrap_or(today);

        notices.push(Notice {
            title,
            url,
            publish_date,
            source_name: source_name.to_string(),
            fetched_at,
        });
    }

    ParseOutcome {
        notices,
        strategy: Some(strategy),
    }
}

fn select_candidates(document: &Html) -> Option<(ExtractionStrategy, Vec<ElementRef<'_>>)> {
    for strategy in ExtractionStrategy::ordered() {
        let Ok(selector) = Selector::parse(strategy.selector()) else {
            continue;
        };

        let candidates: Vec<ElementRef<'_>> = match strategy {
            // The generic scan only counts anchors that already mention a
            // housing keyword; any page has anchors, few have candidates.
            ExtractionStrategy::KeywordScan => document
                .select(&selector)
                .filter(|anchor| {
                    contains_housing_keyword(&anchor.text().collect::<String>())
                })
                .collect(),
            _ => document.select(&selector).collect(),
        };

        if !candidates.is_empty() {
            return Some((strategy, candidates));
        }
    }

    None
}

fn contains_housing_keyword(text: &str) -> bool {
    HOUSING_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Resolve an anchor href against the notice-listing URL. Absolute links pass
/// through; root-relative links resolve against the host; anything else
/// resolves against the listing path.
fn resolve_href(href: &str, base: Option<&Url>) -> Option<String> {
    let trimmed = href.trim();
    if trimmed.is_empty() {
        return None;
    }

    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url.to_string()),
        // javascript:, mailto: and friends are navigation chrome, not notices
        Ok(_) => None,
        Err(_) => base?.join(trimmed).ok().map(|url| url.to_string()),
    }
}

fn date_regex() -> &'static Regex {
    static DATE_RE: OnceLock<Regex> = OnceLock::new();
    DATE_RE.get_or_init(|| {
        Regex::new(r"(\d{4})[-年](\d{1,2})[-月](\d{1,2})").expect("date pattern compiles")
    })
}

/// First `YYYY-M-D` / `YYYY年M月D日` occurrence in the text, if it denotes a
/// real calendar date.
pub(crate) fn extract_date(text: &str) -> Option<NaiveDate> {
    let captures = date_regex().captures(text)?;
    let year = captures[1].parse().ok()?;
    let month = captures[2].parse().ok()?;
    let day = captures[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Look for a date-labeled sibling (span/time/div with a date- or time-like
/// class) next to the anchor, the way municipal list markup usually carries
/// the publication date.
fn date_from_nearby(anchor: ElementRef<'_>) -> Option<NaiveDate> {
    let parent = anchor.parent()?;
    for node in parent.children() {
        let Some(sibling) = ElementRef::wrap(node) else {
            continue;
        };
        if !matches!(sibling.value().name(), "span" | "time" | "div") {
            continue;
        }
        let labeled = sibling
            .value()
            .attr("class")
            .map(|class| class.contains("date") || class.contains("time"))
            .unwrap_or(false);
        if !labeled {
            continue;
        }

        let text = sibling.text().collect::<String>();
        if let Some(date) = extract_date(&text) {
            return Some(date);
        }
    }

    None
}
