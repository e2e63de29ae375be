use std::time::Duration;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::fetch::PageFetcher;

use super::parser::{parse_notices, ExtractionStrategy};
use super::sources::NoticeSource;
use super::store::{MergeSummary, NoticeBackend, NoticeStore, StoreError};

/// Pause between source fetches; the bureaus are slow and easily annoyed.
pub const SOURCE_DELAY: Duration = Duration::from_secs(2);

/// Per-source outcome of one collection run.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source_name: String,
    pub available: bool,
    pub found: usize,
    pub strategy: Option<ExtractionStrategy>,
}

/// Outcome of one full collection run across all sources.
#[derive(Debug)]
pub struct CollectReport {
    pub sources: Vec<SourceReport>,
    pub merged: MergeSummary,
}

/// Fetch every source in turn, parse the listings, and merge the combined
/// batch into the store.
///
/// Sources are visited strictly one at a time with a fixed politeness delay.
/// A source that stays unreachable after the fetcher's bounded retries is
/// skipped and marked unavailable; it never aborts the run.
pub async fn collect_notices<F, B>(
    fetcher: &F,
    store: &NoticeStore<B>,
    sources: &[NoticeSource],
    today: NaiveDate,
) -> Result<CollectReport, StoreError>
where
    F: PageFetcher,
    B: NoticeBackend,
{
    let mut batch = Vec::new();
    let mut reports = Vec::with_capacity(sources.len());

    for (index, source) in sources.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(SOURCE_DELAY).await;
        }

        info!(source = source.name, url = source.notice_url, "fetching notice listing");
        match fetcher.fetch(source.notice_url).await {
            Ok(html) => {
                let outcome = parse_notices(&html, source.notice_url, source.name, today);
                info!(
                    source = source.name,
                    found = outcome.notices.len(),
                    strategy = outcome.strategy.map(ExtractionStrategy::label),
                    "listing parsed"
                );
                reports.push(SourceReport {
                    source_name: source.name.to_string(),
                    available: true,
                    found: outcome.notices.len(),
                    strategy: outcome.strategy,
                });
                batch.extend(outcome.notices);
            }
            Err(err) => {
                warn!(source = source.name, error = %err, "source unavailable this run");
                reports.push(SourceReport {
                    source_name: source.name.to_string(),
                    available: false,
                    found: 0,
                    strategy: None,
                });
            }
        }
    }

    let merged = store.merge(batch)?;
    Ok(CollectReport {
        sources: reports,
        merged,
    })
}
