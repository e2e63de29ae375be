use std::collections::HashMap;

use chrono::NaiveDate;
use housing_core::fetch::{FetchError, PageFetcher};
use housing_core::notices::sources::NoticeSource;
use housing_core::notices::{collect_notices, ExtractionStrategy, JsonFileBackend, NoticeStore};

const CITY_LISTING: &str = r#"
    <div class="notice-list">
        <ul>
            <li><a href="content/post_12547917.html">龙华区缙熙园安居房配售公告 2025-01-19</a></li>
            <li><a href="/xxgk/tzgg/content/post_12538544.html">帆湾海寓安居房配售公告 2025-01-15</a></li>
            <li><a href="content/post_555.html">燃气安全宣传周活动安排</a></li>
        </ul>
    </div>
"#;

const DISTRICT_LISTING: &str = r#"
    <ul>
        <li>
            <a href="https://www.szft.gov.cn/bmxx/qjsj/tzgg/content/post_12406403.html">天骄福苑人才房配租公告</a>
            <span class="date">2025-01-20</span>
        </li>
    </ul>
"#;

struct CannedFetcher {
    pages: HashMap<&'static str, &'static str>,
}

impl CannedFetcher {
    fn with_listings() -> Self {
        let mut pages = HashMap::new();
        pages.insert("https://zjj.sz.gov.cn/xxgk/tzgg/", CITY_LISTING);
        pages.insert("https://www.szft.gov.cn/bmxx/qjsj/tzgg/", DISTRICT_LISTING);
        Self { pages }
    }
}

impl PageFetcher for CannedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.pages
            .get(url)
            .map(|html| html.to_string())
            .ok_or_else(|| FetchError::Unavailable(format!("no canned page for {url}")))
    }
}

fn test_sources() -> Vec<NoticeSource> {
    vec![
        NoticeSource {
            key: "sz_zjj",
            name: "深圳市住房和建设局",
            base_url: "https://zjj.sz.gov.cn",
            notice_url: "https://zjj.sz.gov.cn/xxgk/tzgg/",
        },
        NoticeSource {
            key: "futian",
            name: "福田区住建局",
            base_url: "https://www.szft.gov.cn",
            notice_url: "https://www.szft.gov.cn/bmxx/qjsj/tzgg/",
        },
        NoticeSource {
            key: "offline",
            name: "光明区住建局",
            base_url: "https://www.szgm.gov.cn",
            notice_url: "https://www.szgm.gov.cn/gmjsj/zcfg/",
        },
    ]
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 22).expect("valid date")
}

#[tokio::test(start_paused = true)]
async fn collects_parses_and_merges_across_sources() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = NoticeStore::new(JsonFileBackend::new(dir.path().join("notices.json")));
    let fetcher = CannedFetcher::with_listings();

    let report = collect_notices(&fetcher, &store, &test_sources(), today())
        .await
        .expect("collection succeeds");

    // two sources answered, the third is skipped without failing the run
    assert_eq!(report.sources.len(), 3);
    assert!(report.sources[0].available);
    assert_eq!(report.sources[0].found, 2);
    assert_eq!(
        report.sources[0].strategy,
        Some(ExtractionStrategy::NoticeContainers)
    );
    assert!(report.sources[1].available);
    assert_eq!(
        report.sources[1].strategy,
        Some(ExtractionStrategy::ContentPathAnchors)
    );
    assert!(!report.sources[2].available);

    assert_eq!(report.merged.added, 3);
    assert_eq!(report.merged.total, 3);

    let stored = store.all().expect("store loads");
    assert_eq!(stored.len(), 3);
    // relative href resolved against the listing path
    assert_eq!(
        stored[0].url,
        "https://zjj.sz.gov.cn/xxgk/tzgg/content/post_12547917.html"
    );
    // root-relative href resolved against the host
    assert_eq!(
        stored[1].url,
        "https://zjj.sz.gov.cn/xxgk/tzgg/content/post_12538544.html"
    );
    // title date beats the run date; sibling date fills in when titles lack one
    assert_eq!(
        stored[0].publish_date,
        NaiveDate::from_ymd_opt(2025, 1, 19).expect("valid date")
    );
    assert_eq!(
        stored[2].publish_date,
        NaiveDate::from_ymd_opt(2025, 1, 20).expect("valid date")
    );
}

#[tokio::test(start_paused = true)]
async fn repeated_collection_is_idempotent_and_first_write_wins() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = NoticeStore::new(JsonFileBackend::new(dir.path().join("notices.json")));

    let first = collect_notices(
        &CannedFetcher::with_listings(),
        &store,
        &test_sources(),
        today(),
    )
    .await
    .expect("first run succeeds");
    assert_eq!(first.merged.added, 3);

    let before = store.all().expect("store loads");

    // the same URL comes back with a rewritten title; the stored record wins
    let mut pages = HashMap::new();
    pages.insert(
        "https://zjj.sz.gov.cn/xxgk/tzgg/",
        r#"<div class="notice-list"><ul>
            <li><a href="content/post_12547917.html">（更正）缙熙园安居房配售公告 2025-01-21</a></li>
        </ul></div>"#,
    );
    let second = collect_notices(&CannedFetcher { pages }, &store, &test_sources(), today())
        .await
        .expect("second run succeeds");

    assert_eq!(second.merged.added, 0);
    assert_eq!(second.merged.total, 3);

    let after = store.all().expect("store loads");
    assert_eq!(before, after);
    assert!(after[0].title.starts_with("龙华区缙熙园"));
}
