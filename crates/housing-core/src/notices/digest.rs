use chrono::NaiveDate;

use super::domain::Notice;

/// Announcement types that are actionable right now (sale/rental allocation,
/// subscription, unit selection); surfaced separately at the end of a digest.
pub const PRIORITY_KEYWORDS: [&str; 4] = ["配售", "配租", "认购", "选房"];

/// Administrative chatter that slips through the housing keyword filter but
/// is useless in a digest.
const NOISE_KEYWORDS: [&str; 5] = ["采购", "内部", "会议", "培训", "资格考试"];

/// Notices from one source on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DigestGroup {
    pub date: NaiveDate,
    pub source_name: String,
    pub notices: Vec<Notice>,
}

/// Digest view over a date range: noise-filtered groups per date and source,
/// newest first, plus the priority picks worth acting on.
#[derive(Debug)]
pub struct NoticeDigest {
    pub since: NaiveDate,
    pub groups: Vec<DigestGroup>,
    pub priority: Vec<Notice>,
}

impl NoticeDigest {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn notice_count(&self) -> usize {
        self.groups.iter().map(|group| group.notices.len()).sum()
    }
}

/// Build the digest for notices already filtered to the range (the store's
/// `recent` query supplies them).
pub fn build_digest(notices: &[Notice], since: NaiveDate) -> NoticeDigest {
    let mut groups: Vec<DigestGroup> = Vec::new();

    for notice in notices {
        if is_noise(&notice.title) {
            continue;
        }

        let slot = groups.iter_mut().find(|group| {
            group.date == notice.publish_date && group.source_name == notice.source_name
        });
        match slot {
            Some(group) => group.notices.push(notice.clone()),
            None => groups.push(DigestGroup {
                date: notice.publish_date,
                source_name: notice.source_name.clone(),
                notices: vec![notice.clone()],
            }),
        }
    }

    groups.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.source_name.cmp(&b.source_name))
    });

    let priority = notices
        .iter()
        .filter(|notice| !is_noise(&notice.title) && is_priority(&notice.title))
        .cloned()
        .collect();

    NoticeDigest {
        since,
        groups,
        priority,
    }
}

fn is_noise(title: &str) -> bool {
    NOISE_KEYWORDS.iter().any(|keyword| title.contains(keyword))
}

fn is_priority(title: &str) -> bool {
    PRIORITY_KEYWORDS
        .iter()
        .any(|keyword| title.contains(keyword))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn notice(title: &str, source: &str, day: u32) -> Notice {
        Notice {
            title: title.to_string(),
            url: format!("https://a.test/{source}/{day}/{title}"),
            publish_date: NaiveDate::from_ymd_opt(2025, 1, day).expect("valid date"),
            source_name: source.to_string(),
            fetched_at: Utc.with_ymd_and_hms(2025, 1, 22, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn groups_by_date_and_source_newest_first() {
        let notices = vec![
            notice("安居房配售公告", "市局", 19),
            notice("人才房供应计划", "市局", 21),
            notice("公租房配租公告", "福田", 21),
            notice("保障房政策解读", "市局", 19),
        ];

        let since = NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date");
        let digest = build_digest(&notices, since);

        assert_eq!(digest.groups.len(), 3);
        assert_eq!(
            digest.groups[0].date,
            NaiveDate::from_ymd_opt(2025, 1, 21).expect("valid date")
        );
        assert_eq!(digest.groups[2].notices.len(), 2);
        assert_eq!(digest.notice_count(), 4);
    }

    #[test]
    fn filters_administrative_noise() {
        let notices = vec![
            notice("安居房配售公告", "市局", 19),
            notice("住房专项采购结果公示", "市局", 19),
            notice("住房保障资格考试安排", "市局", 19),
        ];

        let since = NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date");
        let digest = build_digest(&notices, since);

        assert_eq!(digest.notice_count(), 1);
        assert!(digest.priority.iter().all(|n| !n.title.contains("采购")));
    }

    #[test]
    fn priority_picks_carry_allocation_keywords() {
        let notices = vec![
            notice("缙熙园安居房配售通告", "市局", 19),
            notice("住房发展白皮书", "市局", 19),
            notice("天骄福苑认购指引", "福田", 20),
        ];

        let since = NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date");
        let digest = build_digest(&notices, since);

        let titles: Vec<&str> = digest.priority.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["缙熙园安居房配售通告", "天骄福苑认购指引"]);
    }
}
