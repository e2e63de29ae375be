use serde::Serialize;

/// An official notice channel polled by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoticeSource {
    pub key: &'static str,
    pub name: &'static str,
    pub base_url: &'static str,
    pub notice_url: &'static str,
}

/// The municipal housing bureau plus the district bureaus covering the
/// districts that publish subsidized-housing batches most often.
pub fn official_sources() -> Vec<NoticeSource> {
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
            key: "longhua",
            name: "龙华区住建局",
            base_url: "https://www.szlhq.gov.cn",
            notice_url: "https://www.szlhq.gov.cn/lhq/zdfwgb/zfztgb/zxgg38/",
        },
        NoticeSource {
            key: "guangming",
            name: "光明区住建局",
            base_url: "https://www.szgm.gov.cn",
            notice_url: "https://www.szgm.gov.cn/gmjsj/zcfg/",
        },
    ]
}
