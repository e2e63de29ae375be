pub mod commute;
pub mod domain;
mod eligibility;
pub mod report;
mod scorer;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::config::UserProfile;

pub use commute::CommuteBand;
pub use eligibility::{
    check_eligibility, Eligibility, IneligibilityReason, DEGREE_DISCOUNT_YEARS,
};
pub use scorer::{ScoreBreakdown, ScoreComponent, ScoreFactor};

use domain::Policy;

/// One policy after the eligibility gate and scoring rubric ran against it.
/// The score lives here, per run; it is never written back into the policy
/// record.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyMatch {
    pub policy: Policy,
    pub eligibility: Eligibility,
    pub score: ScoreBreakdown,
}

/// Applies the configured profile to candidate policies: eligibility gate,
/// weighted scoring, and a stable descending rank.
pub struct MatchEngine {
    profile: UserProfile,
}

impl MatchEngine {
    pub fn new(profile: UserProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Evaluate a single policy, keeping the verdict and the full score
    /// breakdown regardless of eligibility.
    pub fn evaluate(&self, policy: Policy, today: NaiveDate) -> PolicyMatch {
        let eligibility = check_eligibility(policy.requirements.as_ref(), &self.profile);
        let score = scorer::score_policy(&policy, &self.profile, today);

        PolicyMatch {
            policy,
            eligibility,
            score,
        }
    }

    /// Eligible policies ranked by score, descending. The sort is stable, so
    /// equal-score policies keep their incoming relative order.
    pub fn rank(&self, policies: Vec<Policy>, today: NaiveDate) -> Vec<PolicyMatch> {
        let mut matches: Vec<PolicyMatch> = policies
            .into_iter()
            .map(|policy| self.evaluate(policy, today))
            .filter(|candidate| candidate.eligibility.is_eligible())
            .collect();

        matches.sort_by(|a, b| b.score.total.cmp(&a.score.total));
        matches
    }
}

/// Error raised while loading a policies file.
#[derive(Debug, thiserror::Error)]
pub enum PolicyLoadError {
    #[error("failed to read policies file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("policies file {path} holds invalid JSON: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Load candidate policies from a JSON file (a list of policy records).
pub fn load_policies(path: &Path) -> Result<Vec<Policy>, PolicyLoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| PolicyLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| PolicyLoadError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use crate::config::{Assets, BasicInfo, Preferences, Transportation};
    use crate::matching::domain::{
        Education, FamilyType, Requirement, ResidencyClass, ResidencyRequirement,
    };

    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            basic_info: BasicInfo {
                hukou: ResidencyClass::Local,
                age: 31,
                social_insurance_years: 5,
                education: Education::Master,
                family_type: FamilyType::Married,
            },
            assets: Assets {
                annual_income: 600_000.0,
                has_local_property: false,
                total_assets: 1_200_000.0,
            },
            preferences: Preferences {
                preferred_districts: vec!["龙华".to_string(), "福田".to_string()],
                housing_types: vec!["安居房".to_string()],
                preferred_layout: "两房一厅".to_string(),
                budget_min: 2_000_000.0,
                budget_max: 4_000_000.0,
            },
            transportation: Transportation {
                workplace_address: "坂田天安云谷".to_string(),
                workplace_name: None,
            },
        }
    }

    fn policy(url: &str, district: &str, units: u32) -> Policy {
        Policy {
            title: format!("{district}安居房配售公告"),
            url: url.to_string(),
            publish_date: NaiveDate::from_ymd_opt(2025, 1, 19).expect("valid date"),
            district: district.to_string(),
            housing_type: "安居房".to_string(),
            project_name: String::new(),
            location: String::new(),
            total_units: units,
            layout: "两房一厅".to_string(),
            price: 28_000.0,
            is_rent: false,
            application_start: None,
            application_end: None,
            requirements: None,
            transport_info: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 22).expect("valid date")
    }

    #[test]
    fn rank_filters_ineligible_policies_and_sorts_descending() {
        let engine = MatchEngine::new(profile());

        let mut gated = policy("https://a.test/gated", "福田", 700);
        gated.requirements = Some(Requirement {
            income_max: Some(400_000.0),
            ..Requirement::default()
        });

        let ranked = engine.rank(
            vec![
                policy("https://a.test/nanshan", "南山", 100),
                gated,
                policy("https://a.test/longhua", "龙华", 100),
            ],
            today(),
        );

        let urls: Vec<&str> = ranked
            .iter()
            .map(|candidate| candidate.policy.url.as_str())
            .collect();
        assert_eq!(urls, vec!["https://a.test/longhua", "https://a.test/nanshan"]);
        assert!(ranked[0].score.total > ranked[1].score.total);
    }

    #[test]
    fn equal_scores_keep_their_incoming_order() {
        let engine = MatchEngine::new(profile());

        let ranked = engine.rank(
            vec![
                policy("https://a.test/first", "龙华", 150),
                policy("https://a.test/second", "龙华", 150),
                policy("https://a.test/third", "龙华", 150),
            ],
            today(),
        );

        let urls: Vec<&str> = ranked
            .iter()
            .map(|candidate| candidate.policy.url.as_str())
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://a.test/first",
                "https://a.test/second",
                "https://a.test/third"
            ]
        );
    }

    #[test]
    fn evaluate_scores_ineligible_policies_too() {
        let engine = MatchEngine::new(profile());
        let mut gated = policy("https://a.test/gated", "龙华", 331);
        gated.requirements = Some(Requirement {
            hukou: Some(ResidencyRequirement::LocalOnly),
            income_max: Some(100_000.0),
            ..Requirement::default()
        });

        let evaluated = engine.evaluate(gated, today());
        assert!(!evaluated.eligibility.is_eligible());
        assert!(evaluated.score.total > 0);
    }
}
