use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::UserProfile;

use super::commute::CommuteBand;
use super::domain::Policy;

/// The four scoring dimensions, each capped so the total stays within 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    District,
    Commute,
    Recency,
    Supply,
}

impl ScoreFactor {
    pub const fn ordered() -> [Self; 4] {
        [Self::District, Self::Commute, Self::Recency, Self::Supply]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::District => "District preference",
            Self::Commute => "Workplace commute",
            Self::Recency => "Notice recency",
            Self::Supply => "Unit supply",
        }
    }

    pub const fn cap(self) -> u8 {
        match self {
            Self::District => 40,
            Self::Commute => 25,
            Self::Recency => 20,
            Self::Supply => 15,
        }
    }
}

/// Discrete contribution to a match score, kept for transparent report
/// breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: u8,
    pub notes: String,
}

/// Weighted match score for one policy, 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub components: Vec<ScoreComponent>,
    pub total: u8,
}

pub(crate) fn score_policy(
    policy: &Policy,
    profile: &UserProfile,
    today: NaiveDate,
) -> ScoreBreakdown {
    let components = vec![
        district_component(policy, profile),
        commute_component(policy),
        recency_component(policy, today),
        supply_component(policy),
    ];
    let total = components.iter().map(|component| component.points).sum();

    ScoreBreakdown { components, total }
}

fn district_component(policy: &Policy, profile: &UserProfile) -> ScoreComponent {
    let position = profile
        .preferences
        .preferred_districts
        .iter()
        .position(|district| district == &policy.district);

    match position {
        Some(index) => ScoreComponent {
            factor: ScoreFactor::District,
            points: (ScoreFactor::District.cap() as usize)
                .saturating_sub(index.saturating_mul(5)) as u8,
            notes: format!("district {} is preference #{}", policy.district, index + 1),
        },
        None => ScoreComponent {
            factor: ScoreFactor::District,
            points: 0,
            notes: format!("district {} not among preferred districts", policy.district),
        },
    }
}

fn commute_component(policy: &Policy) -> ScoreComponent {
    let leg = policy
        .transport_info
        .as_ref()
        .and_then(|transport| transport.to_workplace.as_ref());

    match leg {
        Some(route) => {
            let band = CommuteBand::classify(route.duration_min);
            ScoreComponent {
                factor: ScoreFactor::Commute,
                points: band.points(),
                notes: format!(
                    "about {:.0} min drive to workplace ({})",
                    route.duration_min,
                    band.label()
                ),
            }
        }
        None => ScoreComponent {
            factor: ScoreFactor::Commute,
            points: 0,
            notes: "no workplace commute data".to_string(),
        },
    }
}

fn recency_component(policy: &Policy, today: NaiveDate) -> ScoreComponent {
    let days_ago = (today - policy.publish_date).num_days();
    let points = if days_ago <= 7 {
        20
    } else if days_ago <= 30 {
        15
    } else if days_ago <= 90 {
        10
    } else {
        5
    };

    ScoreComponent {
        factor: ScoreFactor::Recency,
        points,
        notes: format!("published {days_ago} day(s) ago"),
    }
}

fn supply_component(policy: &Policy) -> ScoreComponent {
    let units = policy.total_units;
    let points = if units >= 500 {
        15
    } else if units >= 200 {
        12
    } else if units >= 100 {
        10
    } else {
        8
    };

    ScoreComponent {
        factor: ScoreFactor::Supply,
        points,
        notes: format!("{units} units on offer"),
    }
}
