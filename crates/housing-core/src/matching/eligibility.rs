use serde::{Deserialize, Serialize};

use crate::config::UserProfile;

use super::domain::{FamilyType, Requirement, ResidencyClass, ResidencyRequirement};

/// Holders of an advanced degree qualify with this many social-insurance
/// years even when the policy asks for more. A step exception, not a sliding
/// scale.
pub const DEGREE_DISCOUNT_YEARS: u32 = 3;

/// Verdict of the eligibility gate for one policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Eligibility {
    Eligible,
    Ineligible(IneligibilityReason),
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }

    pub fn summary(&self) -> String {
        match self {
            Self::Eligible => "meets every published requirement".to_string(),
            Self::Ineligible(reason) => reason.summary(),
        }
    }
}

/// The first failing rule, in the fixed evaluation order. Later failures are
/// never collected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IneligibilityReason {
    ResidencyMismatch {
        required: ResidencyRequirement,
        actual: ResidencyClass,
    },
    InsufficientSocialInsurance {
        required_years: u32,
        actual_years: u32,
    },
    BelowMinimumAge {
        required: u32,
        actual: u32,
    },
    IncomeAboveLimit {
        limit: f64,
        actual: f64,
    },
    OwnsLocalProperty,
}

impl IneligibilityReason {
    pub fn summary(&self) -> String {
        match self {
            IneligibilityReason::ResidencyMismatch { actual, .. } => {
                format!("requires local Shenzhen hukou (currently {})", actual.label())
            }
            IneligibilityReason::InsufficientSocialInsurance {
                required_years,
                actual_years,
            } => format!(
                "social insurance {actual_years} year(s) below the required {required_years}"
            ),
            IneligibilityReason::BelowMinimumAge { required, actual } => format!(
                "single applicants must be at least {required} (currently {actual})"
            ),
            IneligibilityReason::IncomeAboveLimit { limit, actual } => format!(
                "annual income {actual:.0} exceeds the {limit:.0} ceiling"
            ),
            IneligibilityReason::OwnsLocalProperty => {
                "household already owns local property".to_string()
            }
        }
    }
}

/// Evaluate a policy's requirement block against the profile.
///
/// Rules run in a fixed order (residency, social insurance, age, income,
/// property) and the first failure short-circuits. A policy without a
/// requirement block is always eligible.
pub fn check_eligibility(requirement: Option<&Requirement>, profile: &UserProfile) -> Eligibility {
    let Some(requirement) = requirement else {
        return Eligibility::Eligible;
    };

    let basic = &profile.basic_info;

    if let Some(residency) = requirement.hukou {
        if residency == ResidencyRequirement::LocalOnly && basic.hukou != ResidencyClass::Local {
            return Eligibility::Ineligible(IneligibilityReason::ResidencyMismatch {
                required: residency,
                actual: basic.hukou,
            });
        }
    }

    if let Some(minimum) = requirement.social_insurance_years_min {
        let effective = if basic.education.is_advanced_degree() {
            minimum.min(DEGREE_DISCOUNT_YEARS)
        } else {
            minimum
        };
        if basic.social_insurance_years < effective {
            return Eligibility::Ineligible(IneligibilityReason::InsufficientSocialInsurance {
                required_years: effective,
                actual_years: basic.social_insurance_years,
            });
        }
    }

    // The bureaus only apply the age floor to single applicants; married
    // households qualify through the household itself.
    if let Some(age_min) = requirement.age_min {
        if basic.family_type == FamilyType::Single && basic.age < age_min {
            return Eligibility::Ineligible(IneligibilityReason::BelowMinimumAge {
                required: age_min,
                actual: basic.age,
            });
        }
    }

    if let Some(income_max) = requirement.income_max {
        if profile.assets.annual_income > income_max {
            return Eligibility::Ineligible(IneligibilityReason::IncomeAboveLimit {
                limit: income_max,
                actual: profile.assets.annual_income,
            });
        }
    }

    if requirement.no_local_property && profile.assets.has_local_property {
        return Eligibility::Ineligible(IneligibilityReason::OwnsLocalProperty);
    }

    Eligibility::Eligible
}
