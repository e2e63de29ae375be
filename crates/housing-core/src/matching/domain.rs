use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::notices::Notice;

/// Residency status of the applicant household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidencyClass {
    Local,
    NonLocal,
}

impl ResidencyClass {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Local => "深圳户籍",
            Self::NonLocal => "非深户",
        }
    }
}

/// Residency clause a policy may publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidencyRequirement {
    LocalOnly,
    Unrestricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Education {
    Secondary,
    Bachelor,
    Master,
    Doctorate,
}

impl Education {
    /// Advanced degrees unlock the shortened social-insurance band.
    pub const fn is_advanced_degree(self) -> bool {
        matches!(self, Self::Master | Self::Doctorate)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Secondary => "高中及以下",
            Self::Bachelor => "本科",
            Self::Master => "硕士",
            Self::Doctorate => "博士",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyType {
    Single,
    Married,
    MarriedWithChildren,
}

impl FamilyType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "单身",
            Self::Married => "已婚",
            Self::MarriedWithChildren => "已婚有子女",
        }
    }
}

/// Application thresholds published with a policy. An absent field is
/// automatically satisfied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hukou: Option<ResidencyRequirement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_insurance_years_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_max: Option<f64>,
    #[serde(default)]
    pub no_local_property: bool,
}

/// Drive estimate to one landmark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteEstimate {
    pub distance_km: f64,
    pub duration_min: f64,
}

/// Drive estimates from a policy's location to the landmarks that matter for
/// this household. A missing leg means geocoding or routing failed and the
/// consumer treats it as unknown, never as zero distance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_workplace: Option<RouteEstimate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_rail_hub: Option<RouteEstimate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_airport: Option<RouteEstimate>,
}

/// A concrete housing offer under evaluation: a notice enriched with the
/// structured detail fields an announcement carries.
///
/// The per-run match score is deliberately not a field here; it lives on
/// [`super::PolicyMatch`] and is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub title: String,
    pub url: String,
    pub publish_date: NaiveDate,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub housing_type: String,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub total_units: u32,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub price: f64,
    /// Talent-housing batches quote monthly rent per square meter rather
    /// than a sale price.
    #[serde(default)]
    pub is_rent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_start: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_end: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Requirement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_info: Option<TransportInfo>,
}

impl Policy {
    /// Skeleton policy synthesized from a stored notice; detail fields stay
    /// at their defaults until a richer record fills them in.
    pub fn from_notice(notice: &Notice) -> Self {
        Self {
            title: notice.title.clone(),
            url: notice.url.clone(),
            publish_date: notice.publish_date,
            district: String::new(),
            housing_type: String::new(),
            project_name: notice.title.clone(),
            location: String::new(),
            total_units: 0,
            layout: String::new(),
            price: 0.0,
            is_rent: false,
            application_start: None,
            application_end: None,
            requirements: None,
            transport_info: None,
        }
    }
}
