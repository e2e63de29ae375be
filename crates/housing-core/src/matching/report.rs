use chrono::NaiveDate;
use serde::Serialize;

use super::commute::CommuteBand;
use super::domain::{Policy, RouteEstimate};
use super::{PolicyMatch, ScoreComponent};

/// Landmarks the transport block reports against, besides the workplace.
pub const RAIL_HUB_LABEL: &str = "深圳北站";
pub const AIRPORT_LABEL: &str = "宝安机场";

/// One score term prepared for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreComponentView {
    pub factor_label: &'static str,
    pub points: u8,
    pub cap: u8,
    pub notes: String,
}

/// One drive leg prepared for rendering, classified through the shared
/// commute bands.
#[derive(Debug, Clone, Serialize)]
pub struct TransportLegView {
    pub landmark: String,
    pub distance_km: f64,
    pub duration_min: f64,
    pub band_label: &'static str,
    pub band_symbol: &'static str,
}

/// A ranked match flattened for the terminal report.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReportEntry {
    pub rank: usize,
    pub recommendation: &'static str,
    pub project_name: String,
    pub district: String,
    pub url: String,
    pub location: String,
    pub housing_type: String,
    pub layout: String,
    pub price_label: String,
    pub total_units: u32,
    pub application_start: Option<NaiveDate>,
    pub application_end: Option<NaiveDate>,
    pub total_score: u8,
    pub components: Vec<ScoreComponentView>,
    pub transport: Vec<TransportLegView>,
}

impl PolicyMatch {
    /// Flatten this match for rendering. `rank` is 1-based;
    /// `workplace_label` names the first transport landmark.
    pub fn report_entry(&self, rank: usize, workplace_label: &str) -> MatchReportEntry {
        let policy = &self.policy;
        let project_name = if policy.project_name.is_empty() {
            policy.title.clone()
        } else {
            policy.project_name.clone()
        };

        let mut transport = Vec::new();
        if let Some(info) = &policy.transport_info {
            push_leg(&mut transport, workplace_label, info.to_workplace.as_ref());
            push_leg(&mut transport, RAIL_HUB_LABEL, info.to_rail_hub.as_ref());
            push_leg(&mut transport, AIRPORT_LABEL, info.to_airport.as_ref());
        }

        MatchReportEntry {
            rank,
            recommendation: recommendation_for(rank),
            project_name,
            district: policy.district.clone(),
            url: policy.url.clone(),
            location: policy.location.clone(),
            housing_type: policy.housing_type.clone(),
            layout: policy.layout.clone(),
            price_label: price_label(policy),
            total_units: policy.total_units,
            application_start: policy.application_start,
            application_end: policy.application_end,
            total_score: self.score.total,
            components: self.score.components.iter().map(component_view).collect(),
            transport,
        }
    }
}

/// Report entries for an already ranked list.
pub fn report_entries(matches: &[PolicyMatch], workplace_label: &str) -> Vec<MatchReportEntry> {
    matches
        .iter()
        .enumerate()
        .map(|(index, candidate)| candidate.report_entry(index + 1, workplace_label))
        .collect()
}

fn push_leg(legs: &mut Vec<TransportLegView>, landmark: &str, route: Option<&RouteEstimate>) {
    // failed geocoding/routing leaves the leg out of the report entirely
    let Some(route) = route else {
        return;
    };
    let band = CommuteBand::classify(route.duration_min);
    legs.push(TransportLegView {
        landmark: landmark.to_string(),
        distance_km: route.distance_km,
        duration_min: route.duration_min,
        band_label: band.label(),
        band_symbol: band.symbol(),
    });
}

fn component_view(component: &ScoreComponent) -> ScoreComponentView {
    ScoreComponentView {
        factor_label: component.factor.label(),
        points: component.points,
        cap: component.factor.cap(),
        notes: component.notes.clone(),
    }
}

const fn recommendation_for(rank: usize) -> &'static str {
    match rank {
        1 => "强烈推荐",
        2 => "推荐",
        3 => "备选",
        _ => "候选",
    }
}

fn price_label(policy: &Policy) -> String {
    if policy.price <= 0.0 {
        "未公布".to_string()
    } else if policy.is_rent {
        format!("{:.2} 元/㎡/月", policy.price)
    } else {
        format!("{:.0} 元/㎡", policy.price)
    }
}
