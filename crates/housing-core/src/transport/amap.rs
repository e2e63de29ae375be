use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::matching::domain::RouteEstimate;

use super::{Coordinate, GeocodeError, RouteError, RouteProvider};

const GEOCODE_URL: &str = "https://restapi.amap.com/v3/geocode/geo";
const DRIVING_URL: &str = "https://restapi.amap.com/v3/direction/driving";
const AROUND_URL: &str = "https://restapi.amap.com/v3/place/around";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Addresses the geocoder mangles in practice; pinned to surveyed
/// coordinates instead of asking the service.
const KNOWN_LOCATIONS: [(&str, Coordinate); 2] = [
    (
        "龙华区大浪街道",
        Coordinate {
            lng: 114.0366,
            lat: 22.6546,
        },
    ),
    (
        "龙华大浪",
        Coordinate {
            lng: 114.0366,
            lat: 22.6546,
        },
    ),
];

/// AMap Web-service client covering geocoding, driving routes, and
/// nearby-POI search.
pub struct AmapClient {
    client: reqwest::Client,
    key: String,
}

/// A nearby point of interest (e.g. a subway station) with its walking
/// distance in meters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearbyPoi {
    pub name: String,
    pub distance_m: u32,
}

impl AmapClient {
    pub fn new(key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            key: key.into(),
        }
    }

    /// Up to three nearby facilities matching the keyword (default radius is
    /// a kilometer). Service refusals come back as an empty list.
    pub async fn nearby(
        &self,
        location: Coordinate,
        keywords: &str,
        radius_m: u32,
    ) -> Result<Vec<NearbyPoi>, GeocodeError> {
        let response: AroundResponse = self
            .client
            .get(AROUND_URL)
            .query(&[
                ("key", self.key.as_str()),
                ("location", &location.to_param()),
                ("keywords", keywords),
                ("radius", &radius_m.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;

        if response.status != "1" {
            debug!(status = %response.status, "nearby search rejected");
            return Ok(Vec::new());
        }

        Ok(response
            .pois
            .into_iter()
            .filter_map(|poi| {
                Some(NearbyPoi {
                    name: poi.name,
                    distance_m: poi.distance.parse().ok()?,
                })
            })
            .take(3)
            .collect())
    }
}

impl RouteProvider for AmapClient {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        for (fragment, coordinate) in KNOWN_LOCATIONS {
            if address.contains(fragment) {
                return Ok(Some(coordinate));
            }
        }

        let response: GeocodeResponse = self
            .client
            .get(GEOCODE_URL)
            .query(&[("key", self.key.as_str()), ("address", address)])
            .send()
            .await?
            .json()
            .await?;

        if response.status != "1" {
            debug!(address, status = %response.status, "geocode rejected");
            return Ok(None);
        }

        Ok(response
            .geocodes
            .first()
            .and_then(|entry| Coordinate::parse(&entry.location)))
    }

    async fn drive_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Option<RouteEstimate>, RouteError> {
        let response: DrivingResponse = self
            .client
            .get(DRIVING_URL)
            .query(&[
                ("key", self.key.as_str()),
                ("origin", &origin.to_param()),
                ("destination", &destination.to_param()),
                ("extensions", "base"),
            ])
            .send()
            .await?
            .json()
            .await?;

        if response.status != "1" {
            debug!(status = %response.status, "route request rejected");
            return Ok(None);
        }

        let Some(path) = response.route.and_then(|route| route.paths.into_iter().next()) else {
            return Ok(None);
        };

        // the service quotes meters and seconds, as strings
        let (Some(distance), Some(duration)) = (
            path.distance.parse::<f64>().ok(),
            path.duration.parse::<f64>().ok(),
        ) else {
            return Ok(None);
        };

        Ok(Some(RouteEstimate {
            distance_km: distance / 1000.0,
            duration_min: duration / 60.0,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    geocodes: Vec<GeocodeEntry>,
}

#[derive(Debug, Deserialize)]
struct GeocodeEntry {
    location: String,
}

#[derive(Debug, Deserialize)]
struct DrivingResponse {
    status: String,
    route: Option<RoutePayload>,
}

#[derive(Debug, Deserialize)]
struct RoutePayload {
    #[serde(default)]
    paths: Vec<PathEntry>,
}

#[derive(Debug, Deserialize)]
struct PathEntry {
    distance: String,
    duration: String,
}

#[derive(Debug, Deserialize)]
struct AroundResponse {
    status: String,
    #[serde(default)]
    pois: Vec<PoiEntry>,
}

#[derive(Debug, Deserialize)]
struct PoiEntry {
    name: String,
    distance: String,
}
