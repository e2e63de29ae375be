mod amap;

use std::time::Duration;

use tracing::debug;

pub use amap::{AmapClient, NearbyPoi};

use crate::matching::domain::{RouteEstimate, TransportInfo};

/// Landmarks every enrichment run measures against, besides the workplace.
pub const RAIL_HUB_ADDRESS: &str = "深圳北站";
pub const AIRPORT_ADDRESS: &str = "深圳宝安国际机场";

/// Pause between consecutive provider calls; the free AMap tier allows about
/// three requests per second.
pub const PROVIDER_CALL_DELAY: Duration = Duration::from_millis(350);

/// A longitude/latitude pair in the provider's coordinate system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lng: f64,
    pub lat: f64,
}

impl Coordinate {
    /// Render as the `lng,lat` parameter the provider expects.
    pub fn to_param(self) -> String {
        format!("{:.6},{:.6}", self.lng, self.lat)
    }

    /// Parse the provider's `lng,lat` location string.
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let (lng, lat) = raw.split_once(',')?;
        Some(Self {
            lng: lng.trim().parse().ok()?,
            lat: lat.trim().parse().ok()?,
        })
    }
}

/// Transport failure while talking to the geocoding endpoint. An address the
/// service cannot resolve is not an error; it comes back as `None`.
#[derive(Debug, thiserror::Error)]
#[error("geocoding request failed: {0}")]
pub struct GeocodeError(#[from] reqwest::Error);

/// Transport failure while talking to the routing endpoint. "No route" is
/// not an error; it comes back as `None`.
#[derive(Debug, thiserror::Error)]
#[error("route request failed: {0}")]
pub struct RouteError(#[from] reqwest::Error);

/// Seam over geocoding and driving-route computation so enrichment can be
/// tested without the network.
#[allow(async_fn_in_trait)]
pub trait RouteProvider {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError>;
    async fn drive_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Option<RouteEstimate>, RouteError>;
}

/// Compute the drive legs from a policy location to the workplace and the
/// fixed landmarks.
///
/// Calls are issued strictly one at a time with a fixed delay between them.
/// Any geocode or route failure only blanks the affected leg; enrichment
/// itself never fails.
pub async fn enrich_transport<P: RouteProvider>(
    provider: &P,
    policy_location: &str,
    workplace_address: &str,
) -> TransportInfo {
    let Some(origin) = geocode_quietly(provider, policy_location).await else {
        debug!(location = policy_location, "policy location did not geocode");
        return TransportInfo::default();
    };

    let mut info = TransportInfo::default();
    let legs: [(&str, &mut Option<RouteEstimate>); 3] = [
        (workplace_address, &mut info.to_workplace),
        (RAIL_HUB_ADDRESS, &mut info.to_rail_hub),
        (AIRPORT_ADDRESS, &mut info.to_airport),
    ];

    for (address, slot) in legs {
        tokio::time::sleep(PROVIDER_CALL_DELAY).await;
        let Some(destination) = geocode_quietly(provider, address).await else {
            continue;
        };

        tokio::time::sleep(PROVIDER_CALL_DELAY).await;
        match provider.drive_route(origin, destination).await {
            Ok(route) => *slot = route,
            Err(err) => {
                debug!(address, error = %err, "route lookup failed, leaving leg blank");
            }
        }
    }

    info
}

async fn geocode_quietly<P: RouteProvider>(provider: &P, address: &str) -> Option<Coordinate> {
    match provider.geocode(address).await {
        Ok(coordinate) => coordinate,
        Err(err) => {
            debug!(address, error = %err, "geocoding failed, treating as unresolvable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeProvider;

    impl RouteProvider for FakeProvider {
        async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
            match address {
                "龙华区大浪街道" => Ok(Some(Coordinate {
                    lng: 114.0366,
                    lat: 22.6546,
                })),
                "坂田天安云谷" => Ok(Some(Coordinate {
                    lng: 114.0658,
                    lat: 22.6205,
                })),
                RAIL_HUB_ADDRESS => Ok(Some(Coordinate {
                    lng: 114.0296,
                    lat: 22.6096,
                })),
                // the airport never resolves in this fake
                _ => Ok(None),
            }
        }

        async fn drive_route(
            &self,
            _origin: Coordinate,
            destination: Coordinate,
        ) -> Result<Option<RouteEstimate>, RouteError> {
            if (destination.lng - 114.0296).abs() < 1e-6 {
                // no route to the rail hub in this fake
                return Ok(None);
            }
            Ok(Some(RouteEstimate {
                distance_km: 14.2,
                duration_min: 30.0,
            }))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn enrichment_fills_resolved_legs_and_blanks_the_rest() {
        let info = enrich_transport(&FakeProvider, "龙华区大浪街道", "坂田天安云谷").await;

        assert_eq!(
            info.to_workplace,
            Some(RouteEstimate {
                distance_km: 14.2,
                duration_min: 30.0,
            })
        );
        assert_eq!(info.to_rail_hub, None);
        assert_eq!(info.to_airport, None);
    }

    #[tokio::test(start_paused = true)]
    async fn unresolvable_policy_location_yields_an_empty_block() {
        let info = enrich_transport(&FakeProvider, "不存在的地址", "坂田天安云谷").await;
        assert_eq!(info, TransportInfo::default());
    }

    #[test]
    fn coordinate_round_trips_through_the_provider_format() {
        let coordinate = Coordinate::parse("114.0366,22.6546").expect("parses");
        assert_eq!(coordinate.to_param(), "114.036600,22.654600");
        assert!(Coordinate::parse("not-a-location").is_none());
    }
}
