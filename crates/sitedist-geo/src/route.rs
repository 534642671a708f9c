//! Driving distance between two points, with a straight-line fallback.

use serde::Serialize;
use sitedist_core::Coordinates;

use crate::provider::RouteProvider;

/// Mean Earth radius used by the great-circle fallback.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Average speed assumed when no road route is available.
pub const FALLBACK_SPEED_KMH: f64 = 50.0;

/// Haversine distance between two points, in kilometres.
#[must_use]
pub fn great_circle_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lon = (to.lon - from.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    Road,
    GreatCircle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteEstimate {
    pub distance_km: f64,
    pub duration_min: f64,
    pub source: RouteSource,
}

impl RouteEstimate {
    /// Straight-line distance travelled at [`FALLBACK_SPEED_KMH`].
    #[must_use]
    pub fn great_circle(from: Coordinates, to: Coordinates) -> Self {
        let distance_km = great_circle_km(from, to);
        Self {
            distance_km,
            duration_min: distance_km / FALLBACK_SPEED_KMH * 60.0,
            source: RouteSource::GreatCircle,
        }
    }
}

/// Wraps a [`RouteProvider`] so that every request yields an estimate.
pub struct RouteDistanceService<R> {
    provider: R,
}

impl<R: RouteProvider> RouteDistanceService<R> {
    pub fn new(provider: R) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &R {
        &self.provider
    }

    /// Road distance from `from` to `to`, or the great-circle estimate when
    /// the provider fails or returns a non-finite figure.
    pub async fn route(&self, from: Coordinates, to: Coordinates) -> RouteEstimate {
        match self.provider.driving_route(from, to).await {
            Ok(road) if road.distance_km.is_finite() && road.duration_min.is_finite() => {
                RouteEstimate {
                    distance_km: road.distance_km,
                    duration_min: road.duration_min,
                    source: RouteSource::Road,
                }
            }
            Ok(road) => {
                tracing::warn!(
                    distance_km = road.distance_km,
                    duration_min = road.duration_min,
                    "route provider returned non-finite figures, using great-circle distance"
                );
                RouteEstimate::great_circle(from, to)
            }
            Err(e) => {
                tracing::warn!(error = %e, "route lookup failed, using great-circle distance");
                RouteEstimate::great_circle(from, to)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::GeoError;
    use crate::provider::RoadRoute;

    const SYDNEY: Coordinates = Coordinates::new(-33.8688, 151.2093);
    const MELBOURNE: Coordinates = Coordinates::new(-37.8136, 144.9631);

    struct FixedRouter {
        answer: Option<RoadRoute>,
        calls: AtomicUsize,
    }

    impl FixedRouter {
        fn new(answer: Option<RoadRoute>) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl RouteProvider for FixedRouter {
        async fn driving_route(
            &self,
            _from: Coordinates,
            _to: Coordinates,
        ) -> Result<RoadRoute, GeoError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .ok_or_else(|| GeoError::NoRoute("mock router has no route".to_owned()))
        }
    }

    #[test]
    fn great_circle_sydney_to_melbourne() {
        let km = great_circle_km(SYDNEY, MELBOURNE);
        assert!((km - 713.5).abs() < 5.0, "got {km}");
    }

    #[test]
    fn great_circle_is_zero_for_same_point() {
        assert!(great_circle_km(SYDNEY, SYDNEY).abs() < 1e-9);
    }

    #[test]
    fn great_circle_is_symmetric() {
        let there = great_circle_km(SYDNEY, MELBOURNE);
        let back = great_circle_km(MELBOURNE, SYDNEY);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn fallback_duration_uses_fifty_kmh() {
        let estimate = RouteEstimate::great_circle(SYDNEY, MELBOURNE);
        let expected = estimate.distance_km / 50.0 * 60.0;
        assert!((estimate.duration_min - expected).abs() < 1e-9);
        assert_eq!(estimate.source, RouteSource::GreatCircle);
    }

    #[tokio::test]
    async fn road_route_is_used_when_available() {
        let service = RouteDistanceService::new(FixedRouter::new(Some(RoadRoute {
            distance_km: 878.5,
            duration_min: 540.0,
        })));
        let estimate = service.route(SYDNEY, MELBOURNE).await;
        assert_eq!(estimate.source, RouteSource::Road);
        assert!((estimate.distance_km - 878.5).abs() < f64::EPSILON);
        assert!((estimate.duration_min - 540.0).abs() < f64::EPSILON);
        assert_eq!(service.provider().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn provider_error_falls_back_to_great_circle() {
        let service = RouteDistanceService::new(FixedRouter::new(None));
        let estimate = service.route(SYDNEY, MELBOURNE).await;
        assert_eq!(estimate, RouteEstimate::great_circle(SYDNEY, MELBOURNE));
    }

    #[tokio::test]
    async fn non_finite_route_falls_back_to_great_circle() {
        let service = RouteDistanceService::new(FixedRouter::new(Some(RoadRoute {
            distance_km: f64::NAN,
            duration_min: 10.0,
        })));
        let estimate = service.route(SYDNEY, MELBOURNE).await;
        assert_eq!(estimate.source, RouteSource::GreatCircle);
        assert!(estimate.distance_km.is_finite());
    }
}
