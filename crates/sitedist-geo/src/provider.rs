//! Seams between the resolution pipeline and the external providers.

use std::future::Future;

use sitedist_core::Coordinates;

use crate::error::GeoError;

/// One hit returned by a geocoding search.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCandidate {
    pub coordinates: Coordinates,
    /// Suburb, city and town names the provider attached to the hit, in that
    /// order, when present.
    pub locality_names: Vec<String>,
    pub display_name: Option<String>,
}

impl GeocodeCandidate {
    #[must_use]
    pub fn new(coordinates: Coordinates) -> Self {
        Self {
            coordinates,
            locality_names: Vec::new(),
            display_name: None,
        }
    }

    /// Case-insensitive containment in either direction between `locality`
    /// and any of the candidate's locality names.
    #[must_use]
    pub fn overlaps_locality(&self, locality: &str) -> bool {
        let wanted = locality.trim().to_lowercase();
        if wanted.is_empty() {
            return false;
        }
        self.locality_names.iter().any(|name| {
            let name = name.trim().to_lowercase();
            !name.is_empty() && (name.contains(&wanted) || wanted.contains(&name))
        })
    }
}

/// A free-text geocoding search service.
pub trait GeocodeProvider: Send + Sync {
    /// Runs one search and returns its candidates in provider rank order.
    /// An empty list means the provider found nothing.
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<GeocodeCandidate>, GeoError>> + Send;
}

/// Distance and time of a driving route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadRoute {
    pub distance_km: f64,
    pub duration_min: f64,
}

/// A point-to-point driving route service.
pub trait RouteProvider: Send + Sync {
    fn driving_route(
        &self,
        from: Coordinates,
        to: Coordinates,
    ) -> impl Future<Output = Result<RoadRoute, GeoError>> + Send;
}
