//! Geocoding, routing and coordinate caching for sitedist.
//!
//! [`GeocodeResolver`] walks an ordered list of increasingly broad queries
//! against a [`GeocodeProvider`]; [`RouteDistanceService`] asks a
//! [`RouteProvider`] for a driving route and falls back to great-circle
//! distance; [`CacheStore`] persists resolved coordinates between sessions.
//! The production providers are [`NominatimClient`] and [`OsrmClient`].

pub mod cache;
pub mod error;
pub mod nominatim;
pub mod osrm;
pub mod provider;
pub mod query_plan;
pub mod resolver;
pub mod route;

pub use cache::{CacheEntry, CacheStore};
pub use error::{CacheError, GeoError};
pub use nominatim::NominatimClient;
pub use osrm::OsrmClient;
pub use provider::{GeocodeCandidate, GeocodeProvider, RoadRoute, RouteProvider};
pub use query_plan::{build_query_plan, QueryCandidate};
pub use resolver::{GeocodeResolver, Resolution};
pub use route::{great_circle_km, RouteDistanceService, RouteEstimate, RouteSource};
