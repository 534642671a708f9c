use serde::{Deserialize, Serialize};

use crate::address::Address;

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both components are finite and inside the valid degree ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Coordinates plus a record of which geocoding query produced them.
///
/// `match_level` 0 is an exact address match; larger values are broader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMatch {
    pub coordinates: Coordinates,
    pub match_level: u8,
    pub match_description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    Pending,
    Cached,
    Resolved,
    Unresolved,
}

/// One site the consumer wants ranked against the reference address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub address: Address,
    pub location: Option<LocationMatch>,
    pub status: SiteStatus,
}

impl SiteRecord {
    #[must_use]
    pub fn new(address: Address) -> Self {
        Self {
            address,
            location: None,
            status: SiteStatus::Pending,
        }
    }

    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location.as_ref().map(|l| l.coordinates)
    }

    /// Copies in a location that came from the coordinate cache.
    pub fn mark_cached(&mut self, location: LocationMatch) {
        self.location = Some(location);
        self.status = SiteStatus::Cached;
    }

    /// Copies in a location freshly produced by the geocoder.
    pub fn mark_resolved(&mut self, location: LocationMatch) {
        self.location = Some(location);
        self.status = SiteStatus::Resolved;
    }

    /// Every geocoding fallback failed. Any earlier location is dropped.
    pub fn mark_unresolved(&mut self) {
        self.location = None;
        self.status = SiteStatus::Unresolved;
    }
}
