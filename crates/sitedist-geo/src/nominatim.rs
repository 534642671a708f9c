//! HTTP client for the Nominatim free-text search API.
//!
//! Every request asks for up to three candidates restricted to the configured
//! country codes, with address details so callers can compare the returned
//! locality against the one they asked for.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use sitedist_core::Coordinates;

use crate::error::GeoError;
use crate::provider::{GeocodeCandidate, GeocodeProvider};

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Candidates requested per query. More than one so a locality-level search
/// can pick the hit whose suburb matches.
const RESULT_LIMIT: &str = "3";

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: Value,
    lon: Value,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<HitAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct HitAddress {
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
}

impl SearchHit {
    fn into_candidate(self) -> Option<GeocodeCandidate> {
        let coordinates = Coordinates::new(degrees(&self.lat)?, degrees(&self.lon)?);
        if !coordinates.is_valid() {
            tracing::debug!(?coordinates, "dropping geocode hit with out-of-range coordinates");
            return None;
        }
        let address = self.address.unwrap_or_default();
        let locality_names = [address.suburb, address.city, address.town]
            .into_iter()
            .flatten()
            .collect();
        Some(GeocodeCandidate {
            coordinates,
            locality_names,
            display_name: self.display_name,
        })
    }
}

/// Nominatim sends coordinates as numeric strings; some mirrors send numbers.
fn degrees(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Client for a Nominatim-compatible `/search` endpoint.
///
/// Use [`NominatimClient::new`] for the public OpenStreetMap instance or
/// [`NominatimClient::with_base_url`] for a self-hosted mirror or a mock
/// server in tests.
pub struct NominatimClient {
    client: Client,
    search_url: Url,
    country_codes: String,
}

impl NominatimClient {
    /// Creates a client pointed at the public Nominatim instance.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(user_agent: &str, timeout_secs: u64, country_codes: &str) -> Result<Self, GeoError> {
        Self::with_base_url(DEFAULT_BASE_URL, user_agent, timeout_secs, country_codes)
    }

    /// Creates a client with a custom base URL.
    ///
    /// `user_agent` is mandatory for the public instance; anonymous clients
    /// are blocked.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`GeoError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        user_agent: &str,
        timeout_secs: u64,
        country_codes: &str,
    ) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let search_url = Url::parse(&normalised)
            .and_then(|base| base.join("search"))
            .map_err(|e| GeoError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            search_url,
            country_codes: country_codes.to_owned(),
        })
    }

    fn build_url(&self, query: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("limit", RESULT_LIMIT)
            .append_pair("countrycodes", &self.country_codes)
            .append_pair("addressdetails", "1");
        url
    }
}

impl GeocodeProvider for NominatimClient {
    /// # Errors
    ///
    /// - [`GeoError::Http`] on network failure or timeout.
    /// - [`GeoError::UnexpectedStatus`] on a non-2xx response (including the
    ///   429/403 Nominatim sends when throttling).
    /// - [`GeoError::Deserialize`] if the body is not a JSON array of hits.
    async fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeoError> {
        let url = self.build_url(query);
        tracing::debug!(query, "nominatim search");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let hits: Vec<SearchHit> =
            serde_json::from_str(&body).map_err(|e| GeoError::Deserialize {
                context: format!("search(q={query})"),
                source: e,
            })?;

        Ok(hits
            .into_iter()
            .filter_map(SearchHit::into_candidate)
            .collect())
    }
}
