//! HTTP client for the OSRM `route` service (driving profile).

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use sitedist_core::Coordinates;

use crate::error::GeoError;
use crate::provider::{RoadRoute, RouteProvider};

const DEFAULT_BASE_URL: &str = "https://router.project-osrm.org";

#[derive(Debug, Deserialize)]
struct RouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<RouteLeg>,
}

#[derive(Debug, Deserialize)]
struct RouteLeg {
    /// Metres.
    distance: f64,
    /// Seconds.
    duration: f64,
}

/// Client for an OSRM-compatible routing server.
pub struct OsrmClient {
    client: Client,
    base_url: Url,
}

impl OsrmClient {
    /// Creates a client pointed at the public OSRM demo server.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self, GeoError> {
        Self::with_base_url(DEFAULT_BASE_URL, user_agent, timeout_secs)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the `reqwest::Client` cannot be built, or
    /// [`GeoError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        user_agent: &str,
        timeout_secs: u64,
    ) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeoError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// `route/v1/driving/{lon1},{lat1};{lon2},{lat2}?overview=false&steps=false`
    fn build_url(&self, from: Coordinates, to: Coordinates) -> Result<Url, GeoError> {
        let path = format!(
            "route/v1/driving/{},{};{},{}",
            from.lon, from.lat, to.lon, to.lat
        );
        let mut url = self
            .base_url
            .join(&path)
            .map_err(|e| GeoError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("overview", "false")
            .append_pair("steps", "false");
        Ok(url)
    }
}

impl RouteProvider for OsrmClient {
    /// # Errors
    ///
    /// - [`GeoError::Http`] on network failure or timeout.
    /// - [`GeoError::NoRoute`] when OSRM answers with a `code` other than
    ///   `"Ok"` or an empty `routes` array.
    /// - [`GeoError::UnexpectedStatus`] on a non-2xx response without an
    ///   OSRM error body.
    /// - [`GeoError::Deserialize`] if a 2xx body does not parse.
    async fn driving_route(&self, from: Coordinates, to: Coordinates) -> Result<RoadRoute, GeoError> {
        let url = self.build_url(from, to)?;
        tracing::debug!(%url, "osrm route");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let parsed = serde_json::from_str::<RouteResponse>(&body);
        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(GeoError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            Err(e) => {
                return Err(GeoError::Deserialize {
                    context: url.to_string(),
                    source: e,
                });
            }
        };

        if parsed.code != "Ok" {
            let detail = parsed.message.unwrap_or_default();
            return Err(GeoError::NoRoute(format!("{} {detail}", parsed.code).trim().to_owned()));
        }

        let leg = parsed
            .routes
            .first()
            .ok_or_else(|| GeoError::NoRoute("empty routes array".to_owned()))?;

        Ok(RoadRoute {
            distance_km: leg.distance / 1000.0,
            duration_min: leg.duration / 60.0,
        })
    }
}
