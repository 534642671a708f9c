//! Incremental geocoding: try the most specific query first and fall back to
//! broader ones until the provider returns something usable.

use std::time::Duration;

use sitedist_core::LocationMatch;

use crate::provider::{GeocodeCandidate, GeocodeProvider};
use crate::query_plan::{build_query_plan, QueryCandidate};

const DEFAULT_COUNTRY_NAME: &str = "Australia";

/// Match levels at or above this are locality-level searches, where the
/// candidate whose locality matches the requested one is preferred.
const LOCALITY_MATCH_LEVEL: u8 = 2;

/// Outcome of resolving one address.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found(LocationMatch),
    /// Every attempted query failed or came back empty.
    NotFound,
}

impl Resolution {
    #[must_use]
    pub fn found(self) -> Option<LocationMatch> {
        match self {
            Resolution::Found(location) => Some(location),
            Resolution::NotFound => None,
        }
    }
}

/// Outcome of a single query in the fallback sequence.
enum Attempt {
    Found(LocationMatch),
    NotFound,
}

/// Resolves free-text addresses through a [`GeocodeProvider`].
pub struct GeocodeResolver<G> {
    provider: G,
    attempt_delay: Duration,
    country_name: String,
}

impl<G: GeocodeProvider> GeocodeResolver<G> {
    /// `attempt_delay` is slept before every query after the first.
    pub fn new(provider: G, attempt_delay: Duration) -> Self {
        Self {
            provider,
            attempt_delay,
            country_name: DEFAULT_COUNTRY_NAME.to_owned(),
        }
    }

    /// Country appended to the state-only query.
    #[must_use]
    pub fn with_country_name(mut self, country_name: &str) -> Self {
        country_name.clone_into(&mut self.country_name);
        self
    }

    pub fn provider(&self) -> &G {
        &self.provider
    }

    /// Tries up to `max_attempts` queries from the address's fallback plan
    /// and returns the first usable match.
    ///
    /// Provider failures on individual attempts are logged and treated as
    /// that attempt finding nothing; only exhausting the plan is reported.
    pub async fn resolve(&self, address_text: &str, max_attempts: usize) -> Resolution {
        let plan = build_query_plan(address_text, &self.country_name);
        let locality = plan.locality.as_deref();

        for (index, candidate) in plan.candidates.iter().take(max_attempts).enumerate() {
            let attempt = index + 1;
            if attempt > 1 && !self.attempt_delay.is_zero() {
                tokio::time::sleep(self.attempt_delay).await;
            }

            match self.attempt(attempt, candidate, locality).await {
                Attempt::Found(location) => {
                    tracing::debug!(
                        attempt,
                        level = location.match_level,
                        description = %location.match_description,
                        "geocoded address"
                    );
                    return Resolution::Found(location);
                }
                Attempt::NotFound => {}
            }
        }

        tracing::warn!(
            address = address_text,
            attempts = plan.candidates.len().min(max_attempts),
            "all geocoding attempts exhausted"
        );
        Resolution::NotFound
    }

    async fn attempt(
        &self,
        attempt: usize,
        candidate: &QueryCandidate,
        locality: Option<&str>,
    ) -> Attempt {
        let hits = match self.provider.search(&candidate.query).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(
                    attempt,
                    level = candidate.level,
                    query = %candidate.query,
                    error = %e,
                    "geocoding attempt failed"
                );
                return Attempt::NotFound;
            }
        };

        match pick_candidate(&hits, candidate.level, locality) {
            Some(hit) => {
                tracing::debug!(
                    attempt,
                    query = %candidate.query,
                    display_name = hit.display_name.as_deref().unwrap_or("-"),
                    "picked geocoding result"
                );
                Attempt::Found(LocationMatch {
                    coordinates: hit.coordinates,
                    match_level: candidate.level,
                    match_description: candidate.description.to_owned(),
                })
            }
            None => {
                tracing::debug!(attempt, query = %candidate.query, "no geocoding results");
                Attempt::NotFound
            }
        }
    }
}

/// On locality-level searches, the first hit whose locality overlaps the
/// requested one; otherwise, or if none overlaps, the first hit.
fn pick_candidate<'a>(
    hits: &'a [GeocodeCandidate],
    level: u8,
    locality: Option<&str>,
) -> Option<&'a GeocodeCandidate> {
    if level >= LOCALITY_MATCH_LEVEL {
        if let Some(locality) = locality {
            if let Some(hit) = hits.iter().find(|h| h.overlaps_locality(locality)) {
                return Some(hit);
            }
        }
    }
    hits.first()
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
