//! Messages sent from a running calculation to its consumer.

use serde::Serialize;
use sitedist_core::{DistanceResult, LocationMatch, ResultTag, SiteRecord};

use crate::summary::RunSummary;

/// One event on a run's channel, in emission order.
///
/// A run ends with exactly one of [`RunEvent::Complete`],
/// [`RunEvent::Cancelled`] or [`RunEvent::Error`].
///
/// Serialized as `{"type": ..., "data": ...}`. Unresolved sites in
/// [`RunEvent::Results`] carry `null` distance and duration, which
/// [`DistanceResult`] reads back as `f64::INFINITY`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RunEvent {
    /// Human-readable progress message.
    Status(String),
    /// Fraction of the run completed, in `[0, 1]`.
    Progress(f64),
    SiteUpdate(SiteUpdate),
    /// All results, sorted nearest first.
    Results(Vec<DistanceResult>),
    Complete(RunSummary),
    Cancelled,
    Error(String),
}

impl RunEvent {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunEvent::Complete(_) | RunEvent::Cancelled | RunEvent::Error(_)
        )
    }
}

/// Outcome for the site at `index` in the list passed to `start`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteUpdate {
    pub index: usize,
    pub status_label: String,
    pub tag: ResultTag,
    /// `None` when the site could not be geocoded.
    pub location: Option<LocationMatch>,
}

impl SiteUpdate {
    /// Mirrors this update onto the consumer's copy of the site.
    pub fn apply_to(&self, record: &mut SiteRecord) {
        match (&self.location, self.tag) {
            (Some(location), ResultTag::Cached) => record.mark_cached(location.clone()),
            (Some(location), _) => record.mark_resolved(location.clone()),
            (None, _) => record.mark_unresolved(),
        }
    }
}
