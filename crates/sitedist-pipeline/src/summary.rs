use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sitedist_core::{DistanceResult, TagCounts};
use uuid::Uuid;

/// Aggregate outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub counts: TagCounts,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    #[must_use]
    pub fn new(run_id: Uuid, results: &[DistanceResult], started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            counts: TagCounts::from_results(results),
            started_at,
            finished_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// `"N found, N cached, N broad, N not found"`, zero counts included.
impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} found, {} cached, {} broad, {} not found",
            self.counts.success, self.counts.cached, self.counts.warning, self.counts.error
        )
    }
}

#[cfg(test)]
mod tests {
    use sitedist_core::{Address, ResultTag};

    use super::*;

    fn tagged(tag: ResultTag) -> DistanceResult {
        let mut result = DistanceResult::not_found(Address::new("", "Kew", "VIC"));
        result.tag = tag;
        result
    }

    #[test]
    fn display_lists_every_bucket() {
        let results = [
            tagged(ResultTag::Success),
            tagged(ResultTag::Success),
            tagged(ResultTag::Warning),
        ];
        let summary = RunSummary::new(Uuid::new_v4(), &results, Utc::now());
        assert_eq!(summary.to_string(), "2 found, 0 cached, 1 broad, 0 not found");
    }

    #[test]
    fn elapsed_is_non_negative() {
        let summary = RunSummary::new(Uuid::new_v4(), &[], Utc::now());
        assert!(summary.elapsed() >= chrono::Duration::zero());
        assert_eq!(summary.counts.total(), 0);
    }
}
