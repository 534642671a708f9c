//! Per-site distance results and the closed tag vocabulary that classifies them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::address::Address;
use crate::error::CoreError;

/// What happened to a site during a run. Display concerns (colours, icons)
/// belong to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultTag {
    /// Geocoded at match level 0–2.
    Success,
    /// Coordinates came from the cache; no geocoding query was issued.
    Cached,
    /// Geocoded only at locality level or broader (match level ≥ 3).
    Warning,
    /// Every geocoding fallback failed.
    Error,
}

impl ResultTag {
    pub const ALL: [ResultTag; 4] = [
        ResultTag::Success,
        ResultTag::Cached,
        ResultTag::Warning,
        ResultTag::Error,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ResultTag::Success => "success",
            ResultTag::Cached => "cached",
            ResultTag::Warning => "warning",
            ResultTag::Error => "error",
        }
    }
}

impl fmt::Display for ResultTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultTag {
    type Err = CoreError;

    /// Accepts the tag names plus the labels the filter checkboxes used
    /// (`found`, `broad`, `not_found`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" | "found" => Ok(ResultTag::Success),
            "cached" => Ok(ResultTag::Cached),
            "warning" | "broad" => Ok(ResultTag::Warning),
            "error" | "not_found" | "not-found" => Ok(ResultTag::Error),
            other => Err(CoreError::UnknownTag(other.to_owned())),
        }
    }
}

/// Maps a successful geocode match to its tag and status label.
///
/// Level 0 is an exact hit, 1–2 an approximate hit that still counts as
/// found, and anything broader is a warning.
#[must_use]
pub fn classify_match(match_level: u8, description: &str) -> (ResultTag, String) {
    match match_level {
        0 => (ResultTag::Success, "Found (exact)".to_owned()),
        1 | 2 => (ResultTag::Success, format!("Found ({description})")),
        _ => (ResultTag::Warning, format!("Broad ({description})")),
    }
}

pub const CACHED_LABEL: &str = "Cached";
pub const NOT_FOUND_LABEL: &str = "Not Found";

/// Travel distance and time from the reference address to one site.
///
/// `distance_km` and `duration_min` are `f64::INFINITY` when the site could
/// not be geocoded. JSON has no infinity, so they serialize as `null` and a
/// `null` deserializes back to `f64::INFINITY`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    pub address: Address,
    #[serde(deserialize_with = "infinite_if_null")]
    pub distance_km: f64,
    #[serde(deserialize_with = "infinite_if_null")]
    pub duration_min: f64,
    pub status_label: String,
    pub tag: ResultTag,
    pub match_level: Option<u8>,
    pub match_description: Option<String>,
}

impl DistanceResult {
    /// Result for a site whose every geocoding fallback failed.
    #[must_use]
    pub fn not_found(address: Address) -> Self {
        Self {
            address,
            distance_km: f64::INFINITY,
            duration_min: f64::INFINITY,
            status_label: NOT_FOUND_LABEL.to_owned(),
            tag: ResultTag::Error,
            match_level: None,
            match_description: None,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        self.distance_km.is_finite()
    }
}

fn infinite_if_null<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

/// Stable ascending sort by distance; unresolved (`+inf`) results sort last.
pub fn sort_by_distance(results: &mut [DistanceResult]) {
    results.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
}

/// Per-tag counts over one run's results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCounts {
    pub success: usize,
    pub cached: usize,
    pub warning: usize,
    pub error: usize,
}

impl TagCounts {
    #[must_use]
    pub fn from_results(results: &[DistanceResult]) -> Self {
        let mut counts = Self::default();
        for result in results {
            match result.tag {
                ResultTag::Success => counts.success += 1,
                ResultTag::Cached => counts.cached += 1,
                ResultTag::Warning => counts.warning += 1,
                ResultTag::Error => counts.error += 1,
            }
        }
        counts
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.success + self.cached + self.warning + self.error
    }
}

impl fmt::Display for TagCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            (self.success, "found"),
            (self.cached, "cached"),
            (self.warning, "broad"),
            (self.error, "not found"),
        ]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, label)| format!("{n} {label}"))
        .collect();

        if parts.is_empty() {
            f.write_str("no results")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(distance_km: f64, tag: ResultTag) -> DistanceResult {
        DistanceResult {
            address: Address::new("1 A St", "Town", "NSW"),
            distance_km,
            duration_min: distance_km,
            status_label: String::new(),
            tag,
            match_level: Some(0),
            match_description: None,
        }
    }

    #[test]
    fn classify_exact_match() {
        assert_eq!(
            classify_match(0, "exact address"),
            (ResultTag::Success, "Found (exact)".to_owned())
        );
    }

    #[test]
    fn classify_approximate_match_keeps_description() {
        assert_eq!(
            classify_match(2, "street name with suburb"),
            (
                ResultTag::Success,
                "Found (street name with suburb)".to_owned()
            )
        );
    }

    #[test]
    fn classify_broad_match_is_warning() {
        let (tag, label) = classify_match(3, "suburb and state");
        assert_eq!(tag, ResultTag::Warning);
        assert_eq!(label, "Broad (suburb and state)");
        assert_eq!(classify_match(4, "state only").0, ResultTag::Warning);
    }

    #[test]
    fn sort_puts_infinity_last() {
        let mut results = vec![
            DistanceResult::not_found(Address::new("", "Nowhere", "NT")),
            result(12.5, ResultTag::Success),
            result(3.0, ResultTag::Cached),
            result(40.0, ResultTag::Warning),
        ];
        sort_by_distance(&mut results);
        let distances: Vec<f64> = results.iter().map(|r| r.distance_km).collect();
        assert_eq!(distances, vec![3.0, 12.5, 40.0, f64::INFINITY]);
    }

    #[test]
    fn sort_is_stable_for_equal_distances() {
        let mut a = result(5.0, ResultTag::Success);
        a.status_label = "first".to_owned();
        let mut b = result(5.0, ResultTag::Cached);
        b.status_label = "second".to_owned();
        let mut results = vec![a, b];
        sort_by_distance(&mut results);
        assert_eq!(results[0].status_label, "first");
        assert_eq!(results[1].status_label, "second");
    }

    #[test]
    fn tag_counts_display_skips_zero_counts() {
        let results = vec![
            result(1.0, ResultTag::Success),
            result(2.0, ResultTag::Success),
            DistanceResult::not_found(Address::new("", "X", "NT")),
        ];
        let counts = TagCounts::from_results(&results);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.to_string(), "2 found, 1 not found");
    }

    #[test]
    fn tag_from_str_accepts_filter_labels() {
        assert_eq!("broad".parse::<ResultTag>(), Ok(ResultTag::Warning));
        assert_eq!("NOT_FOUND".parse::<ResultTag>(), Ok(ResultTag::Error));
        assert_eq!("found".parse::<ResultTag>(), Ok(ResultTag::Success));
        assert!("bogus".parse::<ResultTag>().is_err());
    }

    #[test]
    fn not_found_result_survives_json() {
        let original = DistanceResult::not_found(Address::new("", "Nowhere", "NT"));
        let json = serde_json::to_value(&original).unwrap();
        assert!(json["distance_km"].is_null());
        assert!(json["duration_min"].is_null());

        let back: DistanceResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, original);
        assert!(!back.is_found());
    }
}
