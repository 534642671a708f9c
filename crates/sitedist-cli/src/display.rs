//! Text rendering of ranked results.

use std::fmt::Write as _;

use sitedist_core::{filter_ranked, DistanceResult, TagFilter};

const NOT_AVAILABLE: &str = "N/A";

/// `"1 hr 5 min"`, `"2 hr"` or `"45 min"`, rounded to the nearest minute.
/// Infinite or NaN durations render as `N/A`.
#[must_use]
pub fn format_duration(minutes: f64) -> String {
    if !minutes.is_finite() {
        return NOT_AVAILABLE.to_owned();
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = minutes.max(0.0).round() as u64;
    let (hours, mins) = (total / 60, total % 60);
    match (hours, mins) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} hr"),
        (h, m) => format!("{h} hr {m} min"),
    }
}

#[must_use]
pub fn format_distance(km: f64) -> String {
    if km.is_finite() {
        format!("{km:.2}")
    } else {
        NOT_AVAILABLE.to_owned()
    }
}

/// Tab-separated table of the results `filter` allows, ranked 1..N, with a
/// header row. Pastes straight into a spreadsheet.
#[must_use]
pub fn render_table(results: &[DistanceResult], filter: &TagFilter) -> String {
    let mut out = String::from("Rank\tAddress\tSuburb\tState\tDistance (km)\tDuration\tStatus\n");
    for ranked in filter_ranked(results, filter) {
        let r = ranked.result;
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            ranked.rank,
            r.address.street,
            r.address.locality,
            r.address.region,
            format_distance(r.distance_km),
            format_duration(r.duration_min),
            r.status_label,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use sitedist_core::{Address, ResultTag};

    use super::*;

    fn result(locality: &str, km: f64, tag: ResultTag) -> DistanceResult {
        DistanceResult {
            address: Address::new("1 Main St", locality, "NSW"),
            distance_km: km,
            duration_min: km,
            status_label: format!("{tag}"),
            tag,
            match_level: Some(0),
            match_description: None,
        }
    }

    #[test]
    fn duration_formats() {
        assert_eq!(format_duration(0.2), "0 min");
        assert_eq!(format_duration(45.4), "45 min");
        assert_eq!(format_duration(60.0), "1 hr");
        assert_eq!(format_duration(65.0), "1 hr 5 min");
        assert_eq!(format_duration(119.6), "2 hr");
        assert_eq!(format_duration(f64::INFINITY), "N/A");
    }

    #[test]
    fn distance_formats() {
        assert_eq!(format_distance(12.345), "12.35");
        assert_eq!(format_distance(f64::INFINITY), "N/A");
    }

    #[test]
    fn table_renumbers_filtered_rows() {
        let results = vec![
            result("Parramatta", 20.0, ResultTag::Success),
            result("Penrith", 55.0, ResultTag::Warning),
            result("Atlantis", f64::INFINITY, ResultTag::Error),
        ];
        let filter = TagFilter::none()
            .with(ResultTag::Warning, true)
            .with(ResultTag::Error, true);

        let table = render_table(&results, &filter);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Rank\t"));
        assert_eq!(lines[1], "1\t1 Main St\tPenrith\tNSW\t55.00\t55 min\twarning");
        assert_eq!(lines[2], "2\t1 Main St\tAtlantis\tNSW\tN/A\tN/A\terror");
    }

    #[test]
    fn empty_filter_renders_header_only() {
        let results = vec![result("Parramatta", 20.0, ResultTag::Success)];
        assert_eq!(render_table(&results, &TagFilter::none()).lines().count(), 1);
    }
}
