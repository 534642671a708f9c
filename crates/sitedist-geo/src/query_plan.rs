//! Builds the ordered list of geocoding queries tried for one address.
//!
//! Queries run from most to least specific. Each carries a match level
//! (0 = exact) and a short description that ends up in the result's status
//! label, so a broad match is visible to the user.

use std::sync::LazyLock;

use regex::Regex;

pub const EXACT_ADDRESS: &str = "exact address";
pub const WITHOUT_UNIT: &str = "without shop/unit";
pub const SHOPPING_CENTRE: &str = "shopping centre with suburb";
pub const STREET_WITH_SUBURB: &str = "street name with suburb";
pub const SUBURB_AND_STATE: &str = "suburb and state";
pub const STATE_ONLY: &str = "state only";

/// Shortest street name (after removing the building number) worth a
/// street-level query. "5 A" → "A" is not.
const MIN_STREET_NAME_LEN: usize = 4;

static UNIT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:shop|unit|suite|level|t/a|tenancy|lot)\s*\d+[a-z]?\s*,?\s*")
        .expect("valid unit prefix regex")
});

/// `3/15 Smith St` style unit numbers.
static UNIT_SLASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[A-Za-z]?\s*/\s*(\d)").expect("valid unit slash regex"));

static BUILDING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+[A-Za-z]?(?:\s*[-/]\s*\d+[A-Za-z]?)?\s+").expect("valid building number regex")
});

static VENUE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)([a-z][a-z'&.\- ]*?\s(?:shopping\s+(?:centre|center|village|plaza|mall)|market\s*place|markets?|plaza|fair|mall))\b",
    )
    .expect("valid venue regex")
});

static REGION_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]{2,3})(?:\s+\d{4})?$").expect("valid region code regex")
});

/// One geocoding query in the fallback sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCandidate {
    pub query: String,
    pub level: u8,
    pub description: &'static str,
}

/// The fallback sequence for one address plus the locality it asked for,
/// used to pick among candidates on locality-level searches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPlan {
    pub candidates: Vec<QueryCandidate>,
    pub locality: Option<String>,
}

impl QueryPlan {
    fn push(&mut self, query: String, level: u8, description: &'static str) {
        let query = query.trim().to_owned();
        if query.is_empty() {
            return;
        }
        let duplicate = self
            .candidates
            .iter()
            .any(|c| c.query.eq_ignore_ascii_case(&query));
        if duplicate {
            tracing::trace!(%query, description, "skipping duplicate geocode query");
            return;
        }
        self.candidates.push(QueryCandidate {
            query,
            level,
            description,
        });
    }
}

/// Splits `address_text` on commas and lays out the fallback queries:
///
/// | Level | Description                  | Query                                  |
/// |-------|------------------------------|----------------------------------------|
/// | 0     | exact address                | the text as given                      |
/// | 1     | without shop/unit            | street with unit/shop prefix removed   |
/// | 1     | shopping centre with suburb  | venue name + locality + region         |
/// | 2     | street name with suburb      | street without number + locality + region |
/// | 3     | suburb and state             | locality + region                      |
/// | 4     | state only                   | region code + `country`                |
///
/// The last two comma-separated parts are taken as locality and region.
/// With only two parts there is no street, so the exact query would be the
/// locality query and is reported as such. A bare `"Suburb, STATE"` address
/// therefore matches at level 3 and is tagged broad, never exact. Queries
/// that repeat an earlier one are dropped.
#[must_use]
pub fn build_query_plan(address_text: &str, country: &str) -> QueryPlan {
    let parts: Vec<&str> = address_text
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut plan = QueryPlan::default();

    if parts.len() < 2 {
        plan.push(parts.join(", "), 0, EXACT_ADDRESS);
        return plan;
    }

    let (street_parts, tail) = parts.split_at(parts.len() - 2);
    let locality = tail[0];
    let region = tail[1];
    plan.locality = Some(locality.to_owned());

    if !street_parts.is_empty() {
        plan.push(parts.join(", "), 0, EXACT_ADDRESS);

        if let Some(stripped) = without_unit(street_parts) {
            plan.push(format!("{stripped}, {locality}, {region}"), 1, WITHOUT_UNIT);
        }

        if let Some(venue) = street_parts.iter().find_map(|p| venue_name(p)) {
            plan.push(format!("{venue}, {locality}, {region}"), 1, SHOPPING_CENTRE);
        }

        if let Some(street) = street_parts.last().and_then(|p| street_name(p)) {
            plan.push(format!("{street}, {locality}, {region}"), 2, STREET_WITH_SUBURB);
        }
    }

    plan.push(format!("{locality}, {region}"), 3, SUBURB_AND_STATE);

    let state = region_code(region).unwrap_or_else(|| region.to_owned());
    plan.push(format!("{state}, {country}"), 4, STATE_ONLY);

    plan
}

/// Strips a leading unit token from a single street component.
fn strip_unit(part: &str) -> String {
    let stripped = UNIT_PREFIX.replace(part, "");
    UNIT_SLASH.replace(&stripped, "$1").trim().to_owned()
}

/// The street line with the unit token removed from its first component, or
/// `None` if nothing was removed or nothing is left.
fn without_unit(street_parts: &[&str]) -> Option<String> {
    let (first, rest) = street_parts.split_first()?;
    let cleaned = strip_unit(first);
    if cleaned == *first {
        return None;
    }
    let remaining: Vec<&str> = std::iter::once(cleaned.as_str())
        .filter(|p| !p.is_empty())
        .chain(rest.iter().copied())
        .collect();
    if remaining.is_empty() {
        None
    } else {
        Some(remaining.join(", "))
    }
}

/// A venue phrase such as "Castle Towers Shopping Centre" or
/// "Eastgate Market Place" inside one street component.
fn venue_name(part: &str) -> Option<String> {
    let caps = VENUE_NAME.captures(part)?;
    let venue = caps.get(1)?.as_str().trim();
    (!venue.is_empty()).then(|| venue.to_owned())
}

/// The street component with its unit token and building number removed,
/// if a number was removed and what remains is long enough to search on.
fn street_name(part: &str) -> Option<String> {
    let base = strip_unit(part);
    let name = BUILDING_NUMBER.replace(&base, "");
    let name = name.trim();
    if name == base || name.chars().count() < MIN_STREET_NAME_LEN {
        return None;
    }
    name.chars()
        .any(char::is_alphabetic)
        .then(|| name.to_owned())
}

/// Extracts a 2–3 letter region code, allowing a trailing 4-digit postcode:
/// `"NSW 2150"` → `"NSW"`.
#[must_use]
pub fn region_code(part: &str) -> Option<String> {
    REGION_CODE
        .captures(part.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase())
}

#[cfg(test)]
#[path = "query_plan_test.rs"]
mod tests;
