//! Postal address value type and its canonical cache key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A free-text postal address: street/unit line, locality (suburb) and
/// region (state) code.
///
/// The street line may be empty when only the locality is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub locality: String,
    pub region: String,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        locality: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            locality: locality.into(),
            region: region.into(),
        }
    }

    /// Checks that locality and region are both non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IncompleteAddress`] naming the first blank field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.locality.trim().is_empty() {
            return Err(CoreError::IncompleteAddress("locality"));
        }
        if self.region.trim().is_empty() {
            return Err(CoreError::IncompleteAddress("region"));
        }
        Ok(())
    }

    /// The comma-joined text sent to the geocoder. A blank street line is
    /// omitted so the query starts at the locality.
    #[must_use]
    pub fn query_text(&self) -> String {
        [&self.street, &self.locality, &self.region]
            .into_iter()
            .map(|part| squash_whitespace(part))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Canonical cache key: lowercase `"{street}, {locality}, {region}"` with
    /// each component trimmed and inner whitespace runs collapsed.
    ///
    /// The street slot is kept even when empty so keys written by earlier
    /// versions of the cache file still match.
    #[must_use]
    pub fn canonical_key(&self) -> String {
        format!(
            "{}, {}, {}",
            squash_whitespace(&self.street),
            squash_whitespace(&self.locality),
            squash_whitespace(&self.region)
        )
        .to_lowercase()
    }

    /// Two addresses name the same place when their canonical keys match.
    #[must_use]
    pub fn same_place(&self, other: &Address) -> bool {
        self.canonical_key() == other.canonical_key()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query_text())
    }
}

fn squash_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
