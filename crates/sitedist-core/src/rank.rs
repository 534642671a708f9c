//! Tag filtering and rank numbering over an already-sorted result list.

use serde::{Deserialize, Serialize};

use crate::result::{DistanceResult, ResultTag};

/// The set of result tags a consumer wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct TagFilter {
    pub success: bool,
    pub cached: bool,
    pub warning: bool,
    pub error: bool,
}

impl TagFilter {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            success: true,
            cached: true,
            warning: true,
            error: true,
        }
    }

    #[must_use]
    pub const fn none() -> Self {
        Self {
            success: false,
            cached: false,
            warning: false,
            error: false,
        }
    }

    pub fn set(&mut self, tag: ResultTag, enabled: bool) {
        match tag {
            ResultTag::Success => self.success = enabled,
            ResultTag::Cached => self.cached = enabled,
            ResultTag::Warning => self.warning = enabled,
            ResultTag::Error => self.error = enabled,
        }
    }

    #[must_use]
    pub fn with(mut self, tag: ResultTag, enabled: bool) -> Self {
        self.set(tag, enabled);
        self
    }

    #[must_use]
    pub fn allows(&self, tag: ResultTag) -> bool {
        match tag {
            ResultTag::Success => self.success,
            ResultTag::Cached => self.cached,
            ResultTag::Warning => self.warning,
            ResultTag::Error => self.error,
        }
    }
}

impl Default for TagFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<ResultTag> for TagFilter {
    fn from_iter<I: IntoIterator<Item = ResultTag>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::none(), |filter, tag| filter.with(tag, true))
    }
}

/// A result with its 1-based position in the filtered view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedResult<'a> {
    pub rank: usize,
    pub result: &'a DistanceResult,
}

/// Keeps the results whose tag `filter` allows, preserving input order, and
/// numbers them 1..N.
///
/// Pure: `results` is expected to be sorted already.
#[must_use]
pub fn filter_ranked<'a>(results: &'a [DistanceResult], filter: &TagFilter) -> Vec<RankedResult<'a>> {
    results
        .iter()
        .filter(|r| filter.allows(r.tag))
        .enumerate()
        .map(|(i, result)| RankedResult { rank: i + 1, result })
        .collect()
}
