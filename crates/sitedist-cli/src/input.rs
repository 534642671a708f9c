//! Turning pasted or piped text into site addresses.
//!
//! Accepted line formats:
//! - spreadsheet columns, tab-separated: `street<TAB>suburb<TAB>state`
//! - comma-separated: `street, suburb, state` (extra leading parts are kept
//!   in the street) or `suburb, state`
//! - pipe-separated: `street | suburb | state`

use std::sync::LazyLock;

use regex::Regex;
use sitedist_core::Address;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Parses one line into an address, or `None` if it has no recognisable
/// suburb and state.
#[must_use]
pub fn parse_address_line(line: &str) -> Option<Address> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if line.contains('\t') {
        if let [street, suburb, state, ..] = split_nonempty(line, '\t').as_slice() {
            return Some(Address::new(*street, *suburb, *state));
        }
    }

    if line.contains(',') {
        let parts = split_nonempty(line, ',');
        match parts.as_slice() {
            [street @ .., suburb, state] if !street.is_empty() => {
                return Some(Address::new(street.join(", "), *suburb, *state));
            }
            [suburb, state] => return Some(Address::new("", *suburb, *state)),
            _ => {}
        }
    }

    if line.contains('|') {
        if let [street, suburb, state, ..] = split_nonempty(line, '|').as_slice() {
            return Some(Address::new(*street, *suburb, *state));
        }
    }

    None
}

fn split_nonempty(line: &str, separator: char) -> Vec<&str> {
    line.split(separator)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Flattens a reference address copied from a spreadsheet or a multi-line
/// text box into one comma-separated line.
#[must_use]
pub fn normalize_reference(text: &str) -> String {
    let joined = text.replace('\r', "").replace(['\t', '\n'], ", ");
    let squashed = WHITESPACE.replace_all(&joined, " ");
    squashed
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of [`parse_sites`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedSites {
    pub addresses: Vec<Address>,
    /// Lines that repeated an earlier address.
    pub duplicates: usize,
    /// Non-blank lines that could not be parsed.
    pub rejected: usize,
}

/// Parses every line of `text`, dropping repeats of an earlier address.
/// Repeats are matched by [`Address::same_place`], so case and spacing
/// differences do not count.
#[must_use]
pub fn parse_sites(text: &str) -> ParsedSites {
    let mut parsed = ParsedSites::default();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        match parse_address_line(line) {
            Some(address) if address.validate().is_ok() => {
                if parsed.addresses.iter().any(|a| a.same_place(&address)) {
                    parsed.duplicates += 1;
                } else {
                    parsed.addresses.push(address);
                }
            }
            _ => {
                tracing::debug!(line, "skipping unparseable site line");
                parsed.rejected += 1;
            }
        }
    }
    parsed
}

#[cfg(test)]
#[path = "input_test.rs"]
mod tests;
