//! Number selection syntax shared by page selection and custom card orders.
//!
//! A selection is a comma- or whitespace-separated list of items. Each item is
//! either a non-negative integer or a dash-separated range. Both ends of a
//! range are optional: a missing start means the lowest allowed number and a
//! missing end means the highest. Examples:
//!
//! - `"-3, 7, 10-20, 50-"`
//! - `"1 2 3 4"`
//! - `"10-"`
//! - `"-"` (every allowed number)
//!
//! Ordered selections keep duplicates and the written order, which is what a
//! custom card order needs: a repeated number marks a variant and the order is
//! the order of the cards in the document. Unique selections collapse
//! duplicates and come out ascending.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use crate::error::RangeError;

/// One input to a [`RangeSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSpec {
    /// Text in the selection syntax
    Text(String),
    /// A single number
    Single(u32),
    /// An inclusive range of numbers
    Span(RangeInclusive<u32>),
}

impl From<&str> for RangeSpec {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for RangeSpec {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<u32> for RangeSpec {
    fn from(n: u32) -> Self {
        Self::Single(n)
    }
}

impl From<RangeInclusive<u32>> for RangeSpec {
    fn from(range: RangeInclusive<u32>) -> Self {
        Self::Span(range)
    }
}

/// A bounded selection of numbers built from one or more [`RangeSpec`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSet {
    min: u32,
    max: u32,
    unique: bool,
    entries: Vec<u32>,
}

impl RangeSet {
    /// Build a selection from several specs, every number within `[min, max]`.
    ///
    /// All specs are validated before any of them is expanded, so a typo
    /// anywhere fails the whole selection instead of contributing part of it.
    pub fn new<I>(specs: I, min: u32, max: u32, unique: bool) -> Result<Self, RangeError>
    where
        I: IntoIterator,
        I::Item: Into<RangeSpec>,
    {
        if min > max {
            return Err(RangeError::EmptyBounds { min, max });
        }

        let mut spans = Vec::new();
        for spec in specs {
            spans.extend(resolve_spec(spec.into(), min, max)?);
        }

        let values = spans.into_iter().flatten();
        let entries = if unique {
            values.collect::<BTreeSet<_>>().into_iter().collect()
        } else {
            values.collect()
        };

        Ok(Self {
            min,
            max,
            unique,
            entries,
        })
    }

    /// Parse a single text spec. Empty text selects the whole `[min, max]`.
    pub fn parse(text: &str, min: u32, max: u32, unique: bool) -> Result<Self, RangeError> {
        Self::new([text], min, max, unique)
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The number at a 0-based index.
    pub fn get(&self, idx: usize) -> Option<u32> {
        self.entries.get(idx).copied()
    }

    pub fn contains(&self, n: u32) -> bool {
        self.entries.contains(&n)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.entries.iter().copied()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.entries
    }

    /// Every number selected more than once, ascending.
    pub fn duplicates(&self) -> BTreeSet<u32> {
        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for &n in &self.entries {
            *counts.entry(n).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|&(_, count)| count > 1)
            .map(|(n, _)| n)
            .collect()
    }
}

impl<'a> IntoIterator for &'a RangeSet {
    type Item = u32;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, u32>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().copied()
    }
}

fn resolve_spec(
    spec: RangeSpec,
    min: u32,
    max: u32,
) -> Result<Vec<RangeInclusive<u32>>, RangeError> {
    match spec {
        RangeSpec::Text(text) => parse_text(&text, min, max),
        RangeSpec::Single(n) => {
            check_bounds(n, &n.to_string(), min, max)?;
            Ok(vec![n..=n])
        }
        RangeSpec::Span(range) => {
            let token = format!("{}-{}", range.start(), range.end());
            check_span(&range, &token, min, max)?;
            Ok(vec![range])
        }
    }
}

fn parse_text(text: &str, min: u32, max: u32) -> Result<Vec<RangeInclusive<u32>>, RangeError> {
    let tokens: Vec<&str> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        return Ok(vec![min..=max]);
    }

    tokens
        .into_iter()
        .map(|token| parse_token(token, min, max))
        .collect()
}

fn parse_token(token: &str, min: u32, max: u32) -> Result<RangeInclusive<u32>, RangeError> {
    let range = match token.split_once('-') {
        Some((start, end)) => {
            let start = parse_bound(start, token)?.unwrap_or(min);
            let end = parse_bound(end, token)?.unwrap_or(max);
            start..=end
        }
        None => {
            let n = parse_number(token, token)?;
            n..=n
        }
    };
    check_span(&range, token, min, max)?;
    Ok(range)
}

fn parse_bound(text: &str, token: &str) -> Result<Option<u32>, RangeError> {
    if text.is_empty() {
        Ok(None)
    } else {
        parse_number(text, token).map(Some)
    }
}

fn parse_number(text: &str, token: &str) -> Result<u32, RangeError> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RangeError::malformed(token));
    }
    text.parse().map_err(|_| RangeError::malformed(token))
}

fn check_span(range: &RangeInclusive<u32>, token: &str, min: u32, max: u32) -> Result<(), RangeError> {
    check_bounds(*range.start(), token, min, max)?;
    check_bounds(*range.end(), token, min, max)?;
    if range.start() > range.end() {
        return Err(RangeError::reversed(token));
    }
    Ok(())
}

fn check_bounds(n: u32, token: &str, min: u32, max: u32) -> Result<(), RangeError> {
    if (min..=max).contains(&n) {
        Ok(())
    } else {
        Err(RangeError::out_of_bounds(token, min, max))
    }
}

#[cfg(test)]
#[path = "tests/range_tests.rs"]
mod tests;
