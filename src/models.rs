//! Data models for the listing aggregator.
//!
//! This module contains the per-source result record and the render-time
//! truncation limits shared by the aggregator and the report renderers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A listing count as reported by the source API.
pub type Count = i64;

/// Aggregated listing counts for one source (country).
///
/// `states` and `categories` keep the order in which entries appeared in
/// the source's filter list.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryResult {
    /// Overall number of listings, exactly as the source reported it.
    pub total: Value,
    /// Listing counts keyed by region/state name.
    pub states: IndexMap<String, Count>,
    /// Listing counts keyed by parent category name.
    pub categories: IndexMap<String, Count>,
}

impl Default for CountryResult {
    fn default() -> Self {
        Self {
            total: Value::from(0),
            states: IndexMap::new(),
            categories: IndexMap::new(),
        }
    }
}

impl CountryResult {
    /// Creates the zero result every source starts from on refresh.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The total as a bare CSV field: strings unquoted, anything else as JSON.
    pub fn total_text(&self) -> String {
        match self.total {
            Value::String(ref s) => s.clone(),
            ref other => other.to_string(),
        }
    }

    /// Returns true if no usable data was extracted for the source.
    pub fn is_empty(&self) -> bool {
        self.total == 0 && self.states.is_empty() && self.categories.is_empty()
    }

    /// Returns the first `limit` states, or all of them when `limit` is 0.
    pub fn limited_states(&self, limit: usize) -> impl Iterator<Item = (&String, &Count)> {
        take_limited(&self.states, limit)
    }

    /// Returns the first `limit` categories, or all of them when `limit` is 0.
    pub fn limited_categories(&self, limit: usize) -> impl Iterator<Item = (&String, &Count)> {
        take_limited(&self.categories, limit)
    }
}

fn take_limited(map: &IndexMap<String, Count>, limit: usize) -> impl Iterator<Item = (&String, &Count)> {
    let n = if limit == 0 { map.len() } else { limit };
    map.iter().take(n)
}

/// Number of states and categories to include in rendered output.
///
/// `0` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default)]
    pub max_states: usize,
    #[serde(default)]
    pub max_categories: usize,
}

impl Limits {
    pub fn new(max_states: usize, max_categories: usize) -> Self {
        Self {
            max_states,
            max_categories,
        }
    }

    /// No truncation.
    pub fn unlimited() -> Self {
        Self::default()
    }
}
