//! Listing aggregation across registered sources.
//!
//! The [`Aggregator`] owns the source registry, the result store and the
//! render limits. A refresh never fails for the caller: every source that
//! cannot be fetched or understood ends up with a zero result.

pub mod extract;

use crate::cli::OutputFormat;
use crate::fetch::{Fetch, FetchError};
use crate::models::{CountryResult, Limits};
use crate::report;
use extract::{SourceError, CATEGORY_GROUP, STATE_GROUP};
use futures::future::join_all;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

/// Aggregates listing counts for a set of sources.
pub struct Aggregator<F> {
    fetcher: F,
    sources: IndexMap<String, String>,
    results: IndexMap<String, CountryResult>,
    limits: Limits,
}

impl<F: Fetch> Aggregator<F> {
    /// Create an aggregator with no sources and unlimited output.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            sources: IndexMap::new(),
            results: IndexMap::new(),
            limits: Limits::unlimited(),
        }
    }

    /// Register `location` under `id`, replacing any existing registration.
    pub fn add_source(&mut self, id: impl Into<String>, location: impl Into<String>) {
        self.sources.insert(id.into(), location.into());
    }

    /// Unregister `id`. Returns whether it was registered.
    ///
    /// Stored results are left alone until the next refresh.
    pub fn remove_source(&mut self, id: &str) -> bool {
        self.sources.shift_remove(id).is_some()
    }

    /// Registered sources in registration order.
    pub fn sources(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sources.iter().map(|(id, loc)| (id.as_str(), loc.as_str()))
    }

    /// Set how many states and categories are rendered (0 = all).
    pub fn set_limits(&mut self, max_states: usize, max_categories: usize) {
        self.limits = Limits::new(max_states, max_categories);
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Result for `id` from the last refresh.
    pub fn result(&self, id: &str) -> Option<&CountryResult> {
        self.results.get(id)
    }

    /// All results from the last refresh, in registry order.
    pub fn results(&self) -> &IndexMap<String, CountryResult> {
        &self.results
    }

    /// Re-fetch every registered source and rebuild the result store.
    ///
    /// Fetches run concurrently; extraction runs per source in registry
    /// order. Previous results are discarded, including those of sources
    /// removed since the last refresh.
    pub async fn refresh(&mut self) {
        self.results.clear();

        info!("Refreshing {} sources", self.sources.len());
        let bodies = join_all(self.sources.values().map(|loc| self.fetcher.fetch(loc))).await;

        for ((id, location), body) in self.sources.iter().zip(bodies) {
            let result = self
                .results
                .entry(id.clone())
                .or_insert_with(CountryResult::empty);

            match populate(result, body) {
                Ok(()) => info!(
                    "{}: {} listings, {} states, {} categories",
                    id,
                    result.total,
                    result.states.len(),
                    result.categories.len()
                ),
                Err(e) => warn!("{}: no data from {}: {}", id, location, e),
            }
        }
    }

    /// Render one source (`id`) or, with an empty `id`, every source.
    ///
    /// Unknown ids render a "no data" payload in the requested format.
    pub fn render(&self, id: &str, format: OutputFormat) -> String {
        if id.is_empty() {
            let all = self.results.iter().map(|(k, v)| (k.as_str(), v));
            return match format {
                OutputFormat::Json => report::generate_json_report(all, self.limits),
                OutputFormat::Csv => report::generate_csv_report(all, self.limits),
            };
        }

        match self.results.get_key_value(id) {
            Some((key, result)) => {
                let one = std::iter::once((key.as_str(), result));
                match format {
                    OutputFormat::Json => report::generate_json_report(one, self.limits),
                    OutputFormat::Csv => report::generate_csv_report(one, self.limits),
                }
            }
            None => match format {
                OutputFormat::Json => report::json_not_found(id),
                OutputFormat::Csv => report::csv_not_found(id),
            },
        }
    }
}

/// Fill `result` from a fetched body. `total` is kept even when a filter
/// group is missing.
fn populate(
    result: &mut CountryResult,
    body: Result<String, FetchError>,
) -> Result<(), SourceError> {
    let text = body?;
    let doc = extract::parse_payload(&text)?;
    let metadata = extract::metadata(&doc)?;

    result.total = metadata.total.clone();

    for (name, target) in [
        (STATE_GROUP, &mut result.states),
        (CATEGORY_GROUP, &mut result.categories),
    ] {
        match extract::find_group(metadata.filters, name) {
            Ok(values) => extract::collect_counts(values, target),
            Err(e) => debug!("{}", e),
        }
    }

    Ok(())
}
