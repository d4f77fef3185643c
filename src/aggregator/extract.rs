//! Metadata extraction from raw listing payloads.
//!
//! Payloads come from an external API with a loose schema, so every
//! accessor here returns an absence signal instead of failing hard.

use crate::fetch::FetchError;
use crate::models::Count;
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Filter group holding counts by region.
pub const STATE_GROUP: &str = "state";

/// Filter group holding counts by top-level category.
pub const CATEGORY_GROUP: &str = "parentcategory";

/// Reasons a source yields no (or partial) data during a refresh.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("malformed JSON payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("payload has no metadata block")]
    MissingMetadata,
    #[error("invalid metadata: {0}")]
    SchemaInvalid(&'static str),
    #[error("filter group '{0}' not found")]
    GroupNotFound(String),
}

/// The validated `metadata` block of a payload.
#[derive(Debug)]
pub struct Metadata<'a> {
    pub total: &'a Value,
    pub filters: &'a [Value],
}

/// Look up `key` on an object. Missing keys, `null` values and
/// non-object parents all count as absent.
fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value.get(key) {
        None | Some(Value::Null) => None,
        Some(v) => Some(v),
    }
}

/// Parse raw payload text.
pub fn parse_payload(text: &str) -> Result<Value, SourceError> {
    Ok(serde_json::from_str(text)?)
}

/// Extract and validate the `metadata` block: `total` must be present
/// and `filters` must be a list. `total` is passed through untouched.
pub fn metadata(doc: &Value) -> Result<Metadata<'_>, SourceError> {
    let metadata = field(doc, "metadata").ok_or(SourceError::MissingMetadata)?;

    let total = field(metadata, "total").ok_or(SourceError::SchemaInvalid("missing total"))?;
    let filters = field(metadata, "filters").ok_or(SourceError::SchemaInvalid("missing filters"))?;
    let filters = filters
        .as_array()
        .ok_or(SourceError::SchemaInvalid("filters is not a list"))?;

    Ok(Metadata {
        total,
        filters: filters.as_slice(),
    })
}

/// Find the `value` of the filter group called `name`.
///
/// Groups are scanned in order and the scan stops at the first entry that
/// lacks `name` or `value`, so a matching group after a malformed entry is
/// reported as not found.
pub fn find_group<'a>(filters: &'a [Value], name: &str) -> Result<&'a Value, SourceError> {
    for group in filters {
        let (Some(group_name), Some(values)) = (field(group, "name"), field(group, "value")) else {
            debug!("Filter scan for '{}' stopped at malformed entry", name);
            break;
        };
        if group_name.as_str() == Some(name) {
            return Ok(values);
        }
    }

    Err(SourceError::GroupNotFound(name.to_string()))
}

/// Copy `{value, count}` pairs from a group into `target`.
///
/// A repeated `value` overwrites the earlier count in place. Entries
/// without a string `value` or an integer `count` are skipped.
pub fn collect_counts(values: &Value, target: &mut IndexMap<String, Count>) {
    let Some(entries) = values.as_array() else {
        debug!("Filter group value is not a list; ignoring");
        return;
    };

    for entry in entries {
        match (
            field(entry, "value").and_then(Value::as_str),
            field(entry, "count").and_then(Value::as_i64),
        ) {
            (Some(name), Some(count)) => {
                target.insert(name.to_string(), count);
            }
            _ => debug!("Skipping malformed filter entry: {}", entry),
        }
    }
}
