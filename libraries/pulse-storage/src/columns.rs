//! Encoding of JSON set columns and millisecond timestamps
//!
//! Set columns hold JSON arrays of ids. Single-element edits run inside SQLite
//! with `json_each` so a write never replaces the rest of the array.

use crate::error::{Result, StorageError};
use chrono::{DateTime, Utc};
use pulse_core::IdSet;
use serde::{de::DeserializeOwned, Serialize};

pub(crate) fn decode_set<T>(raw: &str) -> Result<IdSet<T>>
where
    T: DeserializeOwned + PartialEq,
{
    Ok(serde_json::from_str(raw)?)
}

pub(crate) fn encode_set<T>(set: &IdSet<T>) -> Result<String>
where
    T: Serialize + Clone,
{
    Ok(serde_json::to_string(set)?)
}

/// Subquery yielding `column` without the bound value, order preserved
pub(crate) fn without_value(column: &str) -> String {
    format!(
        "(SELECT json_group_array(json_each.value) FROM json_each({column}) \
         WHERE json_each.value <> ?)"
    )
}

/// Predicate true when `column` contains the bound value
pub(crate) fn contains_value(column: &str) -> String {
    format!("EXISTS (SELECT 1 FROM json_each({column}) WHERE json_each.value = ?)")
}

pub(crate) fn timestamp(millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StorageError::SerializationError(format!("Invalid timestamp: {}", millis)))
}
