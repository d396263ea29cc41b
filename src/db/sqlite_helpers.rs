//! SQLite helper utilities for type conversion
//!
//! SQLite has no native array type, so genre lists are stored as JSON
//! strings and queried with `json_each`.

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

/// Get current UTC timestamp as ISO8601 string for SQLite
#[inline]
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339()
}

/// Serialize a Vec to a JSON string for SQLite storage
#[inline]
pub fn vec_to_json<T: Serialize>(v: &[T]) -> String {
    serde_json::to_string(v).unwrap_or_else(|_| "[]".to_string())
}

/// Deserialize a JSON string from SQLite to a Vec
#[inline]
pub fn json_to_vec<T: DeserializeOwned>(s: &str) -> Vec<T> {
    serde_json::from_str(s).unwrap_or_default()
}

/// Build a SQL fragment to check if a value exists in a JSON array column.
/// The fragment consumes one bind placeholder.
pub fn json_array_contains_sql(column: &str) -> String {
    format!(
        "EXISTS (SELECT 1 FROM json_each({}) WHERE value = ?)",
        column
    )
}
