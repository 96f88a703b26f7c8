//! Wire-shape normalization.
//!
//! The content backends are spreadsheet-backed and loose about types: numbers
//! arrive where strings are expected, nested records arrive pre-serialized as
//! JSON strings, lists show up as single values, and keyed objects stand in
//! for arrays. Each helper here normalizes one of those shapes into a single
//! canonical form at the ingestion boundary; any other shape is a parse
//! failure there, never ambiguous data further in.

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Accepts a JSON string or number and yields a `String`.
///
/// Mobile numbers and pincodes are the main customers: a numeric cell loses
/// leading digits and picks up locale formatting the moment it is treated as
/// a number, so they are coerced to text exactly once, here.
///
/// # Errors
///
/// Fails when the value is neither a string, a number, nor null.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// [`string_or_number`], but absent/null values become `None`.
///
/// # Errors
///
/// Fails when the value is neither a string, a number, nor null.
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Accepts a list of strings, a single bare string, or null.
///
/// # Errors
///
/// Fails when the value has any other shape.
pub fn string_list_or_single<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s]),
        Value::Array(values) => Ok(values
            .into_iter()
            .filter_map(|value| match value {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect()),
        other => Err(D::Error::custom(format!(
            "expected string or list of strings, got {other}"
        ))),
    }
}

/// Accepts a value either inline or pre-serialized as a JSON string.
///
/// Persisted vehicle variants arrive both ways. A value that fails to parse
/// degrades to `None` ("nothing selected") instead of failing the record it
/// sits in.
///
/// # Errors
///
/// Infallible beyond the deserializer's own input errors; malformed payloads
/// degrade to `None` by design of the callers.
pub fn lenient_json<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(raw) => Ok(serde_json::from_str(&raw).ok()),
        other => Ok(serde_json::from_value(other).ok()),
    }
}

/// Accepts a key→scalar object and yields an ordered string map.
///
/// # Errors
///
/// Fails when the value is neither an object nor null.
pub fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(BTreeMap::new()),
        Value::Object(entries) => Ok(entries
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(s) => Some((key, s)),
                Value::Number(n) => Some((key, n.to_string())),
                Value::Bool(b) => Some((key, b.to_string())),
                _ => None,
            })
            .collect()),
        other => Err(D::Error::custom(format!("expected object, got {other}"))),
    }
}

/// Serializes a value as an embedded JSON string (the `itemsJson` convention).
///
/// # Errors
///
/// Fails when the inner value cannot be serialized.
pub fn as_json_string<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    let raw = serde_json::to_string(value).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&raw)
}

/// Deserializes a value that may arrive inline or as an embedded JSON string.
///
/// Unlike [`lenient_json`] this is strict: the field is required to parse,
/// because the callers (order item snapshots) cannot meaningfully degrade.
///
/// # Errors
///
/// Fails when neither shape parses into `T`.
pub fn from_json_string_or_value<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(raw) => serde_json::from_str(&raw).map_err(D::Error::custom),
        other => serde_json::from_value(other).map_err(D::Error::custom),
    }
}
