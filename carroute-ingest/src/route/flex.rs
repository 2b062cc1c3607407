//! Lenient field decoding for routing-service JSON.
//!
//! The routing service is inconsistent about scalar types: the same field
//! may arrive as `12`, `12.0` or `"12"` depending on the backend version.
//! These helpers accept all of them.

use std::borrow::Cow;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Flag(bool),
}

/// Optional float given as a number or a numeric string.
pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(i)) => Ok(Some(i as f64)),
        Some(Scalar::Float(f)) => Ok(Some(f)),
        Some(Scalar::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected a number, got {s:?}"))),
        Some(Scalar::Flag(b)) => Err(D::Error::custom(format!("expected a number, got {b}"))),
    }
}

/// Optional integer given as a number or a numeric string.
///
/// Fractional numbers are truncated toward zero.
pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(i)) => Ok(Some(i)),
        Some(Scalar::Float(f)) => Ok(Some(f.trunc() as i64)),
        Some(Scalar::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected an integer, got {s:?}"))),
        Some(Scalar::Flag(b)) => Err(D::Error::custom(format!("expected an integer, got {b}"))),
    }
}

/// Optional identifier or label given as a string or a number.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Text(s) => s,
        Scalar::Flag(b) => b.to_string(),
    }))
}

/// Integer view of a raw JSON value, with the same leniency as [`opt_i64`].
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decode a payload that may itself be a JSON document encoded as a string.
///
/// Some maneuver and edge attributes are shipped double-encoded. Anything
/// that is not a string is returned as-is.
pub fn decode_embedded(value: &Value) -> Result<Cow<'_, Value>, serde_json::Error> {
    match value {
        Value::String(s) => serde_json::from_str(s).map(Cow::Owned),
        other => Ok(Cow::Borrowed(other)),
    }
}
