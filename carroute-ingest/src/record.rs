//! Assembly of the city-keyed output record.
//!
//! A log record carries the request line and the routing response. The
//! output is the same record augmented with the route statistics, the
//! reconstructed geometry and the route identifiers, keyed by the city
//! named in the request path.

use serde_json::{Map, Value};

use crate::route::{ConversionError, RouteSet};
use crate::stats::{StatsError, calculate_stats};

/// Position of the city in the `/`-separated request path
/// (`/carrouting/<version>/<city>/...`).
const CITY_PATH_INDEX: usize = 3;

/// Errors that can occur while turning a log record into an output record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The request line does not name a city
    #[error("cannot find a city in request {0:?}")]
    InvalidRequest(String),

    /// The city cannot name an output collection
    #[error("unusable city name {0:?}")]
    InvalidCity(String),

    #[error("response has no route")]
    NoRoute,

    #[error("route reconstruction failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("statistics failed: {0}")]
    Stats(#[from] StatsError),
}

/// An output record and the city collection it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct CityRecord {
    pub city: String,
    pub document: Map<String, Value>,
}

/// Whether `city` can name an output collection: non-empty, made of
/// letters, digits, `_` and `-` only.
pub fn is_valid_city(city: &str) -> bool {
    !city.is_empty()
        && city
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

/// Extract the city from a request line such as
/// `POST /carrouting/3.0.0/moscow/ HTTP/1.1`.
///
/// A query string is not part of the city.
pub fn city_from_request(request: &str) -> Result<&str, RecordError> {
    let city = request
        .split(' ')
        .nth(1)
        .map(|target| target.split_once('?').map_or(target, |(path, _)| path))
        .and_then(|path| path.split('/').nth(CITY_PATH_INDEX))
        .filter(|city| !city.is_empty())
        .ok_or_else(|| RecordError::InvalidRequest(request.to_string()))?;

    if !is_valid_city(city) {
        return Err(RecordError::InvalidCity(city.to_string()));
    }
    Ok(city)
}

/// Build the output record for one log record.
///
/// Only the first route of the response is used.
pub fn build_city_record(record: Value) -> Result<CityRecord, RecordError> {
    let fields = record.as_object().ok_or(RecordError::NotAnObject)?;

    let request = fields
        .get("request")
        .ok_or(RecordError::MissingField("request"))?;
    let request = request
        .as_str()
        .ok_or_else(|| RecordError::InvalidRequest(request.to_string()))?;
    let city = city_from_request(request)?.to_string();

    let body = fields
        .get("response_body")
        .ok_or(RecordError::MissingField("response_body"))?;
    let routes = RouteSet::from_value(body)?;
    let route = routes.route.ok_or(RecordError::NoRoute)?;

    let stats = calculate_stats(&record)?;
    let geometry = route.path()?;

    let Value::Object(mut document) = record else {
        return Err(RecordError::NotAnObject);
    };
    stats.write_into(&mut document);
    document.insert("geometry".into(), Value::String(geometry));
    document.insert("user_id".into(), Value::String(routes.user_id));
    document.insert("route_id".into(), Value::String(route.route_id));

    Ok(CityRecord { city, document })
}
