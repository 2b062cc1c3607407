//! Route statistics computed directly from the raw response.
//!
//! This pass works on the untyped JSON rather than the route model: the
//! hazard attributes (`signs`, `cameras`) and turn descriptors it counts are
//! not part of the model, and may be shipped double-encoded.

use std::borrow::Cow;

use serde_json::{Map, Value, json};

use crate::route::{as_i64, decode_embedded, unwrap_response};

/// Errors that can occur while computing route statistics.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// A required field is absent; carries the full field path
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A field is present but has the wrong shape
    #[error("field {path} is not {expected}")]
    InvalidField { path: String, expected: &'static str },

    /// A string payload that should hold a JSON document does not
    #[error("malformed embedded JSON at {path}: {source}")]
    EmbeddedJson {
        path: String,
        source: serde_json::Error,
    },

    /// The route has a zero duration, so no average speed exists
    #[error("route duration is zero")]
    DivideByZero,
}

/// Summary figures for one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteStats {
    /// Metres.
    pub distance: i64,
    /// Seconds.
    pub duration: i64,
    /// km/h, from whole metres per second.
    pub average_speed: i64,
    pub left_turns: u64,
    pub right_turns: u64,
    pub streets_count: u64,
    pub humps_count: u64,
    pub cameras_count: u64,
}

impl RouteStats {
    /// Add the figures to an output record, one key per figure.
    pub fn write_into(&self, record: &mut Map<String, Value>) {
        record.insert("distance".into(), json!(self.distance));
        record.insert("duration".into(), json!(self.duration));
        record.insert("average_speed".into(), json!(self.average_speed));
        record.insert("left_turns".into(), json!(self.left_turns));
        record.insert("right_turns".into(), json!(self.right_turns));
        record.insert("streets_count".into(), json!(self.streets_count));
        record.insert("humps_count".into(), json!(self.humps_count));
        record.insert("cameras_count".into(), json!(self.cameras_count));
    }
}

/// A value inside the response together with its path, for error reporting.
#[derive(Debug, Clone)]
struct Cursor<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> Cursor<'a> {
    fn new(value: &'a Value, path: &str) -> Self {
        Self {
            value,
            path: path.to_string(),
        }
    }

    fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    /// Non-null member `key`, if any.
    fn optional(&self, key: &str) -> Option<Cursor<'a>> {
        self.value
            .get(key)
            .filter(|v| !v.is_null())
            .map(|value| Cursor {
                value,
                path: self.child_path(key),
            })
    }

    fn key(&self, key: &str) -> Result<Cursor<'a>, StatsError> {
        self.optional(key)
            .ok_or_else(|| StatsError::MissingField(self.child_path(key)))
    }

    fn at(&self, index: usize) -> Result<Cursor<'a>, StatsError> {
        let path = format!("{}[{index}]", self.path);
        match self.value.get(index) {
            Some(value) => Ok(Cursor { value, path }),
            None => Err(StatsError::MissingField(path)),
        }
    }

    fn elements(&self) -> Result<Vec<Cursor<'a>>, StatsError> {
        let items = self.value.as_array().ok_or_else(|| self.invalid("a list"))?;
        Ok(items
            .iter()
            .enumerate()
            .map(|(i, value)| Cursor {
                value,
                path: format!("{}[{i}]", self.path),
            })
            .collect())
    }

    fn int(&self) -> Result<i64, StatsError> {
        as_i64(self.value).ok_or_else(|| self.invalid("an integer"))
    }

    fn embedded(&self) -> Result<Cow<'a, Value>, StatsError> {
        decode_embedded(self.value).map_err(|source| StatsError::EmbeddedJson {
            path: self.path.clone(),
            source,
        })
    }

    fn invalid(&self, expected: &'static str) -> StatsError {
        StatsError::InvalidField {
            path: self.path.clone(),
            expected,
        }
    }
}

/// Whether a descriptor mentions `needle`.
///
/// Strings match on substring, lists on an equal string element, objects
/// on a key.
fn mentions(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.contains(needle),
        Value::Array(items) => items.iter().any(|v| v.as_str() == Some(needle)),
        Value::Object(map) => map.contains_key(needle),
        _ => false,
    }
}

fn count_humps(signs: &Cursor<'_>) -> Result<u64, StatsError> {
    let decoded = signs.embedded()?;
    let count = match &*decoded {
        Value::Array(items) => items.iter().filter(|s| mentions(s, "hump")).count(),
        Value::Object(map) => map.keys().filter(|k| k.contains("hump")).count(),
        Value::Null => 0,
        _ => return Err(signs.invalid("a list of signs")),
    };
    Ok(count as u64)
}

fn count_cameras(cameras: &Cursor<'_>) -> Result<u64, StatsError> {
    let decoded = cameras.embedded()?;
    let count = match &*decoded {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        Value::Null => 0,
        _ => return Err(cameras.invalid("a list of cameras")),
    };
    Ok(count as u64)
}

/// Integer division rounding towards negative infinity.
fn floor_div(a: i64, b: i64) -> i64 {
    let quotient = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && (a < 0) != (b < 0) {
        quotient - 1
    } else {
        quotient
    }
}

/// Compute the statistics of the first route of a log record.
///
/// The record holds the routing response under `response_body`, optionally
/// wrapped like any other response. Distance, duration and street count
/// come from the first subroute; turns are counted over all maneuvers and
/// hazards over the first subroute's physical edges.
pub fn calculate_stats(record: &Value) -> Result<RouteStats, StatsError> {
    let body = Cursor::new(record, "").key("response_body")?;
    let response = unwrap_response(body.value)
        .ok_or_else(|| StatsError::MissingField("response_body[0]".to_string()))?;
    let response = Cursor::new(response, &body.path);

    let route = response.key("result")?.at(0)?;
    let direction = route.key("driving_direction")?;
    let subroute = direction.key("subroutes")?.at(0)?;

    let distance = subroute.key("distance")?.int()?;
    let duration = subroute.key("duration")?.int()?;
    let streets_count = subroute
        .optional("streets")
        .and_then(|s| s.value.as_array().map(Vec::len))
        .unwrap_or(0) as u64;

    let mut left_turns = 0;
    let mut right_turns = 0;
    for item in direction.key("items")?.elements()? {
        let Some(instruction) = item.optional("instruction") else {
            continue;
        };
        let instruction = instruction.embedded()?;
        if let Some(turn) = instruction.get("turn_direction") {
            if mentions(turn, "left") {
                left_turns += 1;
            }
            if mentions(turn, "right") {
                right_turns += 1;
            }
        }
    }

    let mut humps_count = 0;
    let mut cameras_count = 0;
    for edge in subroute.key("edges")?.at(0)?.elements()? {
        if let Some(signs) = edge.optional("signs") {
            humps_count += count_humps(&signs)?;
        }
        if let Some(cameras) = edge.optional("cameras") {
            cameras_count += count_cameras(&cameras)?;
        }
    }

    if duration == 0 {
        return Err(StatsError::DivideByZero);
    }
    // Whole metres per second first, then km/h truncated.
    let average_speed = (floor_div(distance, duration) as f64 * 3.6) as i64;

    Ok(RouteStats {
        distance,
        duration,
        average_speed,
        left_turns,
        right_turns,
        streets_count,
        humps_count,
        cameras_count,
    })
}
