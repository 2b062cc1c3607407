//! Car routing response DTOs.
//!
//! These types map directly to the routing service's JSON. Every field is
//! optional here; which ones are actually required is decided during
//! conversion, so that a missing field can be reported with its full path.

use serde::Deserialize;
use serde_json::Value;

use super::flex;

/// Top level of a car routing response (after unwrapping).
#[derive(Debug, Clone, Deserialize)]
pub struct RawRouteSet {
    /// The request as echoed back by the service.
    pub query: Option<RawQuery>,

    /// Requesting user, if known.
    #[serde(default, deserialize_with = "flex::opt_string")]
    pub user_id: Option<String>,

    /// Alternative routes, best first.
    pub result: Option<Vec<RawRoute>>,
}

/// Query echoed back in the response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuery {
    pub locale: Option<String>,

    #[serde(rename = "type", default, deserialize_with = "flex::opt_string")]
    pub kind: Option<String>,

    pub point_a_name: Option<String>,

    pub point_b_name: Option<String>,

    pub points: Option<Vec<RawQueryPoint>>,
}

/// One requested point.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQueryPoint {
    #[serde(rename = "type", default, deserialize_with = "flex::opt_string")]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub x: Option<f64>,

    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub y: Option<f64>,

    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub zlevel: Option<i64>,
}

/// One route alternative.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRoute {
    pub driving_direction: Option<RawDrivingDirection>,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub route_id: Option<String>,
}

/// Turn-by-turn description of a route.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDrivingDirection {
    #[serde(rename = "type", default, deserialize_with = "flex::opt_string")]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "flex::opt_string")]
    pub rule: Option<String>,

    pub subroutes: Option<Vec<RawSubroute>>,

    pub items: Option<Vec<RawItem>>,
}

/// A leg of the route between two waypoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSubroute {
    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub distance: Option<i64>,

    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub duration: Option<i64>,

    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub id: Option<i64>,

    pub start_point: Option<RawWayPoint>,

    pub finish_point: Option<RawWayPoint>,

    /// Physical edges. The service wraps them in an extra list; only the
    /// first inner list carries data.
    pub edges: Option<Vec<Vec<RawEdge>>>,

    /// Street names along the leg.
    pub streets: Option<Value>,
}

/// Start or finish of a subroute.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWayPoint {
    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub id: Option<i64>,

    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub part: Option<f64>,

    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub seconds: Option<f64>,

    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub meters: Option<f64>,
}

/// A road edge, either a full physical edge inside a subroute or an
/// overlay record inside a maneuver item.
///
/// Overlay records usually carry only `id` plus the fields that differ
/// from the physical edge (`segment`, `geometry`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEdge {
    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub id: Option<i64>,

    #[serde(rename = "class", default, deserialize_with = "flex::opt_i64")]
    pub class_id: Option<i64>,

    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub begin_part: Option<f64>,

    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub end_part: Option<f64>,

    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub length: Option<f64>,

    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub shape_id: Option<i64>,

    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub speed: Option<f64>,

    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub width: Option<f64>,

    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub traffic_type: Option<i64>,

    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub time: Option<f64>,

    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub default_speed: Option<f64>,

    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub street_id: Option<i64>,

    /// Traversed window along the edge shape, as fractions of its length.
    pub segment: Option<RawSegment>,

    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub z_level_begin: Option<i64>,

    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub z_level_end: Option<i64>,

    /// Shape as `"lon lat"` tokens.
    pub geometry: Option<Vec<String>>,
}

/// `{begin, end}` window in `[0, 1]`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawSegment {
    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub begin: Option<f64>,

    #[serde(default, deserialize_with = "flex::opt_f64")]
    pub end: Option<f64>,
}

/// One maneuver of the turn-by-turn guidance.
#[derive(Debug, Clone, Deserialize)]
pub struct RawItem {
    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub id: Option<i64>,

    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub distance: Option<i64>,

    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub duration: Option<i64>,

    /// Id of the subroute whose edges this maneuver uses.
    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub subroute: Option<i64>,

    pub edges: Option<Vec<RawEdge>>,

    /// Instruction block. Sometimes shipped as a JSON-encoded string.
    pub instruction: Option<Value>,
}

/// Decoded instruction block of a maneuver.
#[derive(Debug, Clone, Deserialize)]
pub struct RawInstruction {
    #[serde(default, deserialize_with = "flex::opt_i64")]
    pub id: Option<i64>,

    #[serde(rename = "type", default, deserialize_with = "flex::opt_string")]
    pub kind: Option<String>,

    pub names: Option<Value>,

    pub turn_direction: Option<Value>,
}
