//! Route model built from a car routing response.
//!
//! A driving direction is made of subroutes, each owning the physical
//! edges it may traverse, and an ordered list of maneuver items. Items do
//! not own physical edges: they reference them by id and may override the
//! traversed window or the shape. All types are immutable once built.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

/// Traversed window along an edge, as fractions of its length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentWindow {
    pub begin: f64,
    pub end: f64,
}

impl SegmentWindow {
    /// The whole edge.
    pub const FULL: SegmentWindow = SegmentWindow {
        begin: 0.0,
        end: 1.0,
    };

    /// Create a window, rejecting bounds outside `[0, 1]`.
    pub fn new(begin: f64, end: f64) -> Option<Self> {
        let in_range = |v: f64| (0.0..=1.0).contains(&v);
        if in_range(begin) && in_range(end) {
            Some(Self { begin, end })
        } else {
            None
        }
    }

    /// Whether this window covers the whole edge.
    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }

    /// Whether this window covers nothing at all.
    pub fn is_degenerate(&self) -> bool {
        self.begin == self.end
    }
}

impl Default for SegmentWindow {
    fn default() -> Self {
        Self::FULL
    }
}

/// A road edge with its shape and traversal attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: i64,
    pub class_id: i64,
    pub begin_part: f64,
    pub end_part: f64,
    /// Length in metres; zero when unknown.
    pub length: f64,
    pub shape_id: i64,
    pub speed: f64,
    pub width: f64,
    pub traffic_type: i64,
    pub time: f64,
    pub default_speed: f64,
    pub street_id: i64,
    pub segment: SegmentWindow,
    pub z_level_begin: i64,
    pub z_level_end: i64,
    /// Shape as `"lon lat"` tokens, in travel order.
    pub geometry: Vec<String>,
}

/// The fields a maneuver may override on a physical edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeOverlay {
    pub segment: Option<SegmentWindow>,
    pub geometry: Option<Vec<String>>,
}

impl Edge {
    /// Derive the maneuver-specific edge from this physical edge.
    ///
    /// Only `segment` and `geometry` can differ from `self`; every other
    /// field is inherited as-is. `self` is left untouched.
    pub fn overlay(&self, overlay: EdgeOverlay) -> Edge {
        Edge {
            id: self.id,
            class_id: self.class_id,
            begin_part: self.begin_part,
            end_part: self.end_part,
            length: self.length,
            shape_id: self.shape_id,
            speed: self.speed,
            width: self.width,
            traffic_type: self.traffic_type,
            time: self.time,
            default_speed: self.default_speed,
            street_id: self.street_id,
            segment: overlay.segment.unwrap_or(self.segment),
            z_level_begin: self.z_level_begin,
            z_level_end: self.z_level_end,
            geometry: overlay.geometry.unwrap_or_else(|| self.geometry.clone()),
        }
    }
}

/// A point of the original request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPoint {
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub zlevel: i64,
}

/// The request as echoed back by the routing service.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub locale: String,
    pub kind: String,
    pub point_a_name: String,
    pub point_b_name: String,
    pub points: Vec<QueryPoint>,
}

/// Start or finish of a subroute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WayPoint {
    pub id: i64,
    /// Fractional position along the subroute.
    pub part: f64,
    pub seconds: f64,
    pub meters: f64,
}

/// A leg of the route and the physical edges it may traverse.
#[derive(Debug, Clone, PartialEq)]
pub struct Subroute {
    pub distance: i64,
    pub duration: i64,
    pub id: i64,
    pub start_point: WayPoint,
    pub finish_point: WayPoint,
    /// Physical edges by id.
    pub edges: HashMap<i64, Edge>,
}

/// Instruction shown to the driver for a maneuver.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub id: i64,
    pub kind: String,
    pub names: Value,
}

/// One maneuver with its resolved edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: i64,
    pub distance: i64,
    pub duration: i64,
    pub subroute: Arc<Subroute>,
    /// Edges in travel order, each an overlay of a physical edge or a
    /// standalone edge when the subroute has no edge with that id.
    pub edges: Vec<Edge>,
    pub instruction: Instruction,
}

/// Turn-by-turn description of one route.
#[derive(Debug, Clone, PartialEq)]
pub struct DrivingDirection {
    pub kind: String,
    pub id: String,
    pub rule: String,
    pub subroutes: HashMap<i64, Arc<Subroute>>,
    /// Maneuvers in travel order.
    pub items: Vec<Item>,
}

/// A route alternative.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub direction: DrivingDirection,
    pub route_id: String,
}

/// A parsed routing response.
///
/// Only the first (best) route of the response is modeled.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSet {
    pub query: Option<Query>,
    pub user_id: String,
    pub route: Option<Route>,
}

impl RouteSet {
    /// Iterate over the modeled routes (zero or one).
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.route.iter()
    }
}
