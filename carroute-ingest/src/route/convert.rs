//! Conversion from routing DTOs to the route model.
//!
//! Required fields that are missing are reported with their full path
//! (e.g. `result[0].driving_direction.items[2].instruction`), optional
//! fields fall back to their documented defaults.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::error::ConversionError;
use super::flex::decode_embedded;
use super::model::{
    DrivingDirection, Edge, EdgeOverlay, Instruction, Item, Query, QueryPoint, Route, RouteSet,
    SegmentWindow, Subroute, WayPoint,
};
use super::types::{
    RawDrivingDirection, RawEdge, RawInstruction, RawItem, RawQuery, RawQueryPoint, RawRoute,
    RawRouteSet, RawSegment, RawSubroute, RawWayPoint,
};

/// Key under which some deployments nest the whole response.
const CARROUTING_KEY: &str = "carrouting";

fn require<T>(value: Option<T>, path: &str, field: &str) -> Result<T, ConversionError> {
    value.ok_or_else(|| ConversionError::MissingField(format!("{path}.{field}")))
}

/// Strip the optional one-element list and `carrouting` wrappers.
pub fn unwrap_response(value: &Value) -> Option<&Value> {
    let value = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };
    Some(value.get(CARROUTING_KEY).unwrap_or(value))
}

impl RouteSet {
    /// Build a route set from a raw (possibly wrapped) response.
    pub fn from_value(value: &Value) -> Result<RouteSet, ConversionError> {
        let inner = unwrap_response(value)
            .ok_or_else(|| ConversionError::MissingField("[0]".to_string()))?;
        let raw =
            RawRouteSet::deserialize(inner).map_err(|e| ConversionError::Json(e.to_string()))?;
        convert_route_set(&raw)
    }
}

impl FromStr for RouteSet {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value =
            serde_json::from_str(s).map_err(|e| ConversionError::Json(e.to_string()))?;
        RouteSet::from_value(&value)
    }
}

/// Convert an unwrapped response. Only the first result is modeled.
pub fn convert_route_set(raw: &RawRouteSet) -> Result<RouteSet, ConversionError> {
    let query = raw.query.as_ref().map(convert_query).transpose()?;

    let results = raw
        .result
        .as_ref()
        .ok_or_else(|| ConversionError::MissingField("result".to_string()))?;

    let route = results
        .first()
        .map(|r| convert_route(r, "result[0]"))
        .transpose()?;

    Ok(RouteSet {
        query,
        user_id: raw.user_id.clone().unwrap_or_default(),
        route,
    })
}

fn convert_query(raw: &RawQuery) -> Result<Query, ConversionError> {
    let points = require(raw.points.as_ref(), "query", "points")?
        .iter()
        .enumerate()
        .map(|(i, p)| convert_query_point(p, &format!("query.points[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Query {
        locale: raw.locale.clone().unwrap_or_default(),
        kind: raw.kind.clone().unwrap_or_default(),
        point_a_name: raw.point_a_name.clone().unwrap_or_default(),
        point_b_name: raw.point_b_name.clone().unwrap_or_default(),
        points,
    })
}

fn convert_query_point(raw: &RawQueryPoint, path: &str) -> Result<QueryPoint, ConversionError> {
    Ok(QueryPoint {
        kind: require(raw.kind.clone(), path, "type")?,
        x: require(raw.x, path, "x")?,
        y: require(raw.y, path, "y")?,
        zlevel: raw.zlevel.unwrap_or(0),
    })
}

fn convert_route(raw: &RawRoute, path: &str) -> Result<Route, ConversionError> {
    let direction = require(raw.driving_direction.as_ref(), path, "driving_direction")?;
    let direction = convert_driving_direction(direction, &format!("{path}.driving_direction"))?;

    Ok(Route {
        direction,
        route_id: require(raw.route_id.clone(), path, "route_id")?,
    })
}

fn convert_driving_direction(
    raw: &RawDrivingDirection,
    path: &str,
) -> Result<DrivingDirection, ConversionError> {
    let kind = require(raw.kind.clone(), path, "type")?;
    let id = require(raw.id.clone(), path, "id")?;
    let rule = require(raw.rule.clone(), path, "rule")?;

    let raw_subroutes = require(raw.subroutes.as_ref(), path, "subroutes")?;
    let mut subroutes = HashMap::with_capacity(raw_subroutes.len());
    for (i, raw_subroute) in raw_subroutes.iter().enumerate() {
        let subroute = convert_subroute(raw_subroute, &format!("{path}.subroutes[{i}]"))?;
        subroutes.insert(subroute.id, Arc::new(subroute));
    }

    let items = require(raw.items.as_ref(), path, "items")?
        .iter()
        .enumerate()
        .map(|(i, item)| convert_item(item, &subroutes, &format!("{path}.items[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DrivingDirection {
        kind,
        id,
        rule,
        subroutes,
        items,
    })
}

fn convert_subroute(raw: &RawSubroute, path: &str) -> Result<Subroute, ConversionError> {
    let start_point = require(raw.start_point.as_ref(), path, "start_point")?;
    let finish_point = require(raw.finish_point.as_ref(), path, "finish_point")?;

    let physical = require(raw.edges.as_ref(), path, "edges")?
        .first()
        .ok_or_else(|| ConversionError::MissingField(format!("{path}.edges[0]")))?;

    let mut edges = HashMap::with_capacity(physical.len());
    for (i, raw_edge) in physical.iter().enumerate() {
        let edge = convert_edge(raw_edge, &format!("{path}.edges[0][{i}]"))?;
        edges.insert(edge.id, edge);
    }

    Ok(Subroute {
        distance: require(raw.distance, path, "distance")?,
        duration: require(raw.duration, path, "duration")?,
        id: require(raw.id, path, "id")?,
        start_point: convert_waypoint(start_point, &format!("{path}.start_point"))?,
        finish_point: convert_waypoint(finish_point, &format!("{path}.finish_point"))?,
        edges,
    })
}

fn convert_waypoint(raw: &RawWayPoint, path: &str) -> Result<WayPoint, ConversionError> {
    Ok(WayPoint {
        id: require(raw.id, path, "id")?,
        part: require(raw.part, path, "part")?,
        seconds: require(raw.seconds, path, "seconds")?,
        meters: raw.meters.unwrap_or(0.0),
    })
}

fn convert_segment(
    raw: Option<&RawSegment>,
    path: &str,
) -> Result<Option<SegmentWindow>, ConversionError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let path = format!("{path}.segment");
    let begin = require(raw.begin, &path, "begin")?;
    let end = require(raw.end, &path, "end")?;

    SegmentWindow::new(begin, end)
        .map(Some)
        .ok_or(ConversionError::InvalidSegment { path, begin, end })
}

/// Build an edge from a record that carries all of its own data.
pub fn convert_edge(raw: &RawEdge, path: &str) -> Result<Edge, ConversionError> {
    Ok(Edge {
        id: require(raw.id, path, "id")?,
        class_id: raw.class_id.unwrap_or(0),
        begin_part: require(raw.begin_part, path, "begin_part")?,
        end_part: require(raw.end_part, path, "end_part")?,
        length: raw.length.unwrap_or(0.0),
        shape_id: require(raw.shape_id, path, "shape_id")?,
        speed: raw.speed.unwrap_or(0.0),
        width: raw.width.unwrap_or(0.0),
        traffic_type: raw.traffic_type.unwrap_or(0),
        time: raw.time.unwrap_or(0.0),
        default_speed: raw.default_speed.unwrap_or(0.0),
        street_id: raw.street_id.unwrap_or(0),
        segment: convert_segment(raw.segment.as_ref(), path)?.unwrap_or_default(),
        z_level_begin: raw.z_level_begin.unwrap_or(0),
        z_level_end: raw.z_level_end.unwrap_or(0),
        geometry: raw.geometry.clone().unwrap_or_default(),
    })
}

/// Resolve a maneuver's edge record against its subroute.
///
/// A record whose id names a physical edge becomes an overlay of that
/// edge; any other record must be complete on its own.
fn resolve_item_edge(
    raw: &RawEdge,
    subroute: &Subroute,
    path: &str,
) -> Result<Edge, ConversionError> {
    let id = require(raw.id, path, "id")?;

    match subroute.edges.get(&id) {
        Some(base) => Ok(base.overlay(EdgeOverlay {
            segment: convert_segment(raw.segment.as_ref(), path)?,
            geometry: raw.geometry.clone(),
        })),
        None => convert_edge(raw, path),
    }
}

fn convert_instruction(raw: &Value, path: &str) -> Result<Instruction, ConversionError> {
    let decoded =
        decode_embedded(raw).map_err(|e| ConversionError::Json(format!("{path}: {e}")))?;
    let instruction = RawInstruction::deserialize(&*decoded)
        .map_err(|e| ConversionError::Json(format!("{path}: {e}")))?;

    Ok(Instruction {
        id: require(instruction.id, path, "id")?,
        kind: require(instruction.kind, path, "type")?,
        names: require(instruction.names, path, "names")?,
    })
}

fn convert_item(
    raw: &RawItem,
    subroutes: &HashMap<i64, Arc<Subroute>>,
    path: &str,
) -> Result<Item, ConversionError> {
    let id = require(raw.id, path, "id")?;
    let distance = require(raw.distance, path, "distance")?;
    let duration = require(raw.duration, path, "duration")?;
    let subroute_id = require(raw.subroute, path, "subroute")?;

    let subroute = subroutes.get(&subroute_id).cloned().ok_or_else(|| {
        ConversionError::MissingField(format!("{path}.subroute (no subroute with id {subroute_id})"))
    })?;

    let edges = require(raw.edges.as_ref(), path, "edges")?
        .iter()
        .enumerate()
        .map(|(i, e)| resolve_item_edge(e, &subroute, &format!("{path}.edges[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;

    let instruction = require(raw.instruction.as_ref(), path, "instruction")?;
    let instruction = convert_instruction(instruction, &format!("{path}.instruction"))?;

    Ok(Item {
        id,
        distance,
        duration,
        subroute,
        edges,
        instruction,
    })
}
