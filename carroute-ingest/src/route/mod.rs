//! Car routing response model.
//!
//! Turns a raw car routing response into a typed route and reconstructs
//! the explicit geometry the route follows.
//!
//! Key characteristics of the responses:
//! - Physical edges live in subroutes and are shared: several maneuvers
//!   may reference the same edge with different traversed windows
//! - Scalars arrive as numbers or numeric strings depending on the backend
//! - Instruction blocks are sometimes shipped as JSON-encoded strings
//! - The whole response may be wrapped in a one-element list and/or a
//!   `carrouting` object

mod convert;
mod error;
mod flex;
mod model;
mod path;
mod types;

pub use convert::{convert_edge, convert_route_set, unwrap_response};
pub use error::ConversionError;
pub use flex::{as_i64, decode_embedded};
pub use model::{
    DrivingDirection, Edge, EdgeOverlay, Instruction, Item, Query, QueryPoint, Route, RouteSet,
    SegmentWindow, Subroute, WayPoint,
};
pub use path::format_linestring;
pub use types::{
    RawDrivingDirection, RawEdge, RawInstruction, RawItem, RawQuery, RawQueryPoint, RawRoute,
    RawRouteSet, RawSegment, RawSubroute, RawWayPoint,
};
