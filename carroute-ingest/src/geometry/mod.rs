//! Planar geometry used to resolve partial edge geometries.
//!
//! Routing responses carry edge shapes in WGS84. Cutting a shape at an
//! arclength has to happen in a locally planar system, so edges are
//! projected to spherical Web Mercator, cut there, and projected back.

pub mod projection;
pub mod segment;

pub use projection::{to_mercator, to_web_mercator, to_wgs, to_wgs84};
pub use segment::{cut, interpolate, line_length, line_substring, project, split_line_with_points};
