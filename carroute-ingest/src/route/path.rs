//! Path assembly: turning the route model into one explicit geometry.
//!
//! Each edge contributes the part of its shape that the maneuver actually
//! traverses. Partial windows are cut in Web Mercator and projected back,
//! full windows are passed through untouched.

use geo_types::{Coord, LineString};

use crate::geometry::{line_substring, to_mercator, to_wgs};

use super::error::ConversionError;
use super::model::{DrivingDirection, Edge, Item, Route};

/// Parse a `"lon lat"` token.
fn parse_token(token: &str, edge_id: i64) -> Result<Coord<f64>, ConversionError> {
    let invalid = || ConversionError::InvalidCoordinate {
        edge_id,
        token: token.to_string(),
    };

    let mut parts = token.split(' ');
    let (Some(lon), Some(lat)) = (parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let lon = lon.parse().map_err(|_| invalid())?;
    let lat = lat.parse().map_err(|_| invalid())?;

    Ok(Coord { x: lon, y: lat })
}

fn format_token(coord: Coord<f64>) -> String {
    format!("{} {}", coord.x, coord.y)
}

/// Format coordinate tokens as a WKT line-string literal.
pub fn format_linestring(tokens: &[String]) -> String {
    format!("LINESTRING({})", tokens.join(","))
}

impl Edge {
    /// The traversed part of this edge as `"lon lat"` tokens.
    pub fn path(&self) -> Result<Vec<String>, ConversionError> {
        let mut out = Vec::new();
        self.append_path(&mut out)?;
        Ok(out)
    }

    /// Append the traversed part of this edge to `out`.
    ///
    /// An edge of unknown length, or with an empty window, contributes
    /// nothing.
    pub fn append_path(&self, out: &mut Vec<String>) -> Result<(), ConversionError> {
        if self.length == 0.0 || self.segment.is_degenerate() {
            return Ok(());
        }

        if self.segment.is_full() {
            out.extend(self.geometry.iter().cloned());
            return Ok(());
        }

        let wgs = self
            .geometry
            .iter()
            .map(|token| parse_token(token, self.id))
            .collect::<Result<Vec<_>, _>>()?;

        let out_of_range = || ConversionError::OutOfRange { edge_id: self.id };
        let mercator = to_mercator(&wgs).ok_or_else(out_of_range)?;

        let part = line_substring(
            &LineString::new(mercator),
            self.segment.begin * self.length,
            self.segment.end * self.length,
        );

        let back = to_wgs(&part.0).ok_or_else(out_of_range)?;
        out.extend(back.into_iter().map(format_token));
        Ok(())
    }
}

impl Item {
    /// The traversed geometry of this maneuver, edge by edge.
    pub fn path(&self) -> Result<Vec<String>, ConversionError> {
        let mut out = Vec::new();
        self.append_path(&mut out)?;
        Ok(out)
    }

    pub fn append_path(&self, out: &mut Vec<String>) -> Result<(), ConversionError> {
        for edge in &self.edges {
            edge.append_path(out)?;
        }
        Ok(())
    }
}

impl DrivingDirection {
    /// The geometry of all maneuvers, in maneuver order.
    pub fn path(&self) -> Result<Vec<String>, ConversionError> {
        let mut out = Vec::new();
        for item in &self.items {
            item.append_path(&mut out)?;
        }
        Ok(out)
    }
}

impl Route {
    /// The full route as a `LINESTRING(lon lat,...)` literal.
    pub fn path(&self) -> Result<String, ConversionError> {
        Ok(format_linestring(&self.direction.path()?))
    }
}
