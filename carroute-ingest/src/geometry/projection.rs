//! WGS84 <-> spherical Web Mercator conversions.
//!
//! Coordinates are carried as `Coord { x, y }` where `x` is longitude
//! (or easting) and `y` is latitude (or northing).
//!
//! The range guards intentionally match the routing service's own
//! converter rather than a strict domain check: the forward projection only
//! rejects a point that is outside *both* the longitude and the latitude
//! range, and the inverse rejects a point that looks geographic
//! (`|x| < 180`) with an impossible latitude (`|y| > 90`).

use std::f64::consts::{FRAC_PI_2, PI};

use geo_types::Coord;

/// WGS84 spheroid semimajor axis, in metres.
pub const SEMIMAJOR_AXIS: f64 = 6378137.0;

/// Full extent of the Web Mercator plane, in metres.
pub const MERCATOR_EXTENT: f64 = 20037508.3427892;

const DEG_TO_RAD: f64 = 0.017453292519943295;
const RAD_TO_DEG: f64 = 57.295779513082323;

/// Half the semimajor axis; the northing is `a/2 * ln((1 + sin φ) / (1 - sin φ))`.
const HALF_AXIS: f64 = 3189068.5;

/// Project a longitude/latitude pair to Web Mercator metres.
///
/// Returns `None` when the input is outside the longitude range and the
/// latitude range at the same time.
pub fn to_web_mercator(lon: f64, lat: f64) -> Option<Coord<f64>> {
    if lon.abs() > 180.0 && lat.abs() > 90.0 {
        return None;
    }

    let east = lon * DEG_TO_RAD;
    let north = lat * DEG_TO_RAD;

    let northing = HALF_AXIS * ((1.0 + north.sin()) / (1.0 - north.sin())).ln();
    let easting = SEMIMAJOR_AXIS * east;

    Some(Coord {
        x: easting,
        y: northing,
    })
}

/// Inverse of [`to_web_mercator`], using the Gudermannian function.
///
/// The resulting longitude is wrapped into `[-180, 180)`.
pub fn to_wgs84(x: f64, y: f64) -> Option<Coord<f64>> {
    if x.abs() < 180.0 && y.abs() > 90.0 {
        return None;
    }

    if x.abs() > MERCATOR_EXTENT || y.abs() > MERCATOR_EXTENT {
        return None;
    }

    let latitude = (FRAC_PI_2 - 2.0 * (-y / SEMIMAJOR_AXIS).exp().atan()) * (180.0 / PI);
    let raw_longitude = (x / SEMIMAJOR_AXIS) * RAD_TO_DEG;
    let longitude = raw_longitude - ((raw_longitude + 180.0) / 360.0).floor() * 360.0;

    Some(Coord {
        x: longitude,
        y: latitude,
    })
}

/// Project every point of a WGS84 sequence, keeping order and length.
///
/// Fails as a whole if any single point is rejected by the range guard.
pub fn to_mercator(points: &[Coord<f64>]) -> Option<Vec<Coord<f64>>> {
    points
        .iter()
        .map(|p| to_web_mercator(p.x, p.y))
        .collect()
}

/// Unproject every point of a Web Mercator sequence, keeping order and length.
pub fn to_wgs(points: &[Coord<f64>]) -> Option<Vec<Coord<f64>>> {
    points.iter().map(|p| to_wgs84(p.x, p.y)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn origin_maps_to_origin() {
        let p = to_web_mercator(0.0, 0.0).unwrap();
        assert_abs_diff_eq!(p.x, 0.0);
        assert_abs_diff_eq!(p.y, 0.0);
    }

    #[test]
    fn antimeridian_maps_to_full_extent() {
        let p = to_web_mercator(180.0, 0.0).unwrap();
        assert_abs_diff_eq!(p.x, MERCATOR_EXTENT, epsilon = 1e-6);
    }

    #[test]
    fn known_city_roundtrip() {
        let p = to_web_mercator(37.617635, 55.755814).unwrap();
        // Moscow, EPSG:3857
        assert_abs_diff_eq!(p.x, 4187575.973, epsilon = 1e-3);
        assert_abs_diff_eq!(p.y, 7509957.912, epsilon = 1e-3);

        let back = to_wgs84(p.x, p.y).unwrap();
        assert_abs_diff_eq!(back.x, 37.617635, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, 55.755814, epsilon = 1e-9);
    }

    #[test]
    fn forward_guard_is_conjunctive() {
        assert!(to_web_mercator(200.0, 100.0).is_none());
        // Only one coordinate out of range: still projected.
        assert!(to_web_mercator(200.0, 10.0).is_some());
        assert!(to_web_mercator(10.0, 95.0).is_some());
    }

    #[test]
    fn inverse_rejects_geographic_looking_input() {
        assert!(to_wgs84(100.0, 1000.0).is_none());
        assert!(to_wgs84(1000.0, 1000.0).is_some());
    }

    #[test]
    fn inverse_rejects_beyond_extent() {
        assert!(to_wgs84(MERCATOR_EXTENT + 1.0, 0.0).is_none());
        assert!(to_wgs84(1000.0, -(MERCATOR_EXTENT + 1.0)).is_none());
    }

    #[test]
    fn inverse_at_full_extent_stays_on_antimeridian() {
        let p = to_wgs84(MERCATOR_EXTENT, 1000.0).unwrap();
        assert_abs_diff_eq!(p.x, 180.0, epsilon = 1e-9);
    }

    #[test]
    fn sequence_maps_preserve_order() {
        let wgs = vec![
            Coord { x: 37.6, y: 55.7 },
            Coord { x: 37.7, y: 55.8 },
            Coord { x: 37.8, y: 55.9 },
        ];
        let merc = to_mercator(&wgs).unwrap();
        assert_eq!(merc.len(), 3);
        assert!(merc[0].x < merc[1].x && merc[1].x < merc[2].x);

        let back = to_wgs(&merc).unwrap();
        for (a, b) in wgs.iter().zip(&back) {
            assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-9);
            assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn sequence_map_fails_on_any_rejected_point() {
        let merc = vec![Coord { x: 4.0e6, y: 7.0e6 }, Coord { x: 10.0, y: 500.0 }];
        assert!(to_wgs(&merc).is_none());
    }
}
