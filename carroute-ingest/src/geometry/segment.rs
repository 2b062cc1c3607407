//! Arclength cutting of planar polylines.
//!
//! Distances are measured along the line from its first vertex. All
//! functions are pure and operate on `geo_types::LineString<f64>`.

use geo::{EuclideanLength, LineInterpolatePoint, LineLocatePoint};
use geo_types::{Coord, LineString, Point};

fn empty() -> LineString<f64> {
    LineString::new(Vec::new())
}

/// Total arclength of the line.
pub fn line_length(line: &LineString<f64>) -> f64 {
    line.euclidean_length()
}

/// Arclength of the point on `line` nearest to `point`.
///
/// When several locations are equally near, the first along the line wins,
/// so a line that revisits a vertex reports the earliest visit.
pub fn project(line: &LineString<f64>, point: Coord<f64>) -> f64 {
    line.line_locate_point(&Point::from(point))
        .map_or(0.0, |fraction| fraction * line.euclidean_length())
}

/// Point at arclength `distance_along` along the line.
///
/// The distance is clamped to `[0, length]`. Returns `None` for a line
/// without vertices.
pub fn interpolate(line: &LineString<f64>, distance_along: f64) -> Option<Coord<f64>> {
    let first = *line.0.first()?;
    let length = line.euclidean_length();
    if distance_along <= 0.0 || length == 0.0 {
        return Some(first);
    }
    if distance_along >= length {
        return line.0.last().copied();
    }

    line.line_interpolate_point(distance_along / length).map(|p| p.0)
}

/// Cut a line in two at `distance` from its start.
///
/// A distance at or before the start, or at or past the end, yields
/// `[empty, whole line]` in both cases. Otherwise the line is split on the
/// first vertex whose arclength equals the distance, or an interpolated
/// vertex is inserted before the first vertex that lies beyond it.
pub fn cut(line: &LineString<f64>, distance_along: f64) -> [LineString<f64>; 2] {
    if distance_along <= 0.0 || distance_along >= line_length(line) {
        return [empty(), line.clone()];
    }

    let coords = &line.0;
    for (i, p) in coords.iter().enumerate() {
        let pd = project(line, *p);
        if pd == distance_along {
            return [
                LineString::new(coords[..=i].to_vec()),
                LineString::new(coords[i..].to_vec()),
            ];
        }
        if pd > distance_along {
            let Some(cp) = interpolate(line, distance_along) else {
                break;
            };
            let mut before = Vec::with_capacity(i + 1);
            before.extend_from_slice(&coords[..i]);
            before.push(cp);

            let mut after = Vec::with_capacity(coords.len() - i + 1);
            after.push(cp);
            after.extend_from_slice(&coords[i..]);

            return [LineString::new(before), LineString::new(after)];
        }
    }

    // Only reachable when the last vertex projects before the cut point,
    // which requires the line to double back onto itself.
    [empty(), line.clone()]
}

/// Split a line at a sequence of points lying on it, in line order.
///
/// Each point is projected onto what remains of the line after the
/// previous cut. Returns `points.len() + 1` segments.
pub fn split_line_with_points(line: &LineString<f64>, points: &[Coord<f64>]) -> Vec<LineString<f64>> {
    let mut segments = Vec::with_capacity(points.len() + 1);
    let mut current = line.clone();

    for p in points {
        let d = project(&current, *p);
        let [segment, rest] = cut(&current, d);
        segments.push(segment);
        current = rest;
    }

    segments.push(current);
    segments
}

/// The part of a line between two arclengths.
pub fn line_substring(line: &LineString<f64>, from: f64, to: f64) -> LineString<f64> {
    let (Some(start), Some(end)) = (interpolate(line, from), interpolate(line, to)) else {
        return empty();
    };

    let mut parts = split_line_with_points(line, &[start, end]);
    parts.swap_remove(1)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Polylines with strictly increasing x, so no vertex is revisited.
    fn monotone_line() -> impl Strategy<Value = Vec<Coord<f64>>> {
        prop::collection::vec((0.5f64..50.0, -50.0f64..50.0), 3..20).prop_map(|steps| {
            let mut x = 0.0;
            steps
                .into_iter()
                .map(|(dx, y)| {
                    x += dx;
                    Coord { x, y }
                })
                .collect()
        })
    }

    /// A line plus an ordered subset of its interior vertex indices.
    fn line_with_cut_indices() -> impl Strategy<Value = (Vec<Coord<f64>>, Vec<usize>)> {
        monotone_line().prop_flat_map(|coords| {
            let interior = coords.len() - 2;
            let indices: Vec<usize> = (1..=interior).collect();
            (Just(coords), prop::sample::subsequence(indices, 0..=interior))
        })
    }

    /// A line plus ordered points strictly between its ends, placed by
    /// arclength and so mostly off the vertices.
    fn line_with_interior_points() -> impl Strategy<Value = (Vec<Coord<f64>>, Vec<Coord<f64>>)> {
        (monotone_line(), prop::collection::vec(0.05f64..1.0, 2..7)).prop_map(|(coords, gaps)| {
            let line = LineString::new(coords.clone());
            let length = line_length(&line);
            let total: f64 = gaps.iter().sum();

            let mut along = 0.0;
            let points = gaps[..gaps.len() - 1]
                .iter()
                .filter_map(|gap| {
                    along += gap / total * length;
                    interpolate(&line, along)
                })
                .collect();
            (coords, points)
        })
    }

    proptest! {
        /// Cutting at either end returns the whole line in second place.
        #[test]
        fn boundary_cuts(coords in monotone_line()) {
            let line = LineString::new(coords);
            let length = line_length(&line);

            for d in [0.0, length] {
                let [before, after] = cut(&line, d);
                prop_assert!(before.0.is_empty());
                prop_assert_eq!(&after, &line);
            }
        }

        /// Splitting at k interior vertices yields k + 1 segments that
        /// chain end to start back into the original line.
        #[test]
        fn split_reconstructs_line((coords, indices) in line_with_cut_indices()) {
            let line = LineString::new(coords.clone());
            let points: Vec<Coord<f64>> = indices.iter().map(|&i| coords[i]).collect();

            let segments = split_line_with_points(&line, &points);
            prop_assert_eq!(segments.len(), points.len() + 1);

            let mut rebuilt: Vec<Coord<f64>> = segments[0].0.clone();
            for pair in segments.windows(2) {
                prop_assert_eq!(pair[0].0.last(), pair[1].0.first());
            }
            for segment in &segments[1..] {
                rebuilt.extend_from_slice(&segment.0[1..]);
            }
            prop_assert_eq!(rebuilt, coords);
        }

        /// Splitting at k interpolated interior points yields k + 1
        /// non-empty segments that chain end to start, end on the split
        /// points, and add up to the original length.
        #[test]
        fn split_at_interior_points((coords, points) in line_with_interior_points()) {
            let line = LineString::new(coords.clone());
            let length = line_length(&line);
            let tolerance = 1e-6 * length.max(1.0);

            let segments = split_line_with_points(&line, &points);
            prop_assert_eq!(segments.len(), points.len() + 1);

            for segment in &segments {
                prop_assert!(segment.0.len() >= 2);
            }
            for pair in segments.windows(2) {
                prop_assert_eq!(pair[0].0.last(), pair[1].0.first());
            }
            for (segment, point) in segments.iter().zip(&points) {
                let end = segment.0[segment.0.len() - 1];
                prop_assert!((end.x - point.x).hypot(end.y - point.y) < tolerance);
            }
            prop_assert_eq!(segments[0].0.first(), coords.first());
            prop_assert_eq!(segments[points.len()].0.last(), coords.last());

            let sum: f64 = segments.iter().map(line_length).sum();
            prop_assert!((sum - length).abs() < tolerance);
        }

        /// A cut anywhere inside the line preserves total length.
        #[test]
        fn cut_preserves_length(coords in monotone_line(), frac in 0.01f64..0.99) {
            let line = LineString::new(coords);
            let length = line_length(&line);
            let [before, after] = cut(&line, length * frac);

            let sum = line_length(&before) + line_length(&after);
            prop_assert!((sum - length).abs() < 1e-6 * length.max(1.0));
            prop_assert!((line_length(&before) - length * frac).abs() < 1e-6 * length.max(1.0));
        }
    }
}
