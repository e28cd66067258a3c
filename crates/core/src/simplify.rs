//! Zoom-relative Douglas-Peucker simplification.
//!
//! Simplification is split in two passes so the expensive part runs once per feature:
//!
//! 1. [`build_sq_dists`] walks every line and ring once (at conversion time) and tags each
//!    vertex with `t`, its squared distance from the simplified line at the moment it was
//!    selected. Endpoints get `t = 1` so they always survive.
//! 2. [`simplify`] runs per tile and keeps the vertices whose `t` clears the tile's
//!    tolerance, then re-winds polygon rings.
//!
//! # Coordinate Spaces
//!
//! Both passes work in the unit square (or S2 face `(s, t)`), so tolerances are expressed in
//! tile pixels and scaled by `2^zoom * 4096`:
//!
//! ```text
//! tol(zoom) = tolerance / (2^zoom * TILE_EXTENT)
//! ```

use crate::geometry::{VectorGeometry, VectorLineString, VectorPoint};

/// Pixels per tile edge used to scale tolerances
pub const TILE_EXTENT: f64 = 4096.0;

/// Zoom at which tagging resolution bottoms out when none is given
pub const DEFAULT_SIMPLIFY_MAXZOOM: u8 = 16;

/// Tolerance in unit-square distance for `zoom`
fn zoom_tolerance(tolerance: f64, zoom: u8) -> f64 {
    tolerance / (2_f64.powi(zoom as i32) * TILE_EXTENT)
}

/// Tag every line and ring vertex with its Douglas-Peucker retain weight.
///
/// Points and multipoints are left untouched.
///
/// # Arguments
///
/// * `geometry` - Geometry in unit-square coordinates, mutated in place
/// * `tolerance` - Tolerance in tile pixels
/// * `maxzoom` - Deepest zoom the geometry will be simplified for (default 16)
pub fn build_sq_dists(geometry: &mut VectorGeometry, tolerance: f64, maxzoom: Option<u8>) {
    let tol = zoom_tolerance(tolerance, maxzoom.unwrap_or(DEFAULT_SIMPLIFY_MAXZOOM)).powi(2);
    match geometry {
        VectorGeometry::Point(_) | VectorGeometry::MultiPoint(_) => {}
        VectorGeometry::LineString(g) => build_sq_dist(&mut g.coordinates, tol),
        VectorGeometry::MultiLineString(g) => {
            g.coordinates.iter_mut().for_each(|line| build_sq_dist(line, tol))
        }
        VectorGeometry::Polygon(g) => g.coordinates.iter_mut().for_each(|ring| build_sq_dist(ring, tol)),
        VectorGeometry::MultiPolygon(g) => g
            .coordinates
            .iter_mut()
            .flatten()
            .for_each(|ring| build_sq_dist(ring, tol)),
    }
}

fn build_sq_dist(line: &mut [VectorPoint], sq_tolerance: f64) {
    let Some(last) = line.len().checked_sub(1) else {
        return;
    };
    line[0].t = Some(1.0);

    // explicit stack, depth can reach the vertex count on degenerate runs
    let mut ranges = vec![(0, last)];
    while let Some((first, last)) = ranges.pop() {
        let Some((index, sq_dist)) = find_pivot(line, first, last, sq_tolerance) else {
            continue;
        };
        line[index].t = Some(sq_dist);
        if index - first > 1 {
            ranges.push((first, index));
        }
        if last - index > 1 {
            ranges.push((index, last));
        }
    }

    line[last].t = Some(1.0);
}

/// Farthest vertex of `first..last` from the segment `first`-`last`, with its squared
/// distance, when that distance beats `sq_tolerance`.
///
/// Equal distances go to the vertex closest to `(last - first) / 2`, compared against the
/// absolute index.
fn find_pivot(
    line: &[VectorPoint],
    first: usize,
    last: usize,
    sq_tolerance: f64,
) -> Option<(usize, f64)> {
    let mut max_sq_dist = sq_tolerance;
    let mid = (last - first) >> 1;
    let mut min_pos_to_mid = last - first;
    let mut index = None;

    let (a, b) = (&line[first], &line[last]);
    let (ax, ay, bx, by) = (a.x, a.y, b.x, b.y);

    for (i, point) in line.iter().enumerate().take(last).skip(first) {
        let d = sq_seg_dist(point.x, point.y, ax, ay, bx, by);
        if d > max_sq_dist {
            index = Some(i);
            max_sq_dist = d;
        } else if d == max_sq_dist {
            let pos_to_mid = i.abs_diff(mid);
            if pos_to_mid < min_pos_to_mid {
                index = Some(i);
                min_pos_to_mid = pos_to_mid;
            }
        }
    }

    index
        .filter(|_| max_sq_dist > sq_tolerance)
        .map(|index| (index, max_sq_dist))
}

/// Squared distance from `(px, py)` to the segment `a`-`b`
fn sq_seg_dist(px: f64, py: f64, ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let (mut x, mut y) = (ax, ay);
    let (dx, dy) = (bx - ax, by - ay);

    if dx != 0.0 || dy != 0.0 {
        let m = ((px - ax) * dx + (py - ay) * dy) / (dx * dx + dy * dy);
        if m > 1.0 {
            x = bx;
            y = by;
        } else if m > 0.0 {
            x += dx * m;
            y += dy * m;
        }
    }

    let (dx, dy) = (px - x, py - y);
    dx * dx + dy * dy
}

/// Drop vertices too close to matter at `zoom`, then re-wind polygon rings.
///
/// A vertex is kept when the tolerance is 0, when it was never tagged (clipping
/// intersections), or when its weight reaches the squared zoom tolerance. At or beyond
/// `maxzoom` only the tolerance-0 rule applies, so everything is kept.
pub fn simplify(geometry: &mut VectorGeometry, tolerance: f64, zoom: u8, maxzoom: Option<u8>) {
    let maxzoom = maxzoom.unwrap_or(DEFAULT_SIMPLIFY_MAXZOOM);
    let zoom_tol = if zoom >= maxzoom {
        0.0
    } else {
        zoom_tolerance(tolerance, zoom)
    };

    match geometry {
        VectorGeometry::Point(_) | VectorGeometry::MultiPoint(_) => {}
        VectorGeometry::LineString(g) => simplify_line(&mut g.coordinates, zoom_tol),
        VectorGeometry::MultiLineString(g) => g
            .coordinates
            .iter_mut()
            .for_each(|line| simplify_line(line, zoom_tol)),
        VectorGeometry::Polygon(g) => simplify_polygon(&mut g.coordinates, zoom_tol),
        VectorGeometry::MultiPolygon(g) => g
            .coordinates
            .iter_mut()
            .for_each(|polygon| simplify_polygon(polygon, zoom_tol)),
    }
}

fn simplify_line(line: &mut VectorLineString, tolerance: f64) {
    if tolerance == 0.0 {
        return;
    }
    let sq_tolerance = tolerance * tolerance;
    line.retain(|p| p.t.map_or(true, |t| t >= sq_tolerance));
}

fn simplify_polygon(polygon: &mut [VectorLineString], tolerance: f64) {
    for (i, ring) in polygon.iter_mut().enumerate() {
        simplify_line(ring, tolerance);
        rewind(ring, i == 0);
    }
}

/// Twice the signed area of a ring, positive when counter-clockwise with y up
pub fn signed_area(ring: &[VectorPoint]) -> f64 {
    let Some(last) = ring.last() else {
        return 0.0;
    };
    let mut prev = last;
    let mut area = 0.0;
    for p in ring {
        area += prev.x * p.y - p.x * prev.y;
        prev = p;
    }
    area
}

/// Reverse a ring in place so outer rings are counter-clockwise and holes clockwise
///
/// Works on `VectorPoint` rings directly since their `t` and m-values must move with the
/// vertices, which `geo::orient::Orient` would not carry.
pub fn rewind(ring: &mut VectorLineString, is_outer: bool) {
    let area = signed_area(ring);
    if (is_outer && area < 0.0) || (!is_outer && area > 0.0) {
        ring.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::VectorShape;

    fn square() -> VectorLineString {
        vec![
            VectorPoint::new(0.25, 0.25),
            VectorPoint::new(0.75, 0.25),
            VectorPoint::new(0.75, 0.75),
            VectorPoint::new(0.25, 0.75),
        ]
    }

    fn hole() -> VectorLineString {
        vec![
            VectorPoint::new(0.5, 0.5),
            VectorPoint::new(0.5, 0.25),
            VectorPoint::new(0.75, 0.25),
            VectorPoint::new(0.75, 0.5),
            VectorPoint::new(0.5, 0.5),
        ]
    }

    fn weights(line: &[VectorPoint]) -> Vec<Option<f64>> {
        line.iter().map(|p| p.t).collect()
    }

    #[test]
    fn test_build_sq_dists_line() {
        let mut geometry = VectorGeometry::LineString(VectorShape::new(square()));
        build_sq_dists(&mut geometry, 3.0, Some(16));

        let VectorGeometry::LineString(g) = &geometry else {
            unreachable!()
        };
        assert_eq!(
            weights(&g.coordinates),
            vec![Some(1.0), Some(0.125), Some(0.25), Some(1.0)]
        );

        // zoom 0 keeps everything tagged above ~5e-7
        simplify(&mut geometry, 3.0, 0, Some(16));
        let VectorGeometry::LineString(g) = &geometry else {
            unreachable!()
        };
        assert_eq!(g.coordinates.len(), 4);
    }

    #[test]
    fn test_build_sq_dists_ring() {
        let mut geometry = VectorGeometry::MultiLineString(VectorShape::new(vec![square(), hole()]));
        build_sq_dists(&mut geometry, 3.0, None);

        let VectorGeometry::MultiLineString(g) = &geometry else {
            unreachable!()
        };
        assert_eq!(
            weights(&g.coordinates[1]),
            vec![Some(1.0), Some(0.03125), Some(0.125), Some(0.03125), Some(1.0)]
        );
    }

    #[test]
    fn test_points_untouched() {
        let mut geometry = VectorGeometry::MultiPoint(VectorShape::new(square()));
        build_sq_dists(&mut geometry, 3.0, None);
        assert!(geometry.points().all(|p| p.t.is_none()));
    }

    #[test]
    fn test_simplify_drops_low_weights() {
        let mut line = vec![
            VectorPoint::new(0.0, 0.0),
            VectorPoint::new(0.5, 0.000001),
            VectorPoint::new(1.0, 0.0),
        ];
        build_sq_dists_line(&mut line);
        assert_eq!(line[0].t, Some(1.0));
        assert_eq!(line[2].t, Some(1.0));

        let mut geometry = VectorGeometry::LineString(VectorShape::new(line));
        let mut deep = geometry.clone();

        simplify(&mut geometry, 3.0, 0, Some(16));
        assert_eq!(geometry.num_points(), 2);

        // at maxzoom nothing is dropped
        simplify(&mut deep, 3.0, 16, Some(16));
        assert_eq!(deep.num_points(), 3);
    }

    fn build_sq_dists_line(line: &mut VectorLineString) {
        // zero tolerance so the middle vertex gets a weight
        build_sq_dist(line, 0.0);
    }

    #[test]
    fn test_untagged_points_survive() {
        let mut line = square();
        line[0].t = Some(1.0);
        line[3].t = Some(1.0);
        line[1].t = Some(1e-12);
        let mut geometry = VectorGeometry::LineString(VectorShape::new(line));
        simplify(&mut geometry, 3.0, 0, Some(16));
        // index 1 is dropped, index 2 was never tagged
        assert_eq!(geometry.num_points(), 3);
    }

    #[test]
    fn test_polygon_rewind() {
        let mut geometry = VectorGeometry::Polygon(VectorShape::new(vec![square(), hole()]));
        build_sq_dists(&mut geometry, 3.0, Some(16));
        simplify(&mut geometry, 3.0, 0, Some(16));

        let VectorGeometry::Polygon(g) = &geometry else {
            unreachable!()
        };
        assert!(signed_area(&g.coordinates[0]) > 0.0);
        assert!(signed_area(&g.coordinates[1]) < 0.0);
        assert_eq!(g.coordinates[0][1], {
            let mut p = VectorPoint::new(0.75, 0.25);
            p.t = Some(0.125);
            p
        });
        // the hole was reversed
        assert_eq!((g.coordinates[1][1].x, g.coordinates[1][1].y), (0.75, 0.5));
    }

    #[test]
    fn test_signed_area() {
        assert_eq!(signed_area(&square()), 0.5);
        assert_eq!(signed_area(&hole()), 0.125);
        assert_eq!(signed_area(&[]), 0.0);
    }

    fn zig_zag(len: usize) -> VectorLineString {
        (0..len)
            .map(|i| VectorPoint::new(i as f64, (i % 2) as f64))
            .collect()
    }

    #[test]
    fn test_pivot_ties_prefer_the_middle() {
        // every odd vertex sits exactly 1 off the chord
        let line = zig_zag(2001);
        assert_eq!(find_pivot(&line, 0, 2000, 0.0), Some((999, 1.0)));

        // the midpoint is measured from the start of the line, not of the range
        assert_eq!(find_pivot(&line, 1000, 2000, 0.0), Some((1001, 1.0)));

        // nothing clears the tolerance
        assert_eq!(find_pivot(&line, 0, 2000, 1.0), None);
    }

    #[test]
    fn test_duplicated_vertices() {
        let mut line = vec![VectorPoint::new(0.0, 0.0)];
        line.extend((0..5).map(|_| VectorPoint::new(0.5, 0.5)));
        line.push(VectorPoint::new(1.0, 0.0));

        build_sq_dist(&mut line, 0.0);
        // only the middle copy is tagged, the rest sit on their sub-chords
        assert_eq!(
            weights(&line),
            vec![Some(1.0), None, None, Some(0.25), None, None, Some(1.0)]
        );
    }

    #[test]
    fn test_long_degenerate_run() {
        let mut line = zig_zag(100_001);
        build_sq_dist(&mut line, 0.0);

        assert_eq!(line[0].t, Some(1.0));
        assert_eq!(line[100_000].t, Some(1.0));
        assert_eq!(line[49_999].t, Some(1.0));
        assert!(line.iter().filter(|p| p.t.is_some()).count() > 3);
    }
}
