//! Line and polygon clipping to a unit-square window, and quadtree tile splitting.
//!
//! All clipping here is a single-axis sweep: a line is cut against `[k1, k2]` on x, then
//! every surviving piece is cut on y. Crossing points are interpolated linearly and carry
//! along elevation and M-values from the segment they were cut from.
//!
//! # Offsets
//!
//! Each clipped piece records `offset`, the planar length of the source line before the
//! point where the piece starts. Renderers use it to keep dash patterns and line labels
//! continuous across tile boundaries.
//!
//! # Buffer
//!
//! Lines and polygons are clipped against a window grown by a buffer on every side, so that
//! strokes and fills do not show seams between neighbouring tiles. The buffer is a fraction
//! of the tile width ([`DEFAULT_BUFFER`] = 64px of a 1024px tile) and shrinks with the tile
//! as zoom increases. Points are never buffered.

use crate::bbox::{clip_bbox, Axis, BBox};
use crate::feature::TileFeature;
use crate::geometry::{
    MValue, VectorGeometry, VectorLineString, VectorPoint, VectorPolygon, VectorShape,
};
use crate::id;
use crate::tile::Tile;

/// Default buffer as a fraction of a tile's width
pub const DEFAULT_BUFFER: f64 = 0.0625;

/// One piece of a clipped line
#[derive(Debug, Clone, PartialEq)]
pub struct ClipLineResult {
    pub line: VectorLineString,
    /// Distance along the source line where this piece starts
    pub offset: f64,
    pub vec_bbox: Option<BBox>,
}

/// Clip a line (or ring) to a window.
///
/// # Arguments
///
/// * `line` - Vertices in the same space as `bbox`
/// * `bbox` - Clip window
/// * `is_polygon` - Treat the line as a ring: keep one piece per axis pass and close it
/// * `offset` - Distance already travelled before the first vertex
/// * `buffer` - Grow the window by this much on every side
///
/// # Returns
///
/// Every piece of the line inside the window, each with its own offset and `vec_bbox`.
pub fn clip_line(
    line: &[VectorPoint],
    bbox: &BBox,
    is_polygon: bool,
    offset: f64,
    buffer: f64,
) -> Vec<ClipLineResult> {
    let horizontal = clip_line_axis(
        line,
        offset,
        bbox.left - buffer,
        bbox.right + buffer,
        Axis::X,
        is_polygon,
    );

    horizontal
        .into_iter()
        .flat_map(|(piece, offset)| {
            clip_line_axis(
                &piece,
                offset,
                bbox.bottom - buffer,
                bbox.top + buffer,
                Axis::Y,
                is_polygon,
            )
        })
        .map(|(line, offset)| {
            let vec_bbox = BBox::from_points(&line);
            ClipLineResult {
                line,
                offset,
                vec_bbox,
            }
        })
        .collect()
}

/// Elevation at a crossing: the mean when both ends have one, else whichever exists
fn crossing_z(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some((a + b) / 2.0),
        (a, b) => a.or(b),
    }
}

fn intersect(
    a: &VectorPoint,
    b: &VectorPoint,
    k: f64,
    axis: Axis,
    z: Option<f64>,
    m: Option<&MValue>,
) -> VectorPoint {
    let (x, y) = match axis {
        Axis::X => {
            let t = (k - a.x) / (b.x - a.x);
            (k, a.y + (b.y - a.y) * t)
        }
        Axis::Y => {
            let t = (k - a.y) / (b.y - a.y);
            (a.x + (b.x - a.x) * t, k)
        }
    };
    VectorPoint {
        x,
        y,
        z,
        m: m.cloned(),
        t: None,
    }
}

/// One sweep of a line against `[k1, k2]` on `axis`
fn clip_line_axis(
    line: &[VectorPoint],
    start_offset: f64,
    k1: f64,
    k2: f64,
    axis: Axis,
    is_polygon: bool,
) -> Vec<(VectorLineString, f64)> {
    let Some(last_point) = line.last() else {
        return Vec::new();
    };

    let mut pieces = Vec::new();
    let mut slice: VectorLineString = Vec::new();
    let mut cur_offset = start_offset;
    let mut acc_offset = start_offset;
    let mut prev = &line[0];
    let mut first_enter = false;

    for segment in line.windows(2) {
        let (pa, pb) = (&segment[0], &segment[1]);
        let (a, b) = (pa.axis(axis), pb.axis(axis));
        let z = crossing_z(pa.z, pb.z);
        let mut exited = false;

        // enter or continue
        if a < k1 {
            if b > k1 {
                let entry = intersect(pa, pb, k1, axis, z, pb.m.as_ref());
                if !first_enter {
                    cur_offset = acc_offset + prev.distance(&entry);
                    first_enter = true;
                }
                slice.push(entry);
            }
        } else if a > k2 {
            if b < k2 {
                let entry = intersect(pa, pb, k2, axis, z, pb.m.as_ref());
                if !first_enter {
                    cur_offset = acc_offset + prev.distance(&entry);
                    first_enter = true;
                }
                slice.push(entry);
            }
        } else {
            slice.push(pa.clone());
        }

        // exit
        let exit_m = pb.m.as_ref().or(pa.m.as_ref());
        if b < k1 && a >= k1 {
            slice.push(intersect(pa, pb, k1, axis, z, exit_m));
            exited = true;
        }
        if b > k2 && a <= k2 {
            slice.push(intersect(pa, pb, k2, axis, z, exit_m));
            exited = true;
        }

        acc_offset += prev.distance(pb);
        prev = pb;

        // lines are cut into parts, rings keep tracing the window edge
        if !is_polygon && exited {
            pieces.push((std::mem::take(&mut slice), cur_offset));
            first_enter = false;
        }
    }

    let a = last_point.axis(axis);
    if a >= k1 && a <= k2 {
        slice.push(last_point.clone());
    }

    if is_polygon && slice.len() >= 2 {
        let first = &slice[0];
        let last = &slice[slice.len() - 1];
        if last.x != first.x || last.y != first.y {
            let first = first.clone();
            slice.push(first);
        }
    }

    if !slice.is_empty() {
        pieces.push((slice, cur_offset));
    }

    pieces
}

/// Split a tile's features into its four children.
///
/// # Arguments
///
/// * `tile` - Tile whose features are still in projection space (not yet transformed)
/// * `buffer` - Buffer as a fraction of the tile width, see [`DEFAULT_BUFFER`]
///
/// # Returns
///
/// `[bottom-left, bottom-right, top-left, top-right]`. Children that receive no features
/// have no layers.
pub fn split_tile(tile: &Tile, buffer: f64) -> [Tile; 4] {
    let projection = tile.projection;
    let (face, zoom, i, j) = id::from_id(projection, tile.id);
    let [bl_id, br_id, tl_id, tr_id] = id::children_ij(projection, face, zoom, i, j);
    let mut children = [
        Tile::new(bl_id, projection),
        Tile::new(br_id, projection),
        Tile::new(tl_id, projection),
        Tile::new(tr_id, projection),
    ];

    let scale = 2_f64.powi(zoom as i32);
    let (i, j) = (i as f64, j as f64);

    for (name, layer) in &tile.layers {
        let left = clip_features(&layer.features, scale, i, i + 0.5, Axis::X, buffer);
        let right = clip_features(&layer.features, scale, i + 0.5, i + 1.0, Axis::X, buffer);

        let quadrants = [
            (0, &left, j, j + 0.5),
            (1, &right, j, j + 0.5),
            (2, &left, j + 0.5, j + 1.0),
            (3, &right, j + 0.5, j + 1.0),
        ];
        for (child, half, k1, k2) in quadrants {
            if half.is_empty() {
                continue;
            }
            let features = clip_features(half, scale, k1, k2, Axis::Y, buffer);
            if !features.is_empty() {
                children[child].layer_mut(name).features.extend(features);
            }
        }
    }

    log::trace!(
        "split tile {} (zoom {}) into {:?}",
        tile.id,
        zoom,
        children.iter().map(|c| c.len()).collect::<Vec<_>>()
    );

    children
}

/// Clip every feature against `[k1, k2] / scale` on one axis
fn clip_features(
    features: &[TileFeature],
    scale: f64,
    k1: f64,
    k2: f64,
    axis: Axis,
    base_buffer: f64,
) -> Vec<TileFeature> {
    let (k1, k2) = (k1 / scale, k2 / scale);
    let buffer = base_buffer / scale;
    let (k1b, k2b) = (k1 - buffer, k2 + buffer);

    let mut clipped = Vec::new();
    for feature in features {
        let geometry = feature.geometry();

        if let Some(vec_bbox) = geometry.vec_bbox() {
            let (min, max) = (vec_bbox.min(axis), vec_bbox.max(axis));
            if min >= k1 && max < k2 {
                clipped.push(feature.clone());
                continue;
            } else if max < k1 || min >= k2 {
                continue;
            }
        }

        if let Some(mut new_geometry) = clip_geometry(geometry, axis, k1, k2, k1b, k2b) {
            let vec_bbox = clip_bbox(new_geometry.vec_bbox(), axis, k1b, k2b);
            new_geometry.set_vec_bbox(Some(vec_bbox));
            clipped.push(feature.with_geometry(new_geometry));
        }
    }

    clipped
}

fn clip_geometry(
    geometry: &VectorGeometry,
    axis: Axis,
    k1: f64,
    k2: f64,
    k1b: f64,
    k2b: f64,
) -> Option<VectorGeometry> {
    let in_window = |p: &VectorPoint| {
        let value = p.axis(axis);
        value >= k1 && value < k2
    };

    match geometry {
        VectorGeometry::Point(g) => {
            in_window(&g.coordinates).then(|| VectorGeometry::Point(g.clone()))
        }
        VectorGeometry::MultiPoint(g) => {
            let points: Vec<_> = g.coordinates.iter().filter(|&p| in_window(p)).cloned().collect();
            if points.is_empty() {
                return None;
            }
            let vec_bbox = BBox::from_points(&points);
            Some(VectorGeometry::MultiPoint(VectorShape {
                coordinates: points,
                is_3d: g.is_3d,
                bbox: g.bbox,
                vec_bbox,
                offset: None,
            }))
        }
        VectorGeometry::LineString(g) => {
            let offset = g.offset.unwrap_or(0.0);
            let (lines, offsets): (Vec<_>, Vec<_>) =
                clip_line_axis(&g.coordinates, offset, k1b, k2b, axis, false)
                    .into_iter()
                    .unzip();
            if lines.is_empty() {
                return None;
            }
            Some(VectorGeometry::MultiLineString(VectorShape {
                coordinates: lines,
                is_3d: g.is_3d,
                bbox: g.bbox,
                vec_bbox: g.vec_bbox,
                offset: Some(offsets),
            }))
        }
        VectorGeometry::MultiLineString(g) => {
            let (lines, offsets) =
                clip_lines(&g.coordinates, g.offset.as_deref(), k1b, k2b, axis, false);
            if lines.is_empty() {
                return None;
            }
            Some(VectorGeometry::MultiLineString(VectorShape {
                coordinates: lines,
                is_3d: g.is_3d,
                bbox: g.bbox,
                vec_bbox: g.vec_bbox,
                offset: Some(offsets),
            }))
        }
        VectorGeometry::Polygon(g) => {
            let (rings, offsets) = clip_polygon(&g.coordinates, g.offset.as_deref(), k1b, k2b, axis)?;
            Some(VectorGeometry::Polygon(VectorShape {
                coordinates: rings,
                is_3d: g.is_3d,
                bbox: g.bbox,
                vec_bbox: g.vec_bbox,
                offset: Some(offsets),
            }))
        }
        VectorGeometry::MultiPolygon(g) => {
            let mut polygons = Vec::new();
            let mut offsets = Vec::new();
            for (i, polygon) in g.coordinates.iter().enumerate() {
                let polygon_offsets = g
                    .offset
                    .as_ref()
                    .and_then(|o| o.get(i))
                    .map(|o| o.as_slice());
                if let Some((rings, ring_offsets)) =
                    clip_polygon(polygon, polygon_offsets, k1b, k2b, axis)
                {
                    polygons.push(rings);
                    offsets.push(ring_offsets);
                }
            }
            if polygons.is_empty() {
                return None;
            }
            Some(VectorGeometry::MultiPolygon(VectorShape {
                coordinates: polygons,
                is_3d: g.is_3d,
                bbox: g.bbox,
                vec_bbox: g.vec_bbox,
                offset: Some(offsets),
            }))
        }
    }
}

fn clip_lines(
    lines: &[VectorLineString],
    offsets: Option<&[f64]>,
    k1: f64,
    k2: f64,
    axis: Axis,
    is_polygon: bool,
) -> (Vec<VectorLineString>, Vec<f64>) {
    lines
        .iter()
        .enumerate()
        .flat_map(|(i, line)| {
            let offset = offsets.and_then(|o| o.get(i)).copied().unwrap_or(0.0);
            clip_line_axis(line, offset, k1, k2, axis, is_polygon)
        })
        .unzip()
}

/// Clip every ring; `None` when the first surviving ring is not a closed ring
fn clip_polygon(
    polygon: &[VectorLineString],
    offsets: Option<&[f64]>,
    k1: f64,
    k2: f64,
    axis: Axis,
) -> Option<(VectorPolygon, Vec<f64>)> {
    let (rings, offsets) = clip_lines(polygon, offsets, k1, k2, axis, true);
    match rings.first() {
        Some(outer) if outer.len() >= 4 => Some((rings, offsets)),
        _ => None,
    }
}
