//! Flat lon-lat features to Web-Mercator vector features.

use super::coords::{lon_lat_to_unit, unit_to_lon_lat};
use crate::bbox::{extend_bbox, BBox};
use crate::feature::{Feature, VectorFeature};
use crate::geometry::{
    FlatShape, Geometry, MValue, Point, VectorGeometry, VectorPoint, VectorShape,
};
use crate::simplify::build_sq_dists;

fn vector_line(points: &[Point], m_values: Option<&Vec<MValue>>) -> Vec<VectorPoint> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| VectorPoint::from_flat(p, m_values.and_then(|m| m.get(i))))
        .collect()
}

fn vector_lines(lines: &[Vec<Point>], m_values: Option<&Vec<Vec<MValue>>>) -> Vec<Vec<VectorPoint>> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| vector_line(line, m_values.and_then(|m| m.get(i))))
        .collect()
}

fn vector_shape<C, M, V, O>(shape: &FlatShape<C, M>, coordinates: V) -> VectorShape<V, O> {
    VectorShape {
        coordinates,
        is_3d: false,
        bbox: shape.bbox,
        vec_bbox: None,
        offset: None,
    }
}

/// Convert flat coordinate arrays into structured vertices.
///
/// M-values are attached to the vertex at the same position in the coordinate tree, the
/// stable `bbox` is carried over, and `is3D` is set when any vertex has a `z`.
pub fn to_vector_geometry(geometry: &Geometry) -> VectorGeometry {
    let mut vector = match geometry {
        Geometry::Point(g) => VectorGeometry::Point(vector_shape(
            g,
            VectorPoint::from_flat(&g.coordinates, g.m_values.as_ref()),
        )),
        Geometry::MultiPoint(g) => VectorGeometry::MultiPoint(vector_shape(
            g,
            vector_line(&g.coordinates, g.m_values.as_ref()),
        )),
        Geometry::LineString(g) => VectorGeometry::LineString(vector_shape(
            g,
            vector_line(&g.coordinates, g.m_values.as_ref()),
        )),
        Geometry::MultiLineString(g) => VectorGeometry::MultiLineString(vector_shape(
            g,
            vector_lines(&g.coordinates, g.m_values.as_ref()),
        )),
        Geometry::Polygon(g) => VectorGeometry::Polygon(vector_shape(
            g,
            vector_lines(&g.coordinates, g.m_values.as_ref()),
        )),
        Geometry::MultiPolygon(g) => VectorGeometry::MultiPolygon(vector_shape(
            g,
            g.coordinates
                .iter()
                .enumerate()
                .map(|(i, polygon)| {
                    vector_lines(polygon, g.m_values.as_ref().and_then(|m| m.get(i)))
                })
                .collect(),
        )),
    };

    let is_3d = vector.points().any(|p| p.z.is_some());
    set_is_3d(&mut vector, is_3d);
    vector
}

fn set_is_3d(geometry: &mut VectorGeometry, is_3d: bool) {
    match geometry {
        VectorGeometry::Point(g) => g.is_3d = is_3d,
        VectorGeometry::MultiPoint(g) => g.is_3d = is_3d,
        VectorGeometry::LineString(g) => g.is_3d = is_3d,
        VectorGeometry::MultiLineString(g) => g.is_3d = is_3d,
        VectorGeometry::Polygon(g) => g.is_3d = is_3d,
        VectorGeometry::MultiPolygon(g) => g.is_3d = is_3d,
    }
}

fn set_bbox(geometry: &mut VectorGeometry, bbox: Option<BBox>) {
    match geometry {
        VectorGeometry::Point(g) => g.bbox = bbox,
        VectorGeometry::MultiPoint(g) => g.bbox = bbox,
        VectorGeometry::LineString(g) => g.bbox = bbox,
        VectorGeometry::MultiLineString(g) => g.bbox = bbox,
        VectorGeometry::Polygon(g) => g.bbox = bbox,
        VectorGeometry::MultiPolygon(g) => g.bbox = bbox,
    }
}

/// Convert a flat lon-lat feature into a vector feature.
///
/// # Arguments
///
/// * `feature` - Source feature
/// * `build_bbox` - Compute the stable lon-lat `bbox` from the vertices when the input has none
pub fn to_vector(feature: &Feature, build_bbox: bool) -> VectorFeature {
    let mut geometry = to_vector_geometry(&feature.geometry);
    if build_bbox && geometry.bbox().is_none() {
        let bbox = geometry
            .points()
            .fold(None, |bbox, p| Some(extend_bbox(bbox, p)));
        set_bbox(&mut geometry, bbox);
    }

    VectorFeature {
        id: feature.id,
        properties: feature.properties.clone(),
        geometry,
        metadata: feature.metadata.clone(),
    }
}

/// Project a lon-lat vector feature onto the unit square in place.
///
/// `vecBBox` is rebuilt from the projected vertices. With a tolerance, the geometry is also
/// tagged for simplification up to `maxzoom`.
pub fn to_unit_scale(feature: &mut VectorFeature, tolerance: Option<f64>, maxzoom: Option<u8>) {
    let geometry = &mut feature.geometry;
    geometry.for_each_point_mut(|p| {
        let (x, y) = lon_lat_to_unit(p.x, p.y);
        p.x = x;
        p.y = y;
    });
    geometry.rebuild_vec_bbox();

    if let Some(tolerance) = tolerance {
        build_sq_dists(geometry, tolerance, maxzoom);
    }
}

/// Inverse of [`to_unit_scale`]: unit-square vertices back to lon-lat degrees
pub fn to_ll(feature: &mut VectorFeature) {
    let geometry = &mut feature.geometry;
    geometry.for_each_point_mut(|p| {
        let (lon, lat) = unit_to_lon_lat(p.x, p.y);
        p.x = lon;
        p.y = lat;
    });
    geometry.rebuild_vec_bbox();
}
