//! Lon-lat vector geometry onto S2 cube faces, and back.
//!
//! A line is projected vertex by vertex to `(face, s, t)`. Because a line may cross cube
//! edges, one copy of the whole line is built for every face it touches: vertices from other
//! faces are rotated and translated into the target face's frame using [`FACE_RULE_SET`],
//! then the copy is clipped to the face (plus a buffer). Each surviving piece becomes its own
//! [`S2Feature`].
//!
//! # Limitations
//!
//! The rule set places neighbouring faces correctly but does not mirror the opposite face,
//! so a line spanning more than one full face width is not projected faithfully.

use super::coords::{face_st_to_xyz, xyz_to_lon_lat};
use super::point::S2Point;
use crate::bbox::{merge_bboxes, BBox};
use crate::clip::{clip_line, ClipLineResult, DEFAULT_BUFFER};
use crate::feature::{S2Feature, VectorFeature};
use crate::geometry::{VectorGeometry, VectorLineString, VectorPoint, VectorShape};
use crate::simplify::build_sq_dists;
use crate::Face;

/// Quarter turn applied when moving between face frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rotation {
    Zero,
    Cw,
    Ccw,
}

use Rotation::{Ccw, Cw, Zero};

/// `FACE_RULE_SET[target][current] = (rotation, dx, dy)` moves a point from the `current`
/// face frame into the `target` face frame.
const FACE_RULE_SET: [[(Rotation, f64, f64); 6]; 6] = [
    [
        (Zero, 0.0, 0.0),
        (Zero, 1.0, 0.0),
        (Cw, 0.0, 1.0),
        (Ccw, 2.0, 0.0),
        (Ccw, -1.0, 0.0),
        (Zero, 0.0, -1.0),
    ],
    [
        (Zero, -1.0, 0.0),
        (Zero, 0.0, 0.0),
        (Zero, 0.0, 1.0),
        (Ccw, 1.0, 0.0),
        (Ccw, 2.0, 0.0),
        (Cw, 0.0, -1.0),
    ],
    [
        (Ccw, -1.0, 0.0),
        (Zero, 0.0, -1.0),
        (Zero, 0.0, 0.0),
        (Zero, 1.0, 0.0),
        (Cw, 0.0, 1.0),
        (Ccw, 2.0, 0.0),
    ],
    [
        (Ccw, 2.0, 0.0),
        (Cw, 0.0, -1.0),
        (Zero, -1.0, 0.0),
        (Zero, 0.0, 0.0),
        (Zero, 0.0, 1.0),
        (Ccw, 1.0, 0.0),
    ],
    [
        (Cw, 0.0, 1.0),
        (Ccw, 2.0, 0.0),
        (Ccw, -1.0, 0.0),
        (Zero, 0.0, -1.0),
        (Zero, 0.0, 0.0),
        (Zero, 1.0, 0.0),
    ],
    [
        (Zero, 0.0, 1.0),
        (Ccw, 1.0, 0.0),
        (Ccw, 2.0, 0.0),
        (Cw, 0.0, -1.0),
        (Zero, -1.0, 0.0),
        (Zero, 0.0, 0.0),
    ],
];

/// `Cw` is a +90 turn `(s, t) -> (t, 1 - s)`, `Ccw` a -90 turn `(s, t) -> (1 - t, s)`
fn rotate(rotation: Rotation, s: f64, t: f64) -> (f64, f64) {
    match rotation {
        Rotation::Cw => (t, 1.0 - s),
        Rotation::Ccw => (1.0 - t, s),
        Rotation::Zero => (s, t),
    }
}

/// A vertex projected onto its own face
struct StPoint<'a> {
    face: Face,
    s: f64,
    t: f64,
    source: &'a VectorPoint,
}

impl StPoint<'_> {
    /// This vertex in `target`'s frame
    fn to_face(&self, target: Face) -> VectorPoint {
        let (x, y) = if target == self.face {
            (self.s, self.t)
        } else {
            let (rotation, dx, dy) = FACE_RULE_SET[target as usize][self.face as usize];
            let (s, t) = rotate(rotation, self.s, self.t);
            (s + dx, t + dy)
        };
        VectorPoint {
            x,
            y,
            ..self.source.clone()
        }
    }
}

fn project(point: &VectorPoint) -> StPoint<'_> {
    let (face, s, t) = S2Point::from_lon_lat(point.x, point.y).to_face_st();
    StPoint {
        face,
        s,
        t,
        source: point,
    }
}

/// Project a lon-lat line onto every face it touches, clipping each copy to its face
fn convert_line(line: &[VectorPoint], is_polygon: bool) -> Vec<(Face, ClipLineResult)> {
    let projected: Vec<StPoint> = line.iter().map(project).collect();

    let mut faces: Vec<Face> = Vec::new();
    for point in &projected {
        if !faces.contains(&point.face) {
            faces.push(point.face);
        }
    }

    let window = BBox::new(0.0, 0.0, 1.0, 1.0);
    faces
        .into_iter()
        .flat_map(|face| {
            let on_face: VectorLineString = projected.iter().map(|p| p.to_face(face)).collect();
            clip_line(&on_face, &window, is_polygon, 0.0, DEFAULT_BUFFER)
                .into_iter()
                .map(move |piece| (face, piece))
        })
        .collect()
}

fn convert_point(point: &VectorPoint, template: &VectorShape<VectorPoint>) -> (Face, VectorGeometry) {
    let st = project(point);
    let coordinates = st.to_face(st.face);
    let vec_bbox = BBox::from_point(&coordinates);
    (
        st.face,
        VectorGeometry::Point(VectorShape {
            coordinates,
            is_3d: template.is_3d,
            bbox: template.bbox,
            vec_bbox: Some(vec_bbox),
            offset: None,
        }),
    )
}

fn line_string(face: Face, piece: ClipLineResult, is_3d: bool, bbox: Option<BBox>) -> (Face, VectorGeometry) {
    (
        face,
        VectorGeometry::LineString(VectorShape {
            coordinates: piece.line,
            is_3d,
            bbox,
            vec_bbox: piece.vec_bbox,
            offset: Some(piece.offset),
        }),
    )
}

fn convert_polygon(
    rings: &[VectorLineString],
    is_3d: bool,
    bbox: Option<BBox>,
) -> Vec<(Face, VectorGeometry)> {
    let Some((outer, holes)) = rings.split_first() else {
        return Vec::new();
    };
    let outer_pieces = convert_line(outer, true);
    let hole_pieces: Vec<_> = holes.iter().flat_map(|ring| convert_line(ring, true)).collect();

    outer_pieces
        .into_iter()
        .map(|(face, piece)| {
            let mut polygon = vec![piece.line];
            let mut offsets = vec![piece.offset];
            let mut vec_bbox = piece.vec_bbox;
            for (hole_face, hole) in &hole_pieces {
                if *hole_face != face {
                    continue;
                }
                polygon.push(hole.line.clone());
                offsets.push(hole.offset);
                vec_bbox = match (vec_bbox, hole.vec_bbox.as_ref()) {
                    (Some(outer), Some(inner)) => Some(merge_bboxes(outer, inner)),
                    (outer, inner) => outer.or(inner.copied()),
                };
            }
            (
                face,
                VectorGeometry::Polygon(VectorShape {
                    coordinates: polygon,
                    is_3d,
                    bbox,
                    vec_bbox,
                    offset: Some(offsets),
                }),
            )
        })
        .collect()
}

/// Project lon-lat vector geometry onto the cube faces.
///
/// Points and multipoints yield one point per vertex, lines one linestring per clipped
/// piece, and polygons one polygon per face the outer ring touches. With a tolerance, every
/// result is tagged for simplification.
pub fn to_s2_geometry(
    geometry: &VectorGeometry,
    tolerance: Option<f64>,
    maxzoom: Option<u8>,
) -> Vec<(Face, VectorGeometry)> {
    let mut converted = match geometry {
        VectorGeometry::Point(g) => vec![convert_point(&g.coordinates, g)],
        VectorGeometry::MultiPoint(g) => {
            let template = VectorShape {
                coordinates: VectorPoint::default(),
                is_3d: g.is_3d,
                bbox: g.bbox,
                vec_bbox: None,
                offset: None,
            };
            g.coordinates
                .iter()
                .map(|p| convert_point(p, &template))
                .collect()
        }
        VectorGeometry::LineString(g) => convert_line(&g.coordinates, false)
            .into_iter()
            .map(|(face, piece)| line_string(face, piece, g.is_3d, g.bbox))
            .collect(),
        VectorGeometry::MultiLineString(g) => g
            .coordinates
            .iter()
            .flat_map(|line| convert_line(line, false))
            .map(|(face, piece)| line_string(face, piece, g.is_3d, g.bbox))
            .collect(),
        VectorGeometry::Polygon(g) => convert_polygon(&g.coordinates, g.is_3d, g.bbox),
        VectorGeometry::MultiPolygon(g) => g
            .coordinates
            .iter()
            .flat_map(|polygon| convert_polygon(polygon, g.is_3d, g.bbox))
            .collect(),
    };

    if let Some(tolerance) = tolerance {
        for (_, geometry) in &mut converted {
            build_sq_dists(geometry, tolerance, maxzoom);
        }
    }

    converted
}

/// Project a lon-lat vector feature onto the cube faces, one [`S2Feature`] per piece
pub fn to_s2(feature: &VectorFeature, tolerance: Option<f64>, maxzoom: Option<u8>) -> Vec<S2Feature> {
    to_s2_geometry(&feature.geometry, tolerance, maxzoom)
        .into_iter()
        .map(|(face, geometry)| {
            S2Feature::derived(
                feature.id,
                face,
                &feature.properties,
                feature.metadata.as_ref(),
                geometry,
            )
        })
        .collect()
}

/// Unproject a face feature back to lon-lat degrees
pub fn to_wm(feature: &S2Feature) -> VectorFeature {
    let face = feature.face;
    let mut geometry = feature.geometry.clone();
    geometry.for_each_point_mut(|p| {
        let (lon, lat) = xyz_to_lon_lat(&face_st_to_xyz(face, p.x, p.y));
        p.x = lon;
        p.y = lat;
    });
    geometry.rebuild_vec_bbox();

    VectorFeature {
        id: feature.id,
        properties: feature.properties.clone(),
        geometry,
        metadata: feature.metadata.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{} != {}", a, b);
    }

    fn feature(geometry: VectorGeometry) -> VectorFeature {
        let mut feature = VectorFeature::new(geometry);
        feature.id = Some(1337);
        feature.properties.insert("a".to_string(), json!(1));
        feature
    }

    fn line(coords: &[(f64, f64)]) -> VectorLineString {
        coords.iter().map(|&(x, y)| VectorPoint::new(x, y)).collect()
    }

    #[test]
    fn test_rule_set_identity_diagonal() {
        for face in 0..6 {
            assert_eq!(FACE_RULE_SET[face][face], (Rotation::Zero, 0.0, 0.0));
        }
        assert_eq!(rotate(Rotation::Cw, 0.25, 0.75), (0.75, 0.75));
        assert_eq!(rotate(Rotation::Ccw, 0.25, 0.75), (0.25, 0.25));
    }

    #[test]
    fn test_to_s2_point() {
        let res = to_s2(
            &feature(VectorGeometry::Point(VectorShape::new(VectorPoint::new(0.0, 0.0)))),
            None,
            None,
        );
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].id, Some(1337));
        assert_eq!(res[0].face, 0);
        assert_eq!(res[0].properties["a"], json!(1));

        let VectorGeometry::Point(g) = &res[0].geometry else {
            panic!("expected a point");
        };
        assert_eq!((g.coordinates.x, g.coordinates.y), (0.5, 0.5));
        assert_eq!(g.vec_bbox, Some(BBox::new(0.5, 0.5, 0.5, 0.5)));
    }

    #[test]
    fn test_to_s2_multi_point() {
        let geometry = VectorGeometry::MultiPoint(VectorShape::new(line(&[
            (0.0, 0.0),
            (-180.0, -90.0),
            (180.0, 90.0),
        ])));
        let res = to_s2(&feature(geometry), None, None);
        let faces: Vec<_> = res.iter().map(|f| f.face).collect();
        assert_eq!(faces, vec![0, 5, 2]);
        for f in &res {
            let VectorGeometry::Point(g) = &f.geometry else {
                panic!("expected a point");
            };
            assert_close(g.coordinates.x, 0.5);
            assert_close(g.coordinates.y, 0.5);
        }
    }

    #[test]
    fn test_to_s2_line_string_crosses_faces() {
        let geometry = VectorGeometry::LineString(VectorShape::new(line(&[
            (0.0, 0.0),
            (20.0, 20.0),
            (30.0, 30.0),
            (40.0, 40.0),
        ])));
        let res = to_s2(&feature(geometry), None, None);
        assert_eq!(res.len(), 2);

        let VectorGeometry::LineString(face0) = &res[0].geometry else {
            panic!("expected a line string");
        };
        assert_eq!(res[0].face, 0);
        let expected = [
            (0.5, 0.5),
            (0.7231719544476624, 0.7351848576118168),
            (0.8264458251405347, 0.8660254037844386),
            (0.6953495465482081, 1.0625),
        ];
        assert_eq!(face0.coordinates.len(), expected.len());
        for (p, (x, y)) in face0.coordinates.iter().zip(expected) {
            assert_close(p.x, x);
            assert_close(p.y, y);
        }
        assert_eq!(face0.offset, Some(0.0));

        let VectorGeometry::LineString(face2) = &res[1].geometry else {
            panic!("expected a line string");
        };
        assert_eq!(res[1].face, 2);
        assert_eq!(face2.coordinates.len(), 2);
        assert_close(face2.coordinates[0].x, -0.0625);
        assert_close(face2.coordinates[0].y, 0.17012925937810885);
        assert_close(face2.coordinates[1].x, 0.033200039883945376);
        assert_close(face2.coordinates[1].y, 0.091961822201713);
        assert_close(face2.offset.unwrap(), 1.5284052199258356);
    }

    #[test]
    fn test_to_s2_polygon_attaches_holes() {
        let geometry = VectorGeometry::Polygon(VectorShape::new(vec![
            line(&[(-10.0, -10.0), (10.0, -10.0), (10.0, 10.0), (-10.0, 10.0), (-10.0, -10.0)]),
            line(&[(-5.0, -5.0), (-5.0, 5.0), (5.0, 5.0), (5.0, -5.0), (-5.0, -5.0)]),
        ]));
        let res = to_s2(&feature(geometry), Some(3.0), None);
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].face, 0);

        let VectorGeometry::Polygon(g) = &res[0].geometry else {
            panic!("expected a polygon");
        };
        assert_eq!(g.coordinates.len(), 2);
        assert_eq!(g.offset, Some(vec![0.0, 0.0]));
        let vec_bbox = g.vec_bbox.unwrap();
        assert!(vec_bbox.left < 0.5 && vec_bbox.right > 0.5);
        // tagged for simplification
        assert_eq!(g.coordinates[0][0].t, Some(1.0));
    }

    #[test]
    fn test_to_wm_round_trip() {
        let geometry = VectorGeometry::MultiPoint(VectorShape::new(line(&[
            (10.0, 20.0),
            (-100.0, 45.0),
            (60.0, -70.0),
        ])));
        for s2 in to_s2(&feature(geometry), None, None) {
            let back = to_wm(&s2);
            assert_eq!(back.id, Some(1337));
            let VectorGeometry::Point(g) = &back.geometry else {
                panic!("expected a point");
            };
            let p = &g.coordinates;
            let known = [(10.0, 20.0), (-100.0, 45.0), (60.0, -70.0)];
            assert!(known
                .iter()
                .any(|&(lon, lat)| (p.x - lon).abs() < 1e-9 && (p.y - lat).abs() < 1e-9));
        }
    }
}
