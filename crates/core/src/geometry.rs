//! Flat and vector geometry types.
//!
//! Input arrives as *flat* GeoJSON-like geometry ([`Geometry`]): coordinate arrays with an
//! optional parallel `mValues` tree. Everything downstream works on *vector* geometry
//! ([`VectorGeometry`]) whose vertices are structured [`VectorPoint`]s that can carry
//! elevation, an M-value bag and a simplification weight.

use serde::{Deserialize, Serialize};

use crate::bbox::{Axis, BBox};
use crate::{Error, Result};

/// Arbitrary property bag attached to a single vertex
pub type MValue = serde_json::Map<String, serde_json::Value>;

/// Feature properties (and metadata) bag
pub type Properties = serde_json::Map<String, serde_json::Value>;

// =============================================================================
// FLAT GEOMETRY
// =============================================================================

/// A flat `[x, y]` or `[x, y, z]` position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }
}

impl TryFrom<Vec<f64>> for Point {
    type Error = String;

    fn try_from(values: Vec<f64>) -> std::result::Result<Self, Self::Error> {
        match values.as_slice() {
            [x, y] => Ok(Point::new(*x, *y)),
            [x, y, z] => Ok(Point::new_3d(*x, *y, *z)),
            other => Err(format!("position must have 2 or 3 values, found {}", other.len())),
        }
    }
}

impl From<Point> for Vec<f64> {
    fn from(point: Point) -> Self {
        match point.z {
            Some(z) => vec![point.x, point.y, z],
            None => vec![point.x, point.y],
        }
    }
}

/// Shared shape of every flat geometry kind: coordinates, an M-value tree nested like the
/// coordinates, and an optional bbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatShape<C, M> {
    pub coordinates: C,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m_values: Option<M>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
}

impl<C, M> FlatShape<C, M> {
    pub fn new(coordinates: C) -> Self {
        Self {
            coordinates,
            m_values: None,
            bbox: None,
        }
    }
}

/// GeoJSON-like geometry with flat coordinate arrays. The `*3D` type names are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    #[serde(alias = "Point3D")]
    Point(FlatShape<Point, MValue>),
    #[serde(alias = "MultiPoint3D")]
    MultiPoint(FlatShape<Vec<Point>, Vec<MValue>>),
    #[serde(alias = "LineString3D")]
    LineString(FlatShape<Vec<Point>, Vec<MValue>>),
    #[serde(alias = "MultiLineString3D")]
    MultiLineString(FlatShape<Vec<Vec<Point>>, Vec<Vec<MValue>>>),
    #[serde(alias = "Polygon3D")]
    Polygon(FlatShape<Vec<Vec<Point>>, Vec<Vec<MValue>>>),
    #[serde(alias = "MultiPolygon3D")]
    MultiPolygon(FlatShape<Vec<Vec<Vec<Point>>>, Vec<Vec<Vec<MValue>>>>),
}

impl Geometry {
    /// GeoJSON type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

fn flat_line(ls: &geo::LineString<f64>) -> Vec<Point> {
    ls.0.iter().map(|c| Point::new(c.x, c.y)).collect()
}

fn flat_polygon(poly: &geo::Polygon<f64>) -> Vec<Vec<Point>> {
    std::iter::once(poly.exterior())
        .chain(poly.interiors())
        .map(flat_line)
        .collect()
}

impl TryFrom<&geo::Geometry<f64>> for Geometry {
    type Error = Error;

    fn try_from(geometry: &geo::Geometry<f64>) -> Result<Self> {
        Ok(match geometry {
            geo::Geometry::Point(p) => Geometry::Point(FlatShape::new(Point::new(p.x(), p.y()))),
            geo::Geometry::MultiPoint(mp) => Geometry::MultiPoint(FlatShape::new(
                mp.0.iter().map(|p| Point::new(p.x(), p.y())).collect(),
            )),
            geo::Geometry::Line(line) => Geometry::LineString(FlatShape::new(vec![
                Point::new(line.start.x, line.start.y),
                Point::new(line.end.x, line.end.y),
            ])),
            geo::Geometry::LineString(ls) => Geometry::LineString(FlatShape::new(flat_line(ls))),
            geo::Geometry::MultiLineString(mls) => {
                Geometry::MultiLineString(FlatShape::new(mls.0.iter().map(flat_line).collect()))
            }
            geo::Geometry::Polygon(poly) => Geometry::Polygon(FlatShape::new(flat_polygon(poly))),
            geo::Geometry::MultiPolygon(mp) => {
                Geometry::MultiPolygon(FlatShape::new(mp.0.iter().map(flat_polygon).collect()))
            }
            geo::Geometry::Rect(rect) => {
                Geometry::Polygon(FlatShape::new(flat_polygon(&rect.to_polygon())))
            }
            geo::Geometry::Triangle(triangle) => {
                Geometry::Polygon(FlatShape::new(flat_polygon(&triangle.to_polygon())))
            }
            geo::Geometry::GeometryCollection(_) => {
                return Err(Error::InvalidGeometryType("GeometryCollection".to_string()))
            }
        })
    }
}

// =============================================================================
// VECTOR GEOMETRY
// =============================================================================

/// A structured vertex.
///
/// `x`/`y` are lon-lat degrees before projection and unit-square (or tile-local) coordinates
/// after. `t` is the Douglas-Peucker retain weight written by
/// [`build_sq_dists`](crate::simplify::build_sq_dists); it never leaves the process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<MValue>,
    #[serde(skip)]
    pub t: Option<f64>,
}

impl VectorPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            ..Default::default()
        }
    }

    /// Attach an M-value bag
    pub fn with_m(mut self, m: MValue) -> Self {
        self.m = Some(m);
        self
    }

    /// Build from a flat position and its optional M-value
    pub fn from_flat(point: &Point, m: Option<&MValue>) -> Self {
        Self {
            x: point.x,
            y: point.y,
            z: point.z,
            m: m.cloned(),
            t: None,
        }
    }

    /// Coordinate along `axis`
    pub fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Planar Euclidean distance
    pub fn distance(&self, other: &Self) -> f64 {
        let (dx, dy) = (other.x - self.x, other.y - self.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<geo::Coord<f64>> for VectorPoint {
    fn from(coord: geo::Coord<f64>) -> Self {
        VectorPoint::new(coord.x, coord.y)
    }
}

pub type VectorLineString = Vec<VectorPoint>;
pub type VectorPolygon = Vec<VectorLineString>;

/// Shared shape of every vector geometry kind.
///
/// `O` is the offset shape: one value per line for line-derived kinds, nested for
/// multipolygons, and `()` (always absent) for points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorShape<C, O = ()> {
    pub coordinates: C,
    #[serde(rename = "is3D", default)]
    pub is_3d: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
    #[serde(rename = "vecBBox", default, skip_serializing_if = "Option::is_none")]
    pub vec_bbox: Option<BBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<O>,
}

impl<C, O> VectorShape<C, O> {
    pub fn new(coordinates: C) -> Self {
        Self {
            coordinates,
            is_3d: false,
            bbox: None,
            vec_bbox: None,
            offset: None,
        }
    }

    pub fn with_vec_bbox(mut self, vec_bbox: BBox) -> Self {
        self.vec_bbox = Some(vec_bbox);
        self
    }

    pub fn with_offset(mut self, offset: O) -> Self {
        self.offset = Some(offset);
        self
    }
}

pub type VectorPointGeometry = VectorShape<VectorPoint>;
pub type VectorMultiPointGeometry = VectorShape<Vec<VectorPoint>>;
pub type VectorLineStringGeometry = VectorShape<VectorLineString, f64>;
pub type VectorMultiLineStringGeometry = VectorShape<Vec<VectorLineString>, Vec<f64>>;
pub type VectorPolygonGeometry = VectorShape<VectorPolygon, Vec<f64>>;
pub type VectorMultiPolygonGeometry = VectorShape<Vec<VectorPolygon>, Vec<Vec<f64>>>;

/// Geometry in the engine's working representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VectorGeometry {
    Point(VectorPointGeometry),
    MultiPoint(VectorMultiPointGeometry),
    LineString(VectorLineStringGeometry),
    MultiLineString(VectorMultiLineStringGeometry),
    Polygon(VectorPolygonGeometry),
    MultiPolygon(VectorMultiPolygonGeometry),
}

macro_rules! shape_field {
    ($geometry:expr, $field:ident) => {
        match $geometry {
            VectorGeometry::Point(g) => &g.$field,
            VectorGeometry::MultiPoint(g) => &g.$field,
            VectorGeometry::LineString(g) => &g.$field,
            VectorGeometry::MultiLineString(g) => &g.$field,
            VectorGeometry::Polygon(g) => &g.$field,
            VectorGeometry::MultiPolygon(g) => &g.$field,
        }
    };
}

macro_rules! shape_field_mut {
    ($geometry:expr, $field:ident) => {
        match $geometry {
            VectorGeometry::Point(g) => &mut g.$field,
            VectorGeometry::MultiPoint(g) => &mut g.$field,
            VectorGeometry::LineString(g) => &mut g.$field,
            VectorGeometry::MultiLineString(g) => &mut g.$field,
            VectorGeometry::Polygon(g) => &mut g.$field,
            VectorGeometry::MultiPolygon(g) => &mut g.$field,
        }
    };
}

impl VectorGeometry {
    /// GeoJSON type name
    pub fn type_name(&self) -> &'static str {
        match self {
            VectorGeometry::Point(_) => "Point",
            VectorGeometry::MultiPoint(_) => "MultiPoint",
            VectorGeometry::LineString(_) => "LineString",
            VectorGeometry::MultiLineString(_) => "MultiLineString",
            VectorGeometry::Polygon(_) => "Polygon",
            VectorGeometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    pub fn is_3d(&self) -> bool {
        *shape_field!(self, is_3d)
    }

    pub fn bbox(&self) -> Option<&BBox> {
        shape_field!(self, bbox).as_ref()
    }

    pub fn vec_bbox(&self) -> Option<&BBox> {
        shape_field!(self, vec_bbox).as_ref()
    }

    pub fn set_vec_bbox(&mut self, vec_bbox: Option<BBox>) {
        *shape_field_mut!(self, vec_bbox) = vec_bbox;
    }

    /// Visit every vertex in storage order
    pub fn points(&self) -> Box<dyn Iterator<Item = &VectorPoint> + '_> {
        match self {
            VectorGeometry::Point(g) => Box::new(std::iter::once(&g.coordinates)),
            VectorGeometry::MultiPoint(g) => Box::new(g.coordinates.iter()),
            VectorGeometry::LineString(g) => Box::new(g.coordinates.iter()),
            VectorGeometry::MultiLineString(g) => Box::new(g.coordinates.iter().flatten()),
            VectorGeometry::Polygon(g) => Box::new(g.coordinates.iter().flatten()),
            VectorGeometry::MultiPolygon(g) => {
                Box::new(g.coordinates.iter().flatten().flatten())
            }
        }
    }

    /// Mutate every vertex in place
    pub fn for_each_point_mut(&mut self, mut f: impl FnMut(&mut VectorPoint)) {
        match self {
            VectorGeometry::Point(g) => f(&mut g.coordinates),
            VectorGeometry::MultiPoint(g) => g.coordinates.iter_mut().for_each(f),
            VectorGeometry::LineString(g) => g.coordinates.iter_mut().for_each(f),
            VectorGeometry::MultiLineString(g) => {
                g.coordinates.iter_mut().flatten().for_each(f)
            }
            VectorGeometry::Polygon(g) => g.coordinates.iter_mut().flatten().for_each(f),
            VectorGeometry::MultiPolygon(g) => {
                g.coordinates.iter_mut().flatten().flatten().for_each(f)
            }
        }
    }

    /// Recompute `vecBBox` from the current vertices
    pub fn rebuild_vec_bbox(&mut self) {
        let vec_bbox = BBox::from_points(self.points());
        self.set_vec_bbox(vec_bbox);
    }

    /// Number of vertices
    pub fn num_points(&self) -> usize {
        self.points().count()
    }
}
