//! Direction vectors on the unit sphere.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use super::coords;
use crate::Face;

/// A point on (or a direction towards) the unit sphere.
///
/// Points built from lon-lat are unit length; points built from face coordinates usually
/// are not and only the direction matters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct S2Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl S2Point {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Unit vector for a longitude/latitude in degrees
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        let (lon, lat) = (lon.to_radians(), lat.to_radians());
        Self::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
    }

    /// Longitude/latitude in degrees. The vector need not be normalized.
    pub fn to_lon_lat(&self) -> (f64, f64) {
        let lon = self.y.atan2(self.x).to_degrees();
        let lat = self.z.atan2(self.x.hypot(self.y)).to_degrees();
        (lon, lat)
    }

    /// Component by axis index: 0 = x, 1 = y, anything else = z
    pub fn component(&self, axis: u8) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    pub fn abs(&self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Euclidean length
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Scale to unit length in place. The zero vector is left alone.
    pub fn normalize(&mut self) {
        let len = self.norm();
        if len > 0.0 {
            self.x /= len;
            self.y /= len;
            self.z /= len;
        }
    }

    /// Chord distance to another point
    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).norm()
    }

    /// Index of the component with the largest magnitude (0 = x, 1 = y, 2 = z)
    pub fn largest_abs_component(&self) -> u8 {
        let a = self.abs();
        if a.x > a.y {
            if a.x > a.z {
                0
            } else {
                2
            }
        } else if a.y > a.z {
            1
        } else {
            2
        }
    }

    /// Cube face this direction falls on
    pub fn face(&self) -> Face {
        coords::get_face(self)
    }

    /// `(face, s, t)` for this direction
    pub fn to_face_st(&self) -> (Face, f64, f64) {
        coords::xyz_to_face_st(self)
    }

    /// `(face, u, v)` for this direction
    pub fn to_face_uv(&self) -> (Face, f64, f64) {
        coords::xyz_to_face_uv(self)
    }
}

impl Add for S2Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for S2Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for S2Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for S2Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lon_lat_round_trip() {
        for &(lon, lat) in &[(0.0, 0.0), (45.0, 45.0), (-120.5, 33.25), (179.9, -89.0)] {
            let (lon2, lat2) = S2Point::from_lon_lat(lon, lat).to_lon_lat();
            assert!((lon - lon2).abs() < 1e-9, "lon {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-9, "lat {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_largest_abs_component() {
        assert_eq!(S2Point::new(-3.0, 1.0, 2.0).largest_abs_component(), 0);
        assert_eq!(S2Point::new(0.1, -0.5, 0.2).largest_abs_component(), 1);
        assert_eq!(S2Point::new(0.5, 0.5, 0.7).largest_abs_component(), 2);
    }

    #[test]
    fn test_normalize_and_cross() {
        let mut p = S2Point::new(3.0, 0.0, 4.0);
        p.normalize();
        assert!((p.norm() - 1.0).abs() < 1e-15);

        let x = S2Point::new(1.0, 0.0, 0.0);
        let y = S2Point::new(0.0, 1.0, 0.0);
        assert_eq!(x.cross(&y), S2Point::new(0.0, 0.0, 1.0));
        assert_eq!(-x + y * 2.0, S2Point::new(-1.0, 2.0, 0.0));

        let mut zero = S2Point::default();
        zero.normalize();
        assert!(zero.is_empty());
    }
}
