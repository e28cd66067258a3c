//! S2 coordinate systems and the transforms between them.
//!
//! # Coordinate Spaces
//!
//! ```text
//! (lon, lat) ⇄ (x, y, z) ⇄ (face, u, v) ⇄ (face, s, t) ⇄ (face, i, j) ⇄ cell id
//! ```
//!
//! - `(x, y, z)`: direction vector, not necessarily unit length
//! - `(face, u, v)`: cube-space coordinates in `[-1, 1]`
//! - `(face, s, t)`: cell-space coordinates in `[0, 1]`, the quadratic warp of `(u, v)`
//! - `(face, si, ti)`: `(s, t)` doubled onto the integer grid `[0, 2^31]`, so cell centres
//!   and edges are both exact
//! - `(face, i, j)`: leaf-cell indices in `[0, 2^30)`
//!
//! All six faces are right-handed in `(i, j)`, `(s, t)` and `(u, v)`.

use super::point::S2Point;
use crate::Face;

/// Number of levels needed to address a leaf cell
pub const K_MAX_CELL_LEVEL: u8 = 30;

/// One past the largest leaf-cell index
pub const K_LIMIT_IJ: u32 = 1 << K_MAX_CELL_LEVEL;

/// Largest si/ti value
pub const K_MAX_SI_TI: u32 = 1 << (K_MAX_CELL_LEVEL + 1);

/// `[u, v, w]` axes of each face in xyz
pub const K_FACE_UVW_AXES: [[[f64; 3]; 3]; 6] = [
    [[0.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]],
    [[-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]],
    [[-1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]],
    [[0.0, 0.0, -1.0], [0.0, -1.0, 0.0], [-1.0, 0.0, 0.0]],
    [[0.0, 0.0, -1.0], [1.0, 0.0, 0.0], [0.0, -1.0, 0.0]],
    [[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]],
];

/// Unit vector for a longitude/latitude in degrees
pub fn lon_lat_to_xyz(lon: f64, lat: f64) -> S2Point {
    S2Point::from_lon_lat(lon, lat)
}

/// Longitude/latitude in degrees for a direction vector
pub fn xyz_to_lon_lat(p: &S2Point) -> (f64, f64) {
    p.to_lon_lat()
}

/// Quadratic warp from cell space to cube space
pub fn st_to_uv(s: f64) -> f64 {
    if s >= 0.5 {
        (1.0 / 3.0) * (4.0 * s * s - 1.0)
    } else {
        (1.0 / 3.0) * (1.0 - 4.0 * (1.0 - s) * (1.0 - s))
    }
}

/// Inverse of [`st_to_uv`]
pub fn uv_to_st(u: f64) -> f64 {
    if u >= 0.0 {
        0.5 * (1.0 + 3.0 * u).sqrt()
    } else {
        1.0 - 0.5 * (1.0 - 3.0 * u).sqrt()
    }
}

/// Minimum s/t value covered by leaf index `i` (valid for `i` in `[0, 2^30]`)
pub fn ij_to_st(i: u32) -> f64 {
    debug_assert!(i <= K_LIMIT_IJ);
    i as f64 / K_LIMIT_IJ as f64
}

/// Leaf index of the cell containing `s`, clamped to the valid range
pub fn st_to_ij(s: f64) -> u32 {
    (K_LIMIT_IJ as f64 * s - 0.5)
        .round()
        .clamp(0.0, (K_LIMIT_IJ - 1) as f64) as u32
}

/// Doubled grid coordinate back to `[0, 1]`
pub fn si_ti_to_st(si: u32) -> f64 {
    debug_assert!(si <= K_MAX_SI_TI);
    si as f64 / K_MAX_SI_TI as f64
}

/// Nearest doubled grid coordinate for `s`
pub fn st_to_si_ti(s: f64) -> u32 {
    (s * K_MAX_SI_TI as f64).round() as u32
}

/// Direction vector for cube-space coordinates on a face
pub fn face_uv_to_xyz(face: Face, u: f64, v: f64) -> S2Point {
    match face {
        0 => S2Point::new(1.0, u, v),
        1 => S2Point::new(-u, 1.0, v),
        2 => S2Point::new(-u, -v, 1.0),
        3 => S2Point::new(-1.0, -v, -u),
        4 => S2Point::new(v, -1.0, -u),
        _ => S2Point::new(v, u, -1.0),
    }
}

/// Direction vector for cell-space coordinates on a face
pub fn face_st_to_xyz(face: Face, s: f64, t: f64) -> S2Point {
    face_uv_to_xyz(face, st_to_uv(s), st_to_uv(t))
}

/// Direction vector for doubled grid coordinates on a face
pub fn face_si_ti_to_xyz(face: Face, si: u32, ti: u32) -> S2Point {
    face_st_to_xyz(face, si_ti_to_st(si), si_ti_to_st(ti))
}

/// `(u, v)` of `p` on `face`, which must be the face `p` points into (or at least on its
/// hemisphere). The result may fall outside `[-1, 1]`.
pub fn valid_face_xyz_to_uv(face: Face, p: &S2Point) -> (f64, f64) {
    debug_assert!(p.dot(&get_norm(face)) > 0.0);
    match face {
        0 => (p.y / p.x, p.z / p.x),
        1 => (-p.x / p.y, p.z / p.y),
        2 => (-p.x / p.z, -p.y / p.z),
        3 => (p.z / p.x, p.y / p.x),
        4 => (p.z / p.y, -p.x / p.y),
        _ => (-p.y / p.z, -p.x / p.z),
    }
}

/// The face a direction points into: the axis of the largest component, +3 when negative
pub fn get_face(p: &S2Point) -> Face {
    let axis = p.largest_abs_component();
    if p.component(axis) < 0.0 {
        axis + 3
    } else {
        axis
    }
}

pub fn xyz_to_face_uv(p: &S2Point) -> (Face, f64, f64) {
    let face = get_face(p);
    let (u, v) = valid_face_xyz_to_uv(face, p);
    (face, u, v)
}

pub fn xyz_to_face_st(p: &S2Point) -> (Face, f64, f64) {
    let (face, u, v) = xyz_to_face_uv(p);
    (face, uv_to_st(u), uv_to_st(v))
}

/// `(u, v)` of `p` projected onto `face`, or `None` when `p` lies in the opposite
/// hemisphere
pub fn face_xyz_to_uv(face: Face, p: &S2Point) -> Option<(f64, f64)> {
    let on_side = if face < 3 {
        p.component(face) > 0.0
    } else {
        p.component(face - 3) < 0.0
    };
    on_side.then(|| valid_face_xyz_to_uv(face, p))
}

/// `p` expressed in the `(u, v, w)` frame of `face`
pub fn face_xyz_to_uvw(face: Face, p: &S2Point) -> S2Point {
    match face {
        0 => S2Point::new(p.y, p.z, p.x),
        1 => S2Point::new(-p.x, p.z, p.y),
        2 => S2Point::new(-p.x, -p.y, p.z),
        3 => S2Point::new(-p.z, -p.y, -p.x),
        4 => S2Point::new(-p.z, p.x, -p.y),
        _ => S2Point::new(p.y, p.x, -p.z),
    }
}

/// Right-handed normal of the plane through the origin containing the edge of constant
/// `u` (running in +v) on `face`
pub fn get_u_norm(face: Face, u: f64) -> S2Point {
    match face {
        0 => S2Point::new(u, -1.0, 0.0),
        1 => S2Point::new(1.0, u, 0.0),
        2 => S2Point::new(1.0, 0.0, u),
        3 => S2Point::new(-u, 0.0, 1.0),
        4 => S2Point::new(0.0, -u, 1.0),
        _ => S2Point::new(0.0, -1.0, -u),
    }
}

/// Right-handed normal of the plane containing the edge of constant `v` (running in +u)
pub fn get_v_norm(face: Face, v: f64) -> S2Point {
    match face {
        0 => S2Point::new(-v, 0.0, 1.0),
        1 => S2Point::new(0.0, -v, 1.0),
        2 => S2Point::new(0.0, -1.0, -v),
        3 => S2Point::new(v, -1.0, 0.0),
        4 => S2Point::new(1.0, v, 0.0),
        _ => S2Point::new(1.0, 0.0, v),
    }
}

/// Axis `axis` (u = 0, v = 1, w = 2) of `face`
pub fn get_uvw_axis(face: Face, axis: usize) -> S2Point {
    let [x, y, z] = K_FACE_UVW_AXES[face as usize % 6][axis % 3];
    S2Point::new(x, y, z)
}

/// Unit normal of `face`
pub fn get_norm(face: Face) -> S2Point {
    get_uvw_axis(face, 2)
}

pub fn get_u_axis(face: Face) -> S2Point {
    get_uvw_axis(face, 0)
}

pub fn get_v_axis(face: Face) -> S2Point {
    get_uvw_axis(face, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_st_uv_round_trip() {
        for &s in &[0.0, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0] {
            let back = uv_to_st(st_to_uv(s));
            assert!((s - back).abs() < EPS, "{} vs {}", s, back);
        }
        assert_eq!(st_to_uv(0.5), 0.0);
        assert_eq!(st_to_uv(1.0), 1.0);
        assert_eq!(st_to_uv(0.0), -1.0);
    }

    #[test]
    fn test_st_to_ij_clamps() {
        assert_eq!(st_to_ij(0.0), 0);
        assert_eq!(st_to_ij(-0.5), 0);
        assert_eq!(st_to_ij(1.0), K_LIMIT_IJ - 1);
        assert_eq!(st_to_ij(0.5), K_LIMIT_IJ / 2);
        assert_eq!(ij_to_st(K_LIMIT_IJ / 2), 0.5);
    }

    #[test]
    fn test_si_ti() {
        assert_eq!(st_to_si_ti(0.5), K_MAX_SI_TI / 2);
        assert_eq!(si_ti_to_st(K_MAX_SI_TI / 2), 0.5);
        assert_eq!(si_ti_to_st(K_MAX_SI_TI), 1.0);
    }

    #[test]
    fn test_face_detection() {
        assert_eq!(get_face(&S2Point::new(1.0, 0.2, 0.3)), 0);
        assert_eq!(get_face(&S2Point::new(0.1, 1.0, 0.3)), 1);
        assert_eq!(get_face(&S2Point::new(0.1, 0.2, 1.0)), 2);
        assert_eq!(get_face(&S2Point::new(-1.0, 0.2, 0.3)), 3);
        assert_eq!(get_face(&S2Point::new(0.1, -1.0, 0.3)), 4);
        assert_eq!(get_face(&S2Point::new(0.1, 0.2, -1.0)), 5);
    }

    #[test]
    fn test_face_uv_round_trip() {
        for face in 0..6 {
            let p = face_uv_to_xyz(face, 0.25, -0.5);
            let (f, u, v) = xyz_to_face_uv(&p);
            assert_eq!(f, face);
            assert!((u - 0.25).abs() < EPS);
            assert!((v + 0.5).abs() < EPS);

            let uvw = face_xyz_to_uvw(face, &p);
            assert!((uvw.x - 0.25).abs() < EPS);
            assert!((uvw.y + 0.5).abs() < EPS);
            assert!((uvw.z - 1.0).abs() < EPS);

            assert_eq!(face_xyz_to_uv(face, &p), Some((u, v)));
            assert_eq!(face_xyz_to_uv(face, &-p), None);
        }
    }

    #[test]
    fn test_axes_match_face_frame() {
        for face in 0..6 {
            let p = face_uv_to_xyz(face, 0.0, 0.0);
            assert_eq!(get_norm(face), p);
            let pu = face_uv_to_xyz(face, 1.0, 0.0) - p;
            assert_eq!(get_u_axis(face), pu);
            let pv = face_uv_to_xyz(face, 0.0, 1.0) - p;
            assert_eq!(get_v_axis(face), pv);
            // the u-norm is perpendicular to every point on its edge
            let edge = face_uv_to_xyz(face, 0.3, 0.7);
            assert!(get_u_norm(face, 0.3).dot(&edge).abs() < EPS);
            assert!(get_v_norm(face, 0.7).dot(&edge).abs() < EPS);
        }
    }

    #[test]
    fn test_lon_lat_to_face_st() {
        let (face, s, t) = xyz_to_face_st(&lon_lat_to_xyz(0.0, 0.0));
        assert_eq!(face, 0);
        assert!((s - 0.5).abs() < EPS);
        assert!((t - 0.5).abs() < EPS);

        let (face, s, t) = xyz_to_face_st(&lon_lat_to_xyz(45.0, 45.0));
        assert_eq!(face, 2);
        assert!((s - 0.11663705879751174).abs() < EPS);
        assert!((t - 0.11663705879751174).abs() < EPS);

        let (face, s, t) = xyz_to_face_st(&lon_lat_to_xyz(45.0, 22.0));
        assert_eq!(face, 0);
        assert!((s - 1.0).abs() < 1e-9);
        assert!((t - 0.8237320717914717).abs() < 1e-9);
    }

    #[test]
    fn test_face_st_to_lon_lat() {
        let (lon, lat) = xyz_to_lon_lat(&face_st_to_xyz(0, 0.5, 0.5));
        assert!(lon.abs() < EPS);
        assert!(lat.abs() < EPS);

        let (_, lat) = xyz_to_lon_lat(&face_st_to_xyz(2, 0.5, 0.5));
        assert!((lat - 90.0).abs() < EPS);
    }
}
