//! 64-bit S2 cell identifiers.
//!
//! A cell id packs a cube face and a position along that face's Hilbert curve:
//!
//! ```text
//! | face (3 bits) | 2 bits per level, up to 30 levels | 1 | 0 ... 0 |
//! ```
//!
//! The lowest set bit is a sentinel that fixes the level: a cell at level `k` has its lowest
//! set bit at position `2 * (30 - k)`. Leaf cells (level 30) are odd. A parent's id sits at
//! the midpoint of the id range spanned by its descendants, so numeric order is Hilbert
//! visiting order and containment is a range check.
//!
//! Encoding and decoding go through two 1024-entry lookup tables that translate four bits of
//! `i` and `j` (plus a 2-bit curve orientation) to eight bits of curve position at a time.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::coords::{
    face_si_ti_to_xyz, face_uv_to_xyz, ij_to_st, si_ti_to_st, st_to_ij, st_to_uv, uv_to_st,
    xyz_to_face_uv, K_LIMIT_IJ,
};
use super::point::S2Point;
use crate::bbox::BBox;
use crate::{Error, Face};

/// Bits used by the face number
pub const K_FACE_BITS: u32 = 3;
/// Number of cube faces
pub const K_NUM_FACES: u8 = 6;
/// Deepest cell level
pub const K_MAX_LEVEL: u8 = 30;
/// Bits used by the Hilbert position, sentinel included
pub const K_POS_BITS: u32 = 2 * K_MAX_LEVEL as u32 + 1;
/// Leaf cells along one face edge
pub const K_MAX_SIZE: u32 = K_LIMIT_IJ;
/// Distance from the end of the curve back to its start
pub const K_WRAP_OFFSET: u64 = (K_NUM_FACES as u64) << K_POS_BITS;
/// Orientation bit: i and j swapped
pub const K_SWAP_MASK: u8 = 0x01;
/// Orientation bit: i and j inverted
pub const K_INVERT_MASK: u8 = 0x02;
/// Bits of i and j consumed per table lookup
pub const K_LOOKUP_BITS: u32 = 4;

const POS_TO_ORIENTATION: [u32; 4] = [K_SWAP_MASK as u32, 0, 0, (K_INVERT_MASK | K_SWAP_MASK) as u32];

const POS_TO_IJ: [[u32; 4]; 4] = [
    [0, 1, 3, 2], // canonical order
    [0, 2, 3, 1], // axes swapped
    [3, 2, 0, 1], // bits inverted
    [3, 1, 0, 2], // swapped and inverted
];

const ORIENTATION_LSB_MASK: u64 = 0x1111_1111_1111_1110;
const VALID_LSB_MASK: u64 = 0x1555_5555_5555_5555;

/// `ij|orientation` to `pos|orientation` and back
struct LookupTables {
    pos: [u16; 1024],
    ij: [u16; 1024],
}

impl LookupTables {
    fn build() -> Self {
        let mut tables = Self {
            pos: [0; 1024],
            ij: [0; 1024],
        };
        for orientation in 0..4 {
            tables.init_cell(0, 0, 0, orientation, 0, orientation);
        }
        tables
    }

    fn init_cell(&mut self, level: u32, i: u32, j: u32, orig: u32, pos: u32, orientation: u32) {
        if level == K_LOOKUP_BITS {
            let ij = (i << K_LOOKUP_BITS) + j;
            self.pos[((ij << 2) + orig) as usize] = ((pos << 2) + orientation) as u16;
            self.ij[((pos << 2) + orig) as usize] = ((ij << 2) + orientation) as u16;
            return;
        }

        let r = POS_TO_IJ[orientation as usize];
        for (k, &ij) in r.iter().enumerate() {
            self.init_cell(
                level + 1,
                (i << 1) + (ij >> 1),
                (j << 1) + (ij & 1),
                orig,
                (pos << 2) + k as u32,
                orientation ^ POS_TO_ORIENTATION[k],
            );
        }
    }
}

fn lookup() -> &'static LookupTables {
    static TABLES: OnceLock<LookupTables> = OnceLock::new();
    TABLES.get_or_init(LookupTables::build)
}

/// Lowest set bit of cells at `level`
pub fn lsb_for_level(level: u8) -> u64 {
    1 << (2 * (K_MAX_LEVEL - level.min(K_MAX_LEVEL)) as u64)
}

/// Edge length of a `level` cell in leaf units
pub fn size_ij(level: u8) -> u32 {
    1 << (K_MAX_LEVEL - level.min(K_MAX_LEVEL))
}

/// Edge length of a `level` cell in s/t units
pub fn size_st(level: u8) -> f64 {
    ij_to_st(size_ij(level))
}

/// A cell on the S2 cube-sphere.
///
/// Operations never fail; ids that do not name a real cell (see [`S2CellId::is_valid`])
/// produce defined but meaningless results.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct S2CellId(pub u64);

impl From<u64> for S2CellId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<S2CellId> for u64 {
    fn from(id: S2CellId) -> Self {
        id.0
    }
}

impl S2CellId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }

    // =========================================================================
    // CONSTRUCTORS
    // =========================================================================

    /// The level-0 cell covering a whole face
    pub fn from_face(face: Face) -> Self {
        Self(((face as u64) << K_POS_BITS) + lsb_for_level(0))
    }

    /// Cell from face and i/j coordinates.
    ///
    /// # Arguments
    ///
    /// * `face` - Cube face (0..=5)
    /// * `i`, `j` - Leaf coordinates, or coordinates at `level` when one is given
    /// * `level` - Optional level the coordinates (and the returned cell) live at
    ///
    /// # Returns
    ///
    /// The leaf cell at `(i, j)`, or its ancestor at `level`
    pub fn from_face_ij(face: Face, i: u32, j: u32, level: Option<u8>) -> Self {
        let tables = lookup();
        let (mut i, mut j) = (i as u64, j as u64);
        if let Some(level) = level {
            let shift = (K_MAX_LEVEL - level.min(K_MAX_LEVEL)) as u64;
            i <<= shift;
            j <<= shift;
        }

        let mut n = (face as u64) << (K_POS_BITS - 1);
        let mut bits = (face & K_SWAP_MASK) as u64;
        let mask = (1u64 << K_LOOKUP_BITS) - 1;
        for k in (0..8u64).rev() {
            bits += ((i >> (k * 4)) & mask) << (K_LOOKUP_BITS + 2);
            bits += ((j >> (k * 4)) & mask) << 2;
            bits = tables.pos[bits as usize] as u64;
            n |= (bits >> 2) << (k * 8);
            bits &= (K_SWAP_MASK | K_INVERT_MASK) as u64;
        }

        let id = Self((n << 1) + 1);
        match level {
            Some(level) => id.parent(Some(level)),
            None => id,
        }
    }

    /// Leaf cell at cell-space `(s, t)` on `face`
    pub fn from_face_st(face: Face, s: f64, t: f64) -> Self {
        Self::from_face_ij(face, st_to_ij(s), st_to_ij(t), None)
    }

    /// Leaf cell at cube-space `(u, v)` on `face`
    pub fn from_face_uv(face: Face, u: f64, v: f64) -> Self {
        Self::from_face_st(face, uv_to_st(u), uv_to_st(v))
    }

    /// Leaf cell containing a direction vector (need not be normalized)
    pub fn from_s2_point(p: &S2Point) -> Self {
        let (face, u, v) = xyz_to_face_uv(p);
        Self::from_face_uv(face, u, v)
    }

    /// Leaf cell containing a longitude/latitude in degrees
    pub fn from_lon_lat(lon: f64, lat: f64) -> Self {
        Self::from_s2_point(&S2Point::from_lon_lat(lon, lat))
    }

    /// Inverse of [`S2CellId::distance`]
    pub fn from_distance(distance: u64, level: Option<u8>) -> Self {
        let shift = 2 * (K_MAX_LEVEL - level.unwrap_or(K_MAX_LEVEL).min(K_MAX_LEVEL)) as u64;
        Self((distance << (shift + 1)) + (1 << shift))
    }

    /// Parse the `f/0123` form, see [`fmt::Display`]
    pub fn from_string(value: &str) -> crate::Result<Self> {
        value.parse()
    }

    // =========================================================================
    // DECODERS
    // =========================================================================

    /// Face, leaf (or `level`) i/j and Hilbert orientation.
    ///
    /// For a non-leaf cell the i/j are those of a leaf cell adjacent to its centre.
    pub fn to_face_ij_orientation(&self, level: Option<u8>) -> (Face, u32, u32, u8) {
        let tables = lookup();
        let face = self.face();
        let mut bits = (face & K_SWAP_MASK) as u64;
        let (mut i, mut j) = (0u32, 0u32);

        for k in (0..8u64).rev() {
            // the top chunk holds only 2 levels, the face bits sit above it
            let nbits = if k == 7 {
                K_MAX_LEVEL as u64 - 7 * K_LOOKUP_BITS as u64
            } else {
                K_LOOKUP_BITS as u64
            };
            bits += ((self.0 >> (k * 8 + 1)) & ((1 << (2 * nbits)) - 1)) << 2;
            bits = tables.ij[bits as usize] as u64;
            i += ((bits >> (K_LOOKUP_BITS + 2)) as u32) << (k * 4);
            j += (((bits >> 2) & 15) as u32) << (k * 4);
            bits &= (K_SWAP_MASK | K_INVERT_MASK) as u64;
        }

        // odd levels flip the swap bit
        if self.lsb() & ORIENTATION_LSB_MASK != 0 {
            bits ^= K_SWAP_MASK as u64;
        }

        if let Some(level) = level {
            let shift = (K_MAX_LEVEL - level.min(K_MAX_LEVEL)) as u32;
            i >>= shift;
            j >>= shift;
        }

        (face, i, j, bits as u8)
    }

    /// `(face, i, j)` at leaf resolution, or at `level`
    pub fn to_face_ij(&self, level: Option<u8>) -> (Face, u32, u32) {
        let (face, i, j, _) = self.to_face_ij_orientation(level);
        (face, i, j)
    }

    /// `(face, s, t)` of the leaf adjacent to the cell centre
    pub fn to_st(&self) -> (Face, f64, f64) {
        let (face, i, j) = self.to_face_ij(None);
        (face, ij_to_st(i), ij_to_st(j))
    }

    /// `(face, u, v)` of the leaf adjacent to the cell centre
    pub fn to_uv(&self) -> (Face, f64, f64) {
        let (face, s, t) = self.to_st();
        (face, st_to_uv(s), st_to_uv(t))
    }

    /// Exact cell centre on the doubled `(si, ti)` grid
    pub fn center_si_ti(&self) -> (Face, u32, u32) {
        let (face, i, j) = self.to_face_ij(None);
        let delta = if self.is_leaf() {
            1
        } else if (i as u64 ^ (self.0 >> 2)) & 1 != 0 {
            2
        } else {
            0
        };
        (face, 2 * i + delta, 2 * j + delta)
    }

    /// Cell centre in `(face, s, t)`
    pub fn center_st(&self) -> (Face, f64, f64) {
        let (face, si, ti) = self.center_si_ti();
        (face, si_ti_to_st(si), si_ti_to_st(ti))
    }

    /// Cell extent in s/t, sized for `level` (the cell's own level by default)
    pub fn bounds_st(&self, level: Option<u8>) -> BBox {
        let level = level.unwrap_or_else(|| self.level());
        let (_, s, t) = self.center_st();
        let half = size_st(level) * 0.5;
        BBox::new(s - half, t - half, s + half, t + half)
    }

    /// Cell centre as a direction vector, not normalized
    pub fn to_point_raw(&self) -> S2Point {
        let (face, si, ti) = self.center_si_ti();
        face_si_ti_to_xyz(face, si, ti)
    }

    /// Cell centre on the unit sphere
    pub fn to_point(&self) -> S2Point {
        let mut p = self.to_point_raw();
        p.normalize();
        p
    }

    /// Cell centre in longitude/latitude degrees
    pub fn to_lon_lat(&self) -> (f64, f64) {
        self.to_point_raw().to_lon_lat()
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    pub fn face(&self) -> Face {
        (self.0 >> K_POS_BITS) as Face
    }

    /// Lowest set bit (0 for id 0)
    pub fn lsb(&self) -> u64 {
        self.0 & self.0.wrapping_neg()
    }

    /// Level 0..=30. Id 0 reports level 0.
    pub fn level(&self) -> u8 {
        K_MAX_LEVEL.saturating_sub((self.0.trailing_zeros() / 2) as u8)
    }

    pub fn is_face(&self) -> bool {
        self.0 & ((1 << (K_POS_BITS - 1)) - 1) == 0
    }

    pub fn is_leaf(&self) -> bool {
        self.0 & 1 != 0
    }

    /// True when the face is in range and the sentinel sits at an even bit
    pub fn is_valid(&self) -> bool {
        self.face() < K_NUM_FACES && self.lsb() & VALID_LSB_MASK != 0
    }

    /// Hilbert index of this cell's ancestor at `level` (default: own level), face bits
    /// included
    pub fn distance(&self, level: Option<u8>) -> u64 {
        let level = level.unwrap_or_else(|| self.level()).min(K_MAX_LEVEL);
        self.0 >> (2 * (K_MAX_LEVEL - level) as u64 + 1)
    }

    /// Position (0..=3) of the ancestor at `level` within its own parent
    pub fn child_position(&self, level: u8) -> u8 {
        debug_assert!(level >= 1 && level <= self.level());
        ((self.0 >> (2 * (K_MAX_LEVEL - level.min(K_MAX_LEVEL)) as u64 + 1)) & 3) as u8
    }

    // =========================================================================
    // HIERARCHY
    // =========================================================================

    /// Ancestor at `level`, or the immediate parent
    pub fn parent(&self, level: Option<u8>) -> Self {
        let new_lsb = match level {
            Some(level) => lsb_for_level(level),
            None => self.lsb() << 2,
        };
        Self((self.0 & new_lsb.wrapping_neg()) | new_lsb)
    }

    /// Child at Hilbert position 0..=3. Leaves return themselves.
    pub fn child(&self, position: u8) -> Self {
        debug_assert!(position < 4);
        let new_lsb = self.lsb() >> 2;
        Self(
            self.0
                .wrapping_sub(3 * new_lsb)
                .wrapping_add(2 * position as u64 * new_lsb),
        )
    }

    /// The four children in `[0, 3, 2, 1]` curve order, or `[0, 1, 2, 3]` for orientation 0
    pub fn children(&self, orientation: Option<u8>) -> [Self; 4] {
        let mut children = [self.child(0), self.child(3), self.child(2), self.child(1)];
        if orientation == Some(0) {
            children.swap(1, 3);
        }
        children
    }

    /// Children of the `(face, level, i, j)` cell as `[bottom-left, bottom-right, top-left,
    /// top-right]` in i/j space
    pub fn children_ij(face: Face, level: u8, i: u32, j: u32) -> [Self; 4] {
        let (i, j, level) = (i << 1, j << 1, level + 1);
        [
            Self::from_face_ij(face, i, j, Some(level)),
            Self::from_face_ij(face, i + 1, j, Some(level)),
            Self::from_face_ij(face, i, j + 1, Some(level)),
            Self::from_face_ij(face, i + 1, j + 1, Some(level)),
        ]
    }

    /// First and last leaf ids covered by this cell
    pub fn range(&self) -> (Self, Self) {
        let lsb = self.lsb();
        (
            Self(self.0.wrapping_sub(lsb.wrapping_sub(1))),
            Self(self.0.wrapping_add(lsb.wrapping_sub(1))),
        )
    }

    pub fn contains(&self, other: &Self) -> bool {
        let (min, max) = self.range();
        *other >= min && *other <= max
    }

    pub fn intersects(&self, other: &Self) -> bool {
        let (min, max) = self.range();
        let (other_min, other_max) = other.range();
        other_min <= max && other_max >= min
    }

    // =========================================================================
    // TRAVERSAL
    // =========================================================================

    /// Next cell at the same level, wrapping from face 5 to face 0
    pub fn next(&self) -> Self {
        let n = self.0.wrapping_add(self.lsb() << 1);
        if n < K_WRAP_OFFSET {
            Self(n)
        } else {
            Self(n.wrapping_sub(K_WRAP_OFFSET))
        }
    }

    /// Previous cell at the same level, wrapping from face 0 to face 5
    pub fn prev(&self) -> Self {
        let p = self.0.wrapping_sub(self.lsb() << 1);
        if p < K_WRAP_OFFSET {
            Self(p)
        } else {
            Self(p.wrapping_add(K_WRAP_OFFSET))
        }
    }

    /// Edge neighbors at the same level: `[down, right, up, left]` in i/j space
    pub fn neighbors(&self) -> [Self; 4] {
        let level = self.level();
        let (face, i, j) = self.to_face_ij(None);
        Self::neighbors_ij(face, i, j, level)
    }

    /// Edge neighbors of the `level` cell containing leaf `(i, j)` on `face`
    pub fn neighbors_ij(face: Face, i: u32, j: u32, level: u8) -> [Self; 4] {
        let size = size_ij(level) as i64;
        let max = K_MAX_SIZE as i64;
        let (i, j) = (i as i64, j as i64);
        [
            Self::from_face_ij_same(face, i, j - size, j - size >= 0).parent(Some(level)),
            Self::from_face_ij_same(face, i + size, j, i + size < max).parent(Some(level)),
            Self::from_face_ij_same(face, i, j + size, j + size < max).parent(Some(level)),
            Self::from_face_ij_same(face, i - size, j, i - size >= 0).parent(Some(level)),
        ]
    }

    /// Leaf at `(i, j)`, reprojected onto the adjacent face when it falls off `face`
    pub fn from_face_ij_same(face: Face, i: i64, j: i64, same_face: bool) -> Self {
        if same_face {
            Self::from_face_ij(face, i as u32, j as u32, None)
        } else {
            Self::from_face_ij_wrap(face, i, j)
        }
    }

    /// Leaf at `(i, j)` beyond the edge of `face`, found on the face it wraps onto.
    ///
    /// Coordinates are clamped to a one-leaf halo around the face, taken through a linear
    /// `(u, v)` to xyz and projected back.
    pub fn from_face_ij_wrap(face: Face, i: i64, j: i64) -> Self {
        let max = K_MAX_SIZE as i64;
        let i = i.clamp(-1, max);
        let j = j.clamp(-1, max);

        let scale = 1.0 / K_MAX_SIZE as f64;
        let limit = 1.0 + f64::EPSILON;
        let u = (scale * (2.0 * (i - max / 2) as f64 + 1.0)).clamp(-limit, limit);
        let v = (scale * (2.0 * (j - max / 2) as f64 + 1.0)).clamp(-limit, limit);

        let (face, nu, nv) = xyz_to_face_uv(&face_uv_to_xyz(face, u, v));
        Self::from_face_ij(face, st_to_ij(0.5 * (nu + 1.0)), st_to_ij(0.5 * (nv + 1.0)), None)
    }

    /// Cells at `level` sharing the vertex of `parent(level)` closest to this cell.
    ///
    /// Returns 4 cells, or 3 when the vertex is a cube corner.
    pub fn vertex_neighbors(&self, level: Option<u8>) -> Vec<Self> {
        let level = level.unwrap_or_else(|| self.level());
        let (face, i, j) = self.to_face_ij(None);
        let (i, j) = (i as i64, j as i64);
        let max = K_MAX_SIZE as i64;

        let halfsize = size_ij(level.saturating_add(1)) as i64;
        let size = halfsize << 1;
        let (ioffset, isame) = if i & halfsize != 0 {
            (size, i + size < max)
        } else {
            (-size, i - size >= 0)
        };
        let (joffset, jsame) = if j & halfsize != 0 {
            (size, j + size < max)
        } else {
            (-size, j - size >= 0)
        };

        let mut neighbors = vec![
            self.parent(Some(level)),
            Self::from_face_ij_same(face, i + ioffset, j, isame).parent(Some(level)),
            Self::from_face_ij_same(face, i, j + joffset, jsame).parent(Some(level)),
        ];
        if isame || jsame {
            neighbors.push(
                Self::from_face_ij_same(face, i + ioffset, j + joffset, isame && jsame)
                    .parent(Some(level)),
            );
        }
        neighbors
    }
}

/// `f/ddd`: the face digit, then the child position at each level. Invalid ids print
/// `Invalid`.
impl fmt::Display for S2CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(f, "Invalid");
        }
        write!(f, "{}/", self.face())?;
        for level in 1..=self.level() {
            write!(f, "{}", self.child_position(level))?;
        }
        Ok(())
    }
}

impl FromStr for S2CellId {
    type Err = Error;

    fn from_str(value: &str) -> crate::Result<Self> {
        let invalid = || Error::InvalidCellId(value.to_string());

        let (face, path) = value.split_once('/').ok_or_else(invalid)?;
        let face: Face = face.parse().map_err(|_| invalid())?;
        if face >= K_NUM_FACES || path.len() > K_MAX_LEVEL as usize {
            return Err(invalid());
        }

        path.chars().try_fold(Self::from_face(face), |id, c| match c {
            '0'..='3' => Ok(id.child(c as u8 - b'0')),
            _ => Err(invalid()),
        })
    }
}
