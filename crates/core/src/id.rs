//! Id operations dispatched over the two supported projections.
//!
//! Tiles are addressed by a bare `u64` everywhere in the store; the [`Projection`] decides
//! whether that is an [`S2CellId`] or a packed Web-Mercator `zoom/x/y` id.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::s2::S2CellId;
use crate::wm::tile_id;
use crate::{Error, Face};

/// Tiling projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Projection {
    /// Web-Mercator, a single root tile
    #[serde(rename = "WM", alias = "wm")]
    WebMercator,
    /// S2 cube-sphere, six root faces
    #[serde(rename = "S2", alias = "s2")]
    S2,
}

impl Projection {
    /// Number of root tiles
    pub fn num_faces(&self) -> u8 {
        match self {
            Projection::WebMercator => 1,
            Projection::S2 => 6,
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::WebMercator => write!(f, "WM"),
            Projection::S2 => write!(f, "S2"),
        }
    }
}

impl FromStr for Projection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WM" => Ok(Projection::WebMercator),
            "S2" => Ok(Projection::S2),
            _ => Err(Error::InvalidConfig(format!("unknown projection: {}", s))),
        }
    }
}

/// Decode an id into `(face, zoom, i, j)`. Web-Mercator ids always report face 0.
pub fn from_id(projection: Projection, id: u64) -> (Face, u8, u32, u32) {
    match projection {
        Projection::S2 => {
            let cell = S2CellId::new(id);
            let zoom = cell.level();
            let (face, i, j) = cell.to_face_ij(Some(zoom));
            (face, zoom, i, j)
        }
        Projection::WebMercator => {
            let (zoom, x, y) = tile_id::from_id(id);
            (0, zoom, x, y)
        }
    }
}

/// Parent id. The Web-Mercator root is its own parent.
pub fn parent(projection: Projection, id: u64) -> u64 {
    match projection {
        Projection::S2 => S2CellId::new(id).parent(None).id(),
        Projection::WebMercator => tile_id::parent(id),
    }
}

/// Children of `(face, zoom, i, j)` as `[bl, br, tl, tr]`
pub fn children_ij(projection: Projection, face: Face, zoom: u8, i: u32, j: u32) -> [u64; 4] {
    match projection {
        Projection::S2 => S2CellId::children_ij(face, zoom, i, j).map(|cell| cell.id()),
        Projection::WebMercator => tile_id::children(tile_id::to_id(zoom, i, j)),
    }
}

pub fn is_face(projection: Projection, id: u64) -> bool {
    match projection {
        Projection::S2 => S2CellId::new(id).is_face(),
        Projection::WebMercator => tile_id::is_face(id),
    }
}

pub fn face(projection: Projection, id: u64) -> Face {
    match projection {
        Projection::S2 => S2CellId::new(id).face(),
        Projection::WebMercator => 0,
    }
}

/// Root id for `face`
pub fn from_face(projection: Projection, face: Face) -> u64 {
    match projection {
        Projection::S2 => S2CellId::from_face(face).id(),
        Projection::WebMercator => 0,
    }
}

/// `(face or zoom, i, j)`.
///
/// S2 ids report their face and, without a level, leaf-resolution coordinates. Web-Mercator
/// ids report their zoom, walked up to `level` when it is shallower.
pub fn to_ij(projection: Projection, id: u64, level: Option<u8>) -> (u8, u32, u32) {
    match projection {
        Projection::S2 => S2CellId::new(id).to_face_ij(level),
        Projection::WebMercator => tile_id::to_ij(id, level),
    }
}

pub fn level(projection: Projection, id: u64) -> u8 {
    match projection {
        Projection::S2 => S2CellId::new(id).level(),
        Projection::WebMercator => tile_id::level(id),
    }
}

/// True when `child_id` is `parent_id` or lies inside it
pub fn contains(projection: Projection, parent_id: u64, child_id: u64) -> bool {
    match projection {
        Projection::S2 => S2CellId::new(parent_id).contains(&S2CellId::new(child_id)),
        Projection::WebMercator => tile_id::contains(parent_id, child_id),
    }
}
