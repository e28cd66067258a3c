//! Core library for projecting, clipping, simplifying and lazily tiling vector geometry
//! on either the Web-Mercator plane ("WM") or the S2 cube-sphere ("S2").
//!
//! The pieces stack as follows:
//!
//! - [`s2`] and [`wm`] hold the coordinate transforms and the 64-bit tile/cell id algebra
//!   for each projection; [`id`] dispatches over both.
//! - [`convert`] turns GeoJSON-like input into vector features in the target projection.
//! - [`clip`] and [`simplify`] cut and reduce geometry to a tile window.
//! - [`tile`] ties everything together in a [`TileStore`] that splits tiles on demand.
//!
//! # Examples
//!
//! ```
//! use s2_tiles_core::{JsonCollection, TileStore, TileStoreOptions};
//!
//! let data: JsonCollection = serde_json::from_str(
//!     r#"{"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[0,0]}}"#,
//! )
//! .unwrap();
//!
//! let mut store = TileStore::new(data, TileStoreOptions::default()).unwrap();
//! let tile = store.get_tile(0).expect("root tile");
//! assert!(!tile.is_empty());
//! ```

use thiserror::Error;

pub mod bbox;
pub mod clip;
pub mod convert;
pub mod feature;
pub mod geometry;
pub mod id;
pub mod s2;
pub mod simplify;
pub mod tile;
pub mod wm;

pub use bbox::{Axis, BBox};
pub use convert::convert;
pub use feature::{Feature, JsonCollection, S2Feature, TileFeature, VectorFeature};
pub use geometry::{Geometry, VectorGeometry, VectorPoint};
pub use id::Projection;
pub use s2::S2CellId;
pub use tile::{Layer, Tile, TileStore, TileStoreOptions};

/// Errors that can occur while converting or tiling geometry
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid geometry type: {0}")]
    InvalidGeometryType(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid cell id: {0}")]
    InvalidCellId(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// One of the six cube faces (always 0 for Web-Mercator data)
pub type Face = u8;
