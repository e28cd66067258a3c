//! The Web-Mercator projection.
//!
//! - [`coords`]: lon-lat to unit square, tile math, and pixel/meter conversions
//! - [`tile_id`]: packed `zoom/x/y` tile ids
//! - [`convert`]: flat features to unit-square vector features

pub mod convert;
pub mod coords;
pub mod tile_id;

pub use convert::{to_ll, to_unit_scale, to_vector, to_vector_geometry};
pub use coords::{lon_lat_to_tile, lon_lat_to_unit, unit_to_lon_lat, Crs, TileCoord, TileRange};
