//! The S2 cube-sphere projection.
//!
//! - [`coords`]: the lon-lat / xyz / face-uv / face-st / face-ij transform chain
//! - [`point`]: [`S2Point`], a direction vector on the unit sphere
//! - [`cellid`]: [`S2CellId`], the 64-bit Hilbert-curve cell identifier
//! - [`convert`]: lon-lat geometry onto cube faces and back

pub mod cellid;
pub mod convert;
pub mod coords;
pub mod point;

pub use cellid::S2CellId;
pub use point::S2Point;
