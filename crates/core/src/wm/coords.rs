//! Web-Mercator unit-square projection and tile math.
//!
//! The unit square puts longitude -180..180 on x 0..1 and the Mercator latitude range on
//! y 0..1 with north at y = 0. A tile `z/x/y` covers `[x, x + 1] / 2^z` by
//! `[y, y + 1] / 2^z` of that square.
//!
//! The pixel helpers work in global pixels at a zoom (`tile_size * 2^zoom` wide, y down) and
//! the meter helpers in EPSG:900913.

use std::f64::consts::PI;

use super::tile_id;
use crate::bbox::BBox;

/// Largest |sin(lat)| fed to the Mercator log, keeps the poles finite
const MAX_SIN: f64 = 0.999_999_999_999;

/// Project lon-lat degrees onto the unit square
///
/// # Arguments
///
/// * `lon` - Longitude in degrees
/// * `lat` - Latitude in degrees, anything beyond ~85.0511 lands on the square's edge
///
/// # Returns
///
/// `(x, y)` with x in `[0, 1]` for in-range longitudes and y clamped to `[0, 1]`
pub fn lon_lat_to_unit(lon: f64, lat: f64) -> (f64, f64) {
    let sin = lat.to_radians().sin().clamp(-MAX_SIN, MAX_SIN);
    let y = 0.5 - 0.25 * ((1.0 + sin) / (1.0 - sin)).ln() / PI;
    (lon / 360.0 + 0.5, y.clamp(0.0, 1.0))
}

/// Inverse of [`lon_lat_to_unit`]
pub fn unit_to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x - 0.5) * 360.0;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
    (lon, lat)
}

/// Tile coordinates: x, y, and zoom level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Tile for a packed id
    pub fn from_id(id: u64) -> Self {
        let (z, x, y) = tile_id::from_id(id);
        Self { x, y, z }
    }

    /// Packed 64-bit id
    pub fn id(&self) -> u64 {
        tile_id::to_id(self.z, self.x, self.y)
    }

    /// Extent of this tile in the unit square
    pub fn unit_bounds(&self) -> BBox {
        let n = 2_f64.powi(self.z as i32);
        BBox::new(
            self.x as f64 / n,
            self.y as f64 / n,
            (self.x as f64 + 1.0) / n,
            (self.y as f64 + 1.0) / n,
        )
    }

    /// Extent of this tile in lon-lat degrees
    pub fn bounds(&self) -> BBox {
        let unit = self.unit_bounds();
        let (lon_min, lat_max) = unit_to_lon_lat(unit.left, unit.bottom);
        let (lon_max, lat_min) = unit_to_lon_lat(unit.right, unit.top);
        BBox::new(lon_min, lat_min, lon_max, lat_max)
    }

    /// Extent of this tile in global pixels, y down
    pub fn px_bounds(&self, tile_size: f64) -> BBox {
        let left = self.x as f64 * tile_size;
        let top = self.y as f64 * tile_size;
        BBox::new(left, top, left + tile_size, top + tile_size)
    }
}

/// Tile containing a lon-lat at `zoom`, clamped to the world
///
/// # Arguments
///
/// * `lon` - Longitude in degrees
/// * `lat` - Latitude in degrees
/// * `zoom` - Zoom level (0-29)
pub fn lon_lat_to_tile(lon: f64, lat: f64, zoom: u8) -> TileCoord {
    let n = 2_f64.powi(zoom as i32);
    let (ux, uy) = lon_lat_to_unit(lon, lat);
    let max = n - 1.0;
    let x = (ux * n).floor().clamp(0.0, max) as u32;
    let y = (uy * n).floor().clamp(0.0, max) as u32;
    TileCoord::new(x, y, zoom)
}

/// All tiles at `zoom` that intersect a lon-lat box
///
/// # Arguments
///
/// * `bbox` - Lon-lat box
/// * `zoom` - Zoom level
///
/// # Returns
///
/// Iterator of TileCoord, row by row from the north-west corner
pub fn tiles_for_bbox(bbox: &BBox, zoom: u8) -> impl Iterator<Item = TileCoord> {
    let min_tile = lon_lat_to_tile(bbox.left, bbox.top, zoom);
    let max_tile = lon_lat_to_tile(bbox.right, bbox.bottom, zoom);

    (min_tile.y..=max_tile.y)
        .flat_map(move |y| (min_tile.x..=max_tile.x).map(move |x| TileCoord::new(x, y, zoom)))
}

// ============================================================================
// Pixel and meter space
// ============================================================================

/// Default tile edge in pixels for the pixel helpers
pub const DEFAULT_TILE_SIZE: f64 = 512.0;

/// Mean Earth radius in meters
pub const EARTH_RADIUS: f64 = 6_371_008.8;

/// Mean Earth circumference in meters
pub const EARTH_CIRCUMFERENCE: f64 = 2.0 * PI * EARTH_RADIUS;

/// Equatorial radius used by EPSG:900913
pub const EARTH_RADIUS_EQUATORIAL: f64 = 6_378_137.0;

/// Half the width of the EPSG:900913 world in meters
pub const MAX_EXTENT: f64 = 20_037_508.342_789_244;

/// Coordinate system of a box handed to the bbox helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// Lon-lat degrees (EPSG:4326)
    Wgs84,
    /// Spherical Mercator meters (EPSG:900913)
    WebMercator,
}

/// Inclusive tile column and row range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

/// `(px per degree, px per radian, half world, world)` at `zoom`
fn zoom_size(zoom: u8, tile_size: f64) -> (f64, f64, f64, f64) {
    let size = tile_size * 2_f64.powi(zoom as i32);
    (size / 360.0, size / (2.0 * PI), size / 2.0, size)
}

/// Project lon-lat onto global pixel space at `zoom`, y down
///
/// # Arguments
///
/// * `anti_meridian` - Let x run over a second world width instead of capping at one
/// * `tile_size` - Tile edge in pixels
pub fn ll_to_px(lon: f64, lat: f64, zoom: u8, anti_meridian: bool, tile_size: f64) -> (f64, f64) {
    let (per_degree, per_radian, half, size) = zoom_size(zoom, tile_size);
    let expansion = if anti_meridian { 2.0 } else { 1.0 };
    let sin = lat.to_radians().sin().clamp(-MAX_SIN, MAX_SIN);
    let x = half + lon * per_degree;
    let y = half - 0.5 * ((1.0 + sin) / (1.0 - sin)).ln() * per_radian;
    (x.min(size * expansion), y.min(size))
}

/// Inverse of [`ll_to_px`]
pub fn px_to_ll(x: f64, y: f64, zoom: u8, tile_size: f64) -> (f64, f64) {
    let (per_degree, per_radian, half, _) = zoom_size(zoom, tile_size);
    let g = (y - half) / -per_radian;
    let lon = (x - half) / per_degree;
    let lat = (2.0 * g.exp().atan() - 0.5 * PI).to_degrees();
    (lon, lat)
}

/// Project lon-lat to EPSG:900913 meters, clamped to the world extent
pub fn ll_to_merc(lon: f64, lat: f64) -> (f64, f64) {
    let x = EARTH_RADIUS_EQUATORIAL * lon.to_radians();
    let y = EARTH_RADIUS_EQUATORIAL * (PI * 0.25 + (0.5 * lat).to_radians()).tan().ln();
    (
        x.clamp(-MAX_EXTENT, MAX_EXTENT),
        y.clamp(-MAX_EXTENT, MAX_EXTENT),
    )
}

/// Inverse of [`ll_to_merc`]
pub fn merc_to_ll(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS_EQUATORIAL).to_degrees();
    let lat = (0.5 * PI - 2.0 * (-y / EARTH_RADIUS_EQUATORIAL).exp().atan()).to_degrees();
    (lon, lat)
}

/// Tile column and row holding a global pixel. Negative pixels land on 0.
pub fn px_to_tile(x: f64, y: f64, tile_size: f64) -> (u32, u32) {
    (
        (x / tile_size).floor().max(0.0) as u32,
        (y / tile_size).floor().max(0.0) as u32,
    )
}

/// Position of a lon-lat inside `tile`, in tile widths from its top-left corner
pub fn ll_to_tile_px(lon: f64, lat: f64, tile: TileCoord, tile_size: f64) -> (f64, f64) {
    let (x, y) = ll_to_px(lon, lat, tile.z, false, tile_size);
    (
        (x - tile.x as f64 * tile_size) / tile_size,
        (y - tile.y as f64 * tile_size) / tile_size,
    )
}

/// Reproject a `[w, s, e, n]` box into `to`. The input is taken to be in the other system.
pub fn convert_bbox(bbox: &BBox, to: Crs) -> BBox {
    let project: fn(f64, f64) -> (f64, f64) = match to {
        Crs::Wgs84 => merc_to_ll,
        Crs::WebMercator => ll_to_merc,
    };
    let (left, bottom) = project(bbox.left, bbox.bottom);
    let (right, top) = project(bbox.right, bbox.top);
    BBox::new(left, bottom, right, top)
}

/// Extent of tile `zoom/x/y` as a `[w, s, e, n]` box in `crs`
///
/// # Arguments
///
/// * `tms` - Rows count from the south (TMS) instead of the north (XYZ)
pub fn xyz_to_bbox(x: u32, y: u32, zoom: u8, tms: bool, crs: Crs, tile_size: f64) -> BBox {
    let (x, mut y) = (x as f64, y as f64);
    if tms {
        y = 2_f64.powi(zoom as i32) - 1.0 - y;
    }
    let (west, south) = px_to_ll(x * tile_size, (y + 1.0) * tile_size, zoom, tile_size);
    let (east, north) = px_to_ll((x + 1.0) * tile_size, y * tile_size, zoom, tile_size);

    let bbox = BBox::new(west, south, east, north);
    match crs {
        Crs::Wgs84 => bbox,
        Crs::WebMercator => convert_bbox(&bbox, Crs::WebMercator),
    }
}

/// Tiles at `zoom` covered by a `[w, s, e, n]` box given in `crs`
///
/// # Arguments
///
/// * `tms` - Report rows counting from the south (TMS) instead of the north (XYZ)
pub fn bbox_to_xyz_bounds(bbox: &BBox, zoom: u8, tms: bool, crs: Crs, tile_size: f64) -> TileRange {
    let bbox = match crs {
        Crs::Wgs84 => *bbox,
        Crs::WebMercator => convert_bbox(bbox, Crs::Wgs84),
    };
    let (bl_x, bl_y) = ll_to_px(bbox.left, bbox.bottom, zoom, false, tile_size);
    let (tr_x, tr_y) = ll_to_px(bbox.right, bbox.top, zoom, false, tile_size);

    // row 0 is the north edge, so the top-right corner gives min_y
    let xs = [(bl_x / tile_size).floor(), ((tr_x - 1.0) / tile_size).floor()];
    let ys = [(tr_y / tile_size).floor(), ((bl_y - 1.0) / tile_size).floor()];
    let cell = |v: f64| v.max(0.0) as u32;

    let mut range = TileRange {
        min_x: cell(xs[0].min(xs[1])),
        min_y: cell(ys[0].min(ys[1])),
        max_x: cell(xs[0].max(xs[1])),
        max_y: cell(ys[0].max(ys[1])),
    };
    if tms {
        let last = ((1_u64 << zoom.min(32)) - 1) as u32;
        (range.min_y, range.max_y) = (last - range.max_y, last - range.min_y);
    }
    range
}

/// Earth circumference along a parallel, in meters
pub fn circumference_at_latitude(lat: f64) -> f64 {
    EARTH_CIRCUMFERENCE * lat.to_radians().cos()
}

/// Longitude to the unit-square x
pub fn lng_to_mercator_x(lng: f64) -> f64 {
    (180.0 + lng) / 360.0
}

/// Latitude to the unit-square y, unclamped
pub fn lat_to_mercator_y(lat: f64) -> f64 {
    (180.0 - (180.0 / PI) * (PI / 4.0 + lat * PI / 360.0).tan().ln()) / 360.0
}

/// Altitude in meters to unit-square lengths at `lat`
pub fn altitude_to_mercator_z(altitude: f64, lat: f64) -> f64 {
    altitude / circumference_at_latitude(lat)
}

pub fn lng_from_mercator_x(x: f64) -> f64 {
    x * 360.0 - 180.0
}

pub fn lat_from_mercator_y(y: f64) -> f64 {
    let y2 = 180.0 - y * 360.0;
    (360.0 / PI) * (y2 * PI / 180.0).exp().atan() - 90.0
}

/// Unit-square length `z` at unit-square row `y` back to meters
pub fn altitude_from_mercator_z(z: f64, y: f64) -> f64 {
    z * circumference_at_latitude(lat_from_mercator_y(y))
}

/// Mercator scale factor at `lat`, 1 at the equator and growing poleward
pub fn mercator_lat_scale(lat: f64) -> f64 {
    1.0 / lat.to_radians().cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_scale() {
        assert_eq!(lon_lat_to_unit(0.0, 0.0), (0.5, 0.5));
        let (x, y) = lon_lat_to_unit(45.0, 45.0);
        assert_eq!(x, 0.625);
        assert!((y - 0.35972503691520497).abs() < 1e-15);

        // poles clamp instead of going infinite
        let (_, north) = lon_lat_to_unit(0.0, 90.0);
        let (_, south) = lon_lat_to_unit(0.0, -90.0);
        assert_eq!(north, 0.0);
        assert_eq!(south, 1.0);
    }

    #[test]
    fn test_unit_round_trip() {
        for &(lon, lat) in &[(0.0, 0.0), (45.0, 45.0), (-120.0, -60.5), (179.0, 84.0)] {
            let (x, y) = lon_lat_to_unit(lon, lat);
            let (lon2, lat2) = unit_to_lon_lat(x, y);
            assert!((lon - lon2).abs() < 1e-9);
            assert!((lat - lat2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_lon_lat_to_tile_origin() {
        // Null island at zoom 0
        assert_eq!(lon_lat_to_tile(0.0, 0.0, 0), TileCoord::new(0, 0, 0));
    }

    #[test]
    fn test_lon_lat_to_tile_zoom_1() {
        let tile = lon_lat_to_tile(0.0, 0.0, 1);
        assert_eq!((tile.x, tile.y, tile.z), (1, 1, 1));

        // north-west quadrant
        assert_eq!(lon_lat_to_tile(-90.0, 45.0, 1), TileCoord::new(0, 0, 1));
        // north-east quadrant
        assert_eq!(lon_lat_to_tile(90.0, 45.0, 1), TileCoord::new(1, 0, 1));
        // the antimeridian and the poles stay inside the world
        assert_eq!(lon_lat_to_tile(180.0, -90.0, 1), TileCoord::new(1, 1, 1));
    }

    #[test]
    fn test_tile_bounds() {
        let bounds = TileCoord::new(0, 0, 0).bounds();
        assert!((bounds.left + 180.0).abs() < 1e-9);
        assert!((bounds.right - 180.0).abs() < 1e-9);
        assert!(bounds.bottom < -85.0);
        assert!(bounds.top > 85.0);

        assert_eq!(TileCoord::new(1, 0, 1).unit_bounds(), BBox::new(0.5, 0.0, 1.0, 0.5));
    }

    #[test]
    fn test_tiles_for_bbox() {
        let tiles: Vec<_> = tiles_for_bbox(&BBox::new(-1.0, -1.0, 1.0, 1.0), 10).collect();
        // tiles are ~0.35 degrees wide at zoom 10
        assert_eq!(tiles.len(), 36);
        assert!(tiles.iter().all(|t| t.z == 10));

        let tiles: Vec<_> = tiles_for_bbox(&BBox::new(-10.0, -10.0, 10.0, 10.0), 5).collect();
        let first = tiles.first().unwrap();
        let last = tiles.last().unwrap();
        assert!(first.x < last.x);
        assert!(first.y < last.y);
    }

    #[test]
    fn test_tile_coord_round_trip() {
        for zoom in 0..=14 {
            let max_coord = 2_u32.pow(zoom as u32) - 1;
            let tile = TileCoord::new(max_coord.min(100), max_coord.min(200), zoom);
            let bounds = tile.bounds();
            let center_lon = (bounds.left + bounds.right) / 2.0;
            let center_lat = (bounds.bottom + bounds.top) / 2.0;

            assert_eq!(
                lon_lat_to_tile(center_lon, center_lat, zoom),
                tile,
                "Round-trip failed at zoom {}",
                zoom
            );
            assert_eq!(TileCoord::from_id(tile.id()), tile);
        }
    }

    fn assert_close(actual: (f64, f64), expected: (f64, f64), eps: f64) {
        assert!(
            (actual.0 - expected.0).abs() < eps && (actual.1 - expected.1).abs() < eps,
            "{:?} != {:?}",
            actual,
            expected
        );
    }

    fn assert_bbox_close(actual: BBox, expected: BBox, eps: f64) {
        assert_close((actual.left, actual.bottom), (expected.left, expected.bottom), eps);
        assert_close((actual.right, actual.top), (expected.right, expected.top), eps);
    }

    #[test]
    fn test_ll_to_px() {
        assert_eq!(ll_to_px(0.0, 0.0, 0, false, DEFAULT_TILE_SIZE), (256.0, 256.0));
        assert_close(
            ll_to_px(45.0, 45.0, 2, false, DEFAULT_TILE_SIZE),
            (1280.0, 736.7168756023398),
            1e-9,
        );

        // x caps at one world unless the antimeridian is allowed
        let (x, _) = ll_to_px(270.0, 0.0, 0, false, DEFAULT_TILE_SIZE);
        assert_eq!(x, 512.0);
        let (x, _) = ll_to_px(270.0, 0.0, 0, true, DEFAULT_TILE_SIZE);
        assert_eq!(x, 640.0);

        let (x, y) = ll_to_px(45.0, 45.0, 2, false, DEFAULT_TILE_SIZE);
        assert_close(px_to_ll(x, y, 2, DEFAULT_TILE_SIZE), (45.0, 45.0), 1e-9);
    }

    #[test]
    fn test_px_matches_unit_square() {
        let (ux, uy) = lon_lat_to_unit(-74.006, 40.7128);
        let (px, py) = ll_to_px(-74.006, 40.7128, 3, false, 256.0);
        assert_close((px / 2048.0, py / 2048.0), (ux, uy), 1e-12);
    }

    #[test]
    fn test_merc_meters() {
        assert_close(ll_to_merc(0.0, 0.0), (0.0, 0.0), 1e-6);
        assert_close(
            ll_to_merc(45.0, 45.0),
            (5009377.085697311, 5621521.486192066),
            1e-6,
        );
        // the poles clamp to the world extent
        assert_close(ll_to_merc(180.0, 90.0), (MAX_EXTENT, MAX_EXTENT), 1e-6);
        assert_close(merc_to_ll(MAX_EXTENT, MAX_EXTENT), (180.0, 85.0511287798), 1e-9);

        let (x, y) = ll_to_merc(-120.0, -33.5);
        assert_close(merc_to_ll(x, y), (-120.0, -33.5), 1e-9);
    }

    #[test]
    fn test_px_to_tile() {
        assert_eq!(px_to_tile(600.0, 1100.0, DEFAULT_TILE_SIZE), (1, 2));
        assert_eq!(px_to_tile(511.9, 0.0, DEFAULT_TILE_SIZE), (0, 0));
        assert_eq!(px_to_tile(-5.0, 10.0, DEFAULT_TILE_SIZE), (0, 0));
    }

    #[test]
    fn test_tile_px_bounds() {
        assert_eq!(
            TileCoord::new(3, 5, 4).px_bounds(DEFAULT_TILE_SIZE),
            BBox::new(1536.0, 2560.0, 2048.0, 3072.0)
        );
        assert_eq!(
            TileCoord::new(0, 0, 0).px_bounds(256.0),
            BBox::new(0.0, 0.0, 256.0, 256.0)
        );
    }

    #[test]
    fn test_ll_to_tile_px() {
        let tile = lon_lat_to_tile(-74.006, 40.7128, 4);
        assert_eq!(tile, TileCoord::new(4, 6, 4));
        assert_close(
            ll_to_tile_px(-74.006, 40.7128, tile, DEFAULT_TILE_SIZE),
            (0.7108444444444444, 0.015692772128139),
            1e-9,
        );

        // null island is the top-left corner of 1/1/1 and the bottom-right of 1/0/0
        assert_close(
            ll_to_tile_px(0.0, 0.0, TileCoord::new(1, 1, 1), DEFAULT_TILE_SIZE),
            (0.0, 0.0),
            1e-12,
        );
        assert_close(
            ll_to_tile_px(0.0, 0.0, TileCoord::new(0, 0, 1), DEFAULT_TILE_SIZE),
            (1.0, 1.0),
            1e-12,
        );
    }

    #[test]
    fn test_convert_bbox() {
        let lon_lat = BBox::new(1.0, 1.0, 2.0, 2.0);
        let meters = convert_bbox(&lon_lat, Crs::WebMercator);
        assert_bbox_close(
            meters,
            BBox::new(
                111319.49079327357,
                111325.14286638486,
                222638.98158654713,
                222684.20850554455,
            ),
            1e-6,
        );
        assert_bbox_close(convert_bbox(&meters, Crs::Wgs84), lon_lat, 1e-9);
    }

    #[test]
    fn test_xyz_to_bbox() {
        let max_lat = 85.0511287798;

        // XYZ row 0 at zoom 1 is the northern half
        let north_east = xyz_to_bbox(1, 0, 1, false, Crs::Wgs84, DEFAULT_TILE_SIZE);
        assert_bbox_close(north_east, BBox::new(0.0, 0.0, 180.0, max_lat), 1e-9);

        // TMS counts rows from the south
        let tms = xyz_to_bbox(1, 1, 1, true, Crs::Wgs84, DEFAULT_TILE_SIZE);
        assert_bbox_close(tms, north_east, 1e-12);

        let world = xyz_to_bbox(0, 0, 0, true, Crs::WebMercator, DEFAULT_TILE_SIZE);
        assert_bbox_close(
            world,
            BBox::new(-MAX_EXTENT, -MAX_EXTENT, MAX_EXTENT, MAX_EXTENT),
            1e-3,
        );
    }

    #[test]
    fn test_bbox_to_xyz_bounds() {
        let bbox = BBox::new(1.0, 1.0, 2.0, 2.0);
        let xyz = bbox_to_xyz_bounds(&bbox, 2, false, Crs::Wgs84, DEFAULT_TILE_SIZE);
        assert_eq!(
            xyz,
            TileRange {
                min_x: 2,
                min_y: 1,
                max_x: 2,
                max_y: 1
            }
        );

        let tms = bbox_to_xyz_bounds(&bbox, 2, true, Crs::Wgs84, DEFAULT_TILE_SIZE);
        assert_eq!((tms.min_y, tms.max_y), (2, 2));

        // the same box in meters lands on the same tiles
        let meters = convert_bbox(&bbox, Crs::WebMercator);
        assert_eq!(
            bbox_to_xyz_bounds(&meters, 2, false, Crs::WebMercator, DEFAULT_TILE_SIZE),
            xyz
        );

        let world = BBox::new(-180.0, -85.0, 180.0, 85.0);
        assert_eq!(
            bbox_to_xyz_bounds(&world, 1, false, Crs::Wgs84, DEFAULT_TILE_SIZE),
            TileRange {
                min_x: 0,
                min_y: 0,
                max_x: 1,
                max_y: 1
            }
        );
    }

    #[test]
    fn test_mercator_unit_helpers() {
        assert_eq!(lng_to_mercator_x(0.0), 0.5);
        assert_eq!(lng_from_mercator_x(0.625), 45.0);
        assert_eq!(lat_to_mercator_y(0.0), 0.5);

        let y = lat_to_mercator_y(45.0);
        assert!((y - lon_lat_to_unit(45.0, 45.0).1).abs() < 1e-12);
        assert!((lat_from_mercator_y(y) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_altitude_and_scale() {
        assert!((mercator_lat_scale(0.0) - 1.0).abs() < 1e-15);
        assert!((mercator_lat_scale(60.0) - 2.0).abs() < 1e-9);

        assert!((altitude_to_mercator_z(EARTH_CIRCUMFERENCE, 0.0) - 1.0).abs() < 1e-12);
        let z = altitude_to_mercator_z(1000.0, 45.0);
        assert!((altitude_from_mercator_z(z, lat_to_mercator_y(45.0)) - 1000.0).abs() < 1e-6);
    }
}
