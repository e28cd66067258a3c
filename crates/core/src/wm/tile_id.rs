//! 64-bit Web-Mercator tile ids.
//!
//! ```text
//! | zoom (6 bits) | x (29 bits) | y (29 bits) |
//! ```
//!
//! Children are always returned as `[bottom-left, bottom-right, top-left, top-right]` in
//! x/y order, matching the S2 child order used by the tiler.

const COORD_BITS: u64 = 29;
const COORD_MASK: u64 = (1 << COORD_BITS) - 1;

/// Deepest zoom the id layout can address
pub const MAX_ZOOM: u8 = 29;

/// Pack `zoom/x/y` into an id. Coordinates are masked to 29 bits.
pub fn to_id(zoom: u8, x: u32, y: u32) -> u64 {
    ((zoom as u64) << (2 * COORD_BITS)) | ((x as u64 & COORD_MASK) << COORD_BITS) | (y as u64 & COORD_MASK)
}

/// Unpack an id into `(zoom, x, y)`
pub fn from_id(id: u64) -> (u8, u32, u32) {
    let zoom = (id >> (2 * COORD_BITS)) as u8;
    let x = ((id >> COORD_BITS) & COORD_MASK) as u32;
    let y = (id & COORD_MASK) as u32;
    (zoom, x, y)
}

/// The four children `[bl, br, tl, tr]`
pub fn children(id: u64) -> [u64; 4] {
    let (zoom, x, y) = from_id(id);
    let (zoom, x, y) = (zoom + 1, x * 2, y * 2);
    [
        to_id(zoom, x, y),
        to_id(zoom, x + 1, y),
        to_id(zoom, x, y + 1),
        to_id(zoom, x + 1, y + 1),
    ]
}

/// Parent tile. The zoom-0 tile is its own parent.
pub fn parent(id: u64) -> u64 {
    let (zoom, x, y) = from_id(id);
    if zoom == 0 {
        return id;
    }
    to_id(zoom - 1, x / 2, y / 2)
}

/// `(zoom, x, y)`, first walking up to `level` when it is shallower than the tile
pub fn to_ij(id: u64, level: Option<u8>) -> (u8, u32, u32) {
    let (zoom, x, y) = from_id(id);
    match level {
        Some(level) if level < zoom => {
            let shift = zoom - level;
            (level, x >> shift, y >> shift)
        }
        _ => (zoom, x, y),
    }
}

/// True when `child_id` is `parent_id` or one of its descendants
pub fn contains(parent_id: u64, child_id: u64) -> bool {
    let (pz, px, py) = from_id(parent_id);
    let (cz, cx, cy) = from_id(child_id);
    if pz > cz {
        return false;
    }
    let diff = cz - pz;
    px == cx >> diff && py == cy >> diff
}

pub fn is_face(id: u64) -> bool {
    level(id) == 0
}

pub fn level(id: u64) -> u8 {
    from_id(id).0
}

/// Edge neighbors of `zoom/x/y` as `(zoom, x, y)`.
///
/// Out-of-range x neighbors are kept when `include_out_of_bounds` is set (for
/// antimeridian wrapping); y neighbors never leave the world.
pub fn neighbors_xy(zoom: u8, x: i64, y: i64, include_out_of_bounds: bool) -> Vec<(u8, i64, i64)> {
    let size = 1i64 << zoom;
    let x_out_of_bounds = x < 0 || x >= size;
    let mut neighbors = Vec::with_capacity(4);
    if x - 1 >= 0 || include_out_of_bounds {
        neighbors.push((zoom, x - 1, y));
    }
    if x + 1 < size || include_out_of_bounds {
        neighbors.push((zoom, x + 1, y));
    }
    if !x_out_of_bounds && y - 1 >= 0 {
        neighbors.push((zoom, x, y - 1));
    }
    if !x_out_of_bounds && y + 1 < size {
        neighbors.push((zoom, x, y + 1));
    }
    neighbors
}

/// True when x or y lies past the edge of the world at the id's zoom
pub fn is_out_of_bounds(id: u64) -> bool {
    let (zoom, x, y) = from_id(id);
    let size = 1u64 << zoom;
    x as u64 >= size || y as u64 >= size
}

/// Same tile with x and y wrapped back into the world
pub fn wrapped(id: u64) -> u64 {
    let (zoom, x, y) = from_id(id);
    let size = 1u64 << zoom;
    to_id(zoom, (x as u64 % size) as u32, (y as u64 % size) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        assert_eq!(to_id(0, 0, 0), 0);
        assert_eq!(to_id(1, 0, 0), 1 << 58);
        assert_eq!(from_id(to_id(12, 1234, 3210)), (12, 1234, 3210));
    }

    #[test]
    fn test_children_and_parent() {
        assert_eq!(
            children(0),
            [
                288230376151711744,
                288230376688582656,
                288230376151711745,
                288230376688582657
            ]
        );
        for child in children(to_id(3, 5, 2)) {
            assert_eq!(parent(child), to_id(3, 5, 2));
        }
        assert_eq!(parent(1 << 58), 0);
        assert_eq!(parent(0), 0);
    }

    #[test]
    fn test_contains() {
        let root = to_id(2, 1, 3);
        assert!(contains(root, root));
        assert!(contains(root, to_id(4, 5, 13)));
        assert!(!contains(root, to_id(4, 8, 13)));
        assert!(!contains(to_id(4, 5, 13), root));
    }

    #[test]
    fn test_to_ij_level() {
        let id = to_id(5, 17, 9);
        assert_eq!(to_ij(id, None), (5, 17, 9));
        assert_eq!(to_ij(id, Some(3)), (3, 4, 2));
        assert_eq!(to_ij(id, Some(7)), (5, 17, 9));
        assert!(is_face(0));
        assert!(!is_face(id));
        assert_eq!(level(id), 5);
    }

    #[test]
    fn test_neighbors_xy() {
        assert!(neighbors_xy(0, 0, 0, false).is_empty());
        assert_eq!(neighbors_xy(0, 0, 0, true), vec![(0, -1, 0), (0, 1, 0)]);
        assert_eq!(
            neighbors_xy(2, 1, 1, false),
            vec![(2, 0, 1), (2, 2, 1), (2, 1, 0), (2, 1, 2)]
        );
    }

    #[test]
    fn test_out_of_bounds_and_wrapped() {
        let id = to_id(1, 3, 1);
        assert!(is_out_of_bounds(id));
        assert_eq!(wrapped(id), to_id(1, 1, 1));
        assert!(!is_out_of_bounds(to_id(1, 1, 1)));
    }
}
