//! Lazily split tile quadtree.
//!
//! A [`TileStore`] converts its input once, files every feature under the root tile of its
//! face, and pre-splits down to `index_maxzoom`. Deeper tiles are cut on demand by
//! [`TileStore::get_tile`], starting from the closest tile already materialized.
//!
//! # Tile Lifecycle
//!
//! Features in a tile stay in projection space (unit square or face `(s, t)`) until the tile
//! is split. Once its children exist the tile is [transformed](Tile::transform): simplified
//! for its zoom and moved into tile-local coordinates. A transformed tile is never split
//! again.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::clip::{self, DEFAULT_BUFFER};
use crate::convert::convert;
use crate::feature::{JsonCollection, TileFeature};
use crate::id::{self, Projection};
use crate::s2::S2CellId;
use crate::simplify::simplify;
use crate::{Error, Face, Result};

/// Default simplification tolerance in tile pixels
pub const DEFAULT_TOLERANCE: f64 = 3.0;

/// Default deepest zoom
pub const DEFAULT_MAXZOOM: u8 = 20;

/// Default depth of the up-front split
pub const DEFAULT_INDEX_MAXZOOM: u8 = 4;

/// Deepest zoom a store can be built for or queried at
pub const MAX_ZOOM_LIMIT: u8 = 20;

/// Layer name used when neither the feature nor the caller names one
pub const DEFAULT_LAYER: &str = "default";

/// A named group of features within a tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub features: Vec<TileFeature>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: Vec::new(),
        }
    }
}

/// One node of the quadtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: u64,
    pub projection: Projection,
    pub layers: BTreeMap<String, Layer>,
    pub transformed: bool,
}

impl Tile {
    pub fn new(id: u64, projection: Projection) -> Self {
        Self {
            id,
            projection,
            layers: BTreeMap::new(),
            transformed: false,
        }
    }

    /// Total number of features across all layers
    pub fn len(&self) -> usize {
        self.layers.values().map(|layer| layer.features.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.values().all(|layer| layer.features.is_empty())
    }

    /// File a feature under a layer.
    ///
    /// The layer is taken from the feature's `metadata.layer` string when present, then from
    /// `layer`, then falls back to `"default"`.
    pub fn add_feature(&mut self, feature: TileFeature, layer: Option<&str>) {
        let name = feature
            .metadata()
            .and_then(|metadata| metadata.get("layer"))
            .and_then(|value| value.as_str())
            .or(layer)
            .unwrap_or(DEFAULT_LAYER)
            .to_string();
        self.layer_mut(&name).features.push(feature);
    }

    pub(crate) fn layer_mut(&mut self, name: &str) -> &mut Layer {
        self.layers
            .entry(name.to_string())
            .or_insert_with(|| Layer::new(name))
    }

    /// Simplify every feature for this tile's zoom, then move it into tile-local coordinates.
    ///
    /// Runs once. Later calls are no-ops.
    ///
    /// # Arguments
    ///
    /// * `tolerance` - Simplification tolerance in tile pixels
    /// * `maxzoom` - Zoom at and beyond which nothing is dropped
    pub fn transform(&mut self, tolerance: f64, maxzoom: Option<u8>) {
        if self.transformed {
            return;
        }
        let (_, zoom, i, j) = id::from_id(self.projection, self.id);
        let scale = 2_f64.powi(zoom as i32);
        let (i, j) = (i as f64, j as f64);

        for layer in self.layers.values_mut() {
            for feature in &mut layer.features {
                let geometry = feature.geometry_mut();
                simplify(geometry, tolerance, zoom, maxzoom);
                geometry.for_each_point_mut(|p| {
                    p.x = p.x * scale - i;
                    p.y = p.y * scale - j;
                });
                geometry.rebuild_vec_bbox();
            }
        }

        self.transformed = true;
    }
}

/// Options for building a [`TileStore`].
///
/// Deserializes from camelCase JSON (`indexMaxzoom`), every field optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TileStoreOptions {
    /// Target projection, inferred from the input when unset
    pub projection: Option<Projection>,
    /// Shallowest zoom to preserve detail on
    pub minzoom: u8,
    /// Deepest zoom to preserve detail on (at most 20)
    pub maxzoom: u8,
    /// Depth of the up-front split
    pub index_maxzoom: u8,
    /// Simplification tolerance in tile pixels (higher means simpler)
    pub tolerance: f64,
    /// Clip buffer as a fraction of the tile width
    pub buffer: f64,
}

impl Default for TileStoreOptions {
    fn default() -> Self {
        Self {
            projection: None,
            minzoom: 0,
            maxzoom: DEFAULT_MAXZOOM,
            index_maxzoom: DEFAULT_INDEX_MAXZOOM,
            tolerance: DEFAULT_TOLERANCE,
            buffer: DEFAULT_BUFFER,
        }
    }
}

impl TileStoreOptions {
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_minzoom(mut self, minzoom: u8) -> Self {
        self.minzoom = minzoom;
        self
    }

    pub fn with_maxzoom(mut self, maxzoom: u8) -> Self {
        self.maxzoom = maxzoom;
        self
    }

    pub fn with_index_maxzoom(mut self, index_maxzoom: u8) -> Self {
        self.index_maxzoom = index_maxzoom;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_buffer(mut self, buffer: f64) -> Self {
        self.buffer = buffer;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.maxzoom > MAX_ZOOM_LIMIT {
            return Err(Error::InvalidConfig(format!(
                "maxzoom should be in the 0-{} range, got {}",
                MAX_ZOOM_LIMIT, self.maxzoom
            )));
        }
        if self.minzoom > self.maxzoom {
            return Err(Error::InvalidConfig(format!(
                "minzoom {} is deeper than maxzoom {}",
                self.minzoom, self.maxzoom
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        if !self.buffer.is_finite() || self.buffer < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "buffer must be a non-negative number, got {}",
                self.buffer
            )));
        }
        Ok(())
    }
}

/// Tile cache over one converted input
#[derive(Debug)]
pub struct TileStore {
    projection: Projection,
    minzoom: u8,
    maxzoom: u8,
    index_maxzoom: u8,
    tolerance: f64,
    buffer: f64,
    faces: BTreeSet<Face>,
    tiles: HashMap<u64, Tile>,
}

impl TileStore {
    /// Convert `data` and pre-split it down to `index_maxzoom`.
    ///
    /// Lon-lat inputs (`Feature`, `VectorFeature`, `FeatureCollection`) tile on Web-Mercator
    /// unless a projection is given; face inputs tile on S2.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when the options are out of range.
    pub fn new(data: JsonCollection, options: TileStoreOptions) -> Result<Self> {
        options.validate()?;

        let projection = options.projection.unwrap_or(if data.is_wm() {
            Projection::WebMercator
        } else {
            Projection::S2
        });

        let mut store = Self {
            projection,
            minzoom: options.minzoom,
            maxzoom: options.maxzoom,
            index_maxzoom: options.index_maxzoom,
            tolerance: options.tolerance,
            buffer: options.buffer,
            faces: BTreeSet::new(),
            tiles: HashMap::new(),
        };

        let features = convert(
            projection,
            &data,
            Some(store.tolerance),
            Some(store.maxzoom),
            false,
        );
        log::debug!("Building {} store from {} features", projection, features.len());
        for feature in features {
            store.add_feature(feature);
        }
        log::debug!("Active faces: {:?}", store.faces);

        for face in 0..projection.num_faces() {
            let root = id::from_face(projection, face);
            store.split_tile(root, None, store.maxzoom);
        }
        log::debug!("Index built with {} tiles", store.tiles.len());

        Ok(store)
    }

    fn add_feature(&mut self, feature: TileFeature) {
        let face = feature.face();
        let root = id::from_face(self.projection, face);
        self.faces.insert(face);
        let projection = self.projection;
        self.tiles
            .entry(root)
            .or_insert_with(|| Tile::new(root, projection))
            .add_feature(feature, None);
    }

    /// Split from `start` towards `end`, or down to `index_maxzoom` without an end.
    ///
    /// A tile is left alone when it is missing, empty, already transformed, at `maxzoom`, or
    /// off the path to `end`. Every tile that is split is transformed afterwards.
    fn split_tile(&mut self, start: u64, end: Option<u64>, end_zoom: u8) {
        let projection = self.projection;
        let mut stack = vec![start];

        while let Some(tile_id) = stack.pop() {
            let Some(tile) = self.tiles.get(&tile_id) else {
                continue;
            };
            if tile.is_empty() || tile.transformed {
                continue;
            }

            let zoom = id::level(projection, tile_id);
            let stop = zoom >= self.maxzoom
                || match end {
                    None => zoom >= self.index_maxzoom,
                    Some(end) => zoom > end_zoom || !id::contains(projection, tile_id, end),
                };
            if stop {
                log::trace!("Not splitting tile {} at zoom {}", tile_id, zoom);
                continue;
            }

            let children = clip::split_tile(tile, self.buffer);
            for child in children {
                stack.push(child.id);
                self.tiles.insert(child.id, child);
            }
            if let Some(tile) = self.tiles.get_mut(&tile_id) {
                tile.transform(self.tolerance, Some(self.maxzoom));
            }
        }
    }

    /// Fetch a tile, splitting its ancestors as needed.
    ///
    /// The returned tile is always in tile-local coordinates.
    ///
    /// # Returns
    ///
    /// `None` when `id` is deeper than zoom 20, lies on a face with no data, or ends up with
    /// no features after clipping.
    pub fn get_tile(&mut self, id: u64) -> Option<&Tile> {
        let projection = self.projection;
        if projection == Projection::S2 && !S2CellId::new(id).is_valid() {
            return None;
        }
        let zoom = id::level(projection, id);
        let face = id::face(projection, id);
        if zoom > MAX_ZOOM_LIMIT || !self.faces.contains(&face) {
            return None;
        }

        let mut parent = id;
        while !self.tiles.contains_key(&parent) && !id::is_face(projection, parent) {
            parent = id::parent(projection, parent);
        }
        self.split_tile(parent, Some(id), zoom);

        // maxzoom tiles are never split, so they are moved into tile space here
        let tile = self.tiles.get_mut(&id)?;
        tile.transform(self.tolerance, Some(self.maxzoom));
        Some(&*tile)
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    pub fn minzoom(&self) -> u8 {
        self.minzoom
    }

    pub fn maxzoom(&self) -> u8 {
        self.maxzoom
    }

    /// Faces that received at least one feature
    pub fn faces(&self) -> &BTreeSet<Face> {
        &self.faces
    }

    /// Number of tiles materialized so far
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
