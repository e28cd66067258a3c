//! Feature and collection wrappers around flat and vector geometry.
//!
//! Every shape is discriminated by its `type` tag on the wire, matching the S2JSON layout:
//! `Feature`, `VectorFeature`, `S2Feature`, `FeatureCollection` and `S2FeatureCollection`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bbox::BBox;
use crate::geometry::{Geometry, Properties, VectorGeometry};
use crate::Face;

/// Attribution name to href
pub type Attributions = BTreeMap<String, String>;

/// A lon-lat feature with flat geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub properties: Properties,
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Properties>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            properties: Properties::new(),
            geometry,
            metadata: None,
        }
    }
}

/// A planar feature with vector geometry (lon-lat before projection, unit square after)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub properties: Properties,
    pub geometry: VectorGeometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Properties>,
}

impl VectorFeature {
    pub fn new(geometry: VectorGeometry) -> Self {
        Self {
            id: None,
            properties: Properties::new(),
            geometry,
            metadata: None,
        }
    }
}

/// A feature living on one S2 cube face, coordinates in face `(s, t)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S2Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub face: Face,
    #[serde(default)]
    pub properties: Properties,
    pub geometry: VectorGeometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Properties>,
}

impl S2Feature {
    pub fn new(face: Face, geometry: VectorGeometry) -> Self {
        Self {
            id: None,
            face,
            properties: Properties::new(),
            geometry,
            metadata: None,
        }
    }

    /// Build from the identity of a source feature with a new face and geometry
    pub(crate) fn derived(
        id: Option<u64>,
        face: Face,
        properties: &Properties,
        metadata: Option<&Properties>,
        geometry: VectorGeometry,
    ) -> Self {
        Self {
            id,
            face,
            properties: properties.clone(),
            geometry,
            metadata: metadata.cloned(),
        }
    }
}

/// A member of a `FeatureCollection`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WmFeature {
    Feature(Feature),
    VectorFeature(VectorFeature),
}

/// Lon-lat collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<WmFeature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributions: Option<Attributions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
}

/// Cube-face collection. `faces` lists the faces its features touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S2FeatureCollection {
    pub features: Vec<S2Feature>,
    #[serde(default)]
    pub faces: Vec<Face>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributions: Option<Attributions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BBox>,
}

/// Any accepted input document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JsonCollection {
    Feature(Feature),
    VectorFeature(VectorFeature),
    FeatureCollection(FeatureCollection),
    S2Feature(S2Feature),
    S2FeatureCollection(S2FeatureCollection),
}

impl JsonCollection {
    /// True for the lon-lat shapes, which tile on Web-Mercator by default
    pub fn is_wm(&self) -> bool {
        matches!(
            self,
            JsonCollection::Feature(_)
                | JsonCollection::VectorFeature(_)
                | JsonCollection::FeatureCollection(_)
        )
    }
}

/// A converted feature as stored in tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TileFeature {
    VectorFeature(VectorFeature),
    S2Feature(S2Feature),
}

impl TileFeature {
    pub fn id(&self) -> Option<u64> {
        match self {
            TileFeature::VectorFeature(f) => f.id,
            TileFeature::S2Feature(f) => f.id,
        }
    }

    /// Cube face, 0 for planar features
    pub fn face(&self) -> Face {
        match self {
            TileFeature::VectorFeature(_) => 0,
            TileFeature::S2Feature(f) => f.face,
        }
    }

    pub fn properties(&self) -> &Properties {
        match self {
            TileFeature::VectorFeature(f) => &f.properties,
            TileFeature::S2Feature(f) => &f.properties,
        }
    }

    pub fn metadata(&self) -> Option<&Properties> {
        match self {
            TileFeature::VectorFeature(f) => f.metadata.as_ref(),
            TileFeature::S2Feature(f) => f.metadata.as_ref(),
        }
    }

    pub fn geometry(&self) -> &VectorGeometry {
        match self {
            TileFeature::VectorFeature(f) => &f.geometry,
            TileFeature::S2Feature(f) => &f.geometry,
        }
    }

    pub fn geometry_mut(&mut self) -> &mut VectorGeometry {
        match self {
            TileFeature::VectorFeature(f) => &mut f.geometry,
            TileFeature::S2Feature(f) => &mut f.geometry,
        }
    }

    /// Same identity, new geometry
    pub fn with_geometry(&self, geometry: VectorGeometry) -> Self {
        match self {
            TileFeature::VectorFeature(f) => TileFeature::VectorFeature(VectorFeature {
                id: f.id,
                properties: f.properties.clone(),
                geometry,
                metadata: f.metadata.clone(),
            }),
            TileFeature::S2Feature(f) => TileFeature::S2Feature(S2Feature {
                id: f.id,
                face: f.face,
                properties: f.properties.clone(),
                geometry,
                metadata: f.metadata.clone(),
            }),
        }
    }
}

impl From<VectorFeature> for TileFeature {
    fn from(feature: VectorFeature) -> Self {
        TileFeature::VectorFeature(feature)
    }
}

impl From<S2Feature> for TileFeature {
    fn from(feature: S2Feature) -> Self {
        TileFeature::S2Feature(feature)
    }
}
