//! Input documents to tile-ready features in a target projection.
//!
//! | input          | WM                                 | S2                        |
//! |----------------|------------------------------------|---------------------------|
//! | `Feature`      | vectorize, project to unit square  | vectorize, split by face  |
//! | `VectorFeature`| project to unit square             | split by face             |
//! | `S2Feature`    | unproject, project to unit square  | kept as is                |
//!
//! Collections convert member by member. With a tolerance, every produced geometry is tagged
//! for simplification.

use crate::feature::{Feature, JsonCollection, S2Feature, TileFeature, VectorFeature, WmFeature};
use crate::id::Projection;
use crate::s2::convert::{to_s2, to_wm};
use crate::simplify::build_sq_dists;
use crate::wm::convert::{to_unit_scale, to_vector};

/// Convert any accepted input document into features for `projection`.
///
/// # Arguments
///
/// * `projection` - Target projection
/// * `data` - Input document
/// * `tolerance` - Simplification tolerance in tile pixels, `None` to skip tagging
/// * `maxzoom` - Deepest zoom the tagging targets
/// * `build_bbox` - Compute lon-lat bounding boxes for `Feature` inputs that lack one
///
/// # Returns
///
/// The converted features, in input order
pub fn convert(
    projection: Projection,
    data: &JsonCollection,
    tolerance: Option<f64>,
    maxzoom: Option<u8>,
    build_bbox: bool,
) -> Vec<TileFeature> {
    let mut res = Vec::new();

    match data {
        JsonCollection::Feature(feature) => {
            res.extend(convert_feature(projection, feature, tolerance, maxzoom, build_bbox))
        }
        JsonCollection::VectorFeature(feature) => {
            res.extend(convert_vector_feature(projection, feature.clone(), tolerance, maxzoom))
        }
        JsonCollection::FeatureCollection(collection) => {
            for member in &collection.features {
                match member {
                    WmFeature::Feature(feature) => res.extend(convert_feature(
                        projection, feature, tolerance, maxzoom, build_bbox,
                    )),
                    WmFeature::VectorFeature(feature) => res.extend(convert_vector_feature(
                        projection,
                        feature.clone(),
                        tolerance,
                        maxzoom,
                    )),
                }
            }
        }
        JsonCollection::S2Feature(feature) => {
            res.push(convert_s2_feature(projection, feature, tolerance, maxzoom))
        }
        JsonCollection::S2FeatureCollection(collection) => {
            for feature in &collection.features {
                res.push(convert_s2_feature(projection, feature, tolerance, maxzoom));
            }
        }
    }

    log::debug!("Converted input to {} {} features", res.len(), projection);
    res
}

fn convert_feature(
    projection: Projection,
    feature: &Feature,
    tolerance: Option<f64>,
    maxzoom: Option<u8>,
    build_bbox: bool,
) -> Vec<TileFeature> {
    convert_vector_feature(projection, to_vector(feature, build_bbox), tolerance, maxzoom)
}

fn convert_vector_feature(
    projection: Projection,
    mut feature: VectorFeature,
    tolerance: Option<f64>,
    maxzoom: Option<u8>,
) -> Vec<TileFeature> {
    match projection {
        Projection::WebMercator => {
            to_unit_scale(&mut feature, tolerance, maxzoom);
            vec![feature.into()]
        }
        Projection::S2 => {
            let pieces: Vec<TileFeature> = to_s2(&feature, tolerance, maxzoom)
                .into_iter()
                .map(TileFeature::from)
                .collect();
            if pieces.is_empty() {
                log::warn!(
                    "Feature {:?} produced no geometry on any face and was skipped",
                    feature.id
                );
            }
            pieces
        }
    }
}

fn convert_s2_feature(
    projection: Projection,
    feature: &S2Feature,
    tolerance: Option<f64>,
    maxzoom: Option<u8>,
) -> TileFeature {
    match projection {
        Projection::WebMercator => {
            let mut vector = to_wm(feature);
            to_unit_scale(&mut vector, tolerance, maxzoom);
            vector.into()
        }
        Projection::S2 => {
            let mut feature = feature.clone();
            if let Some(tolerance) = tolerance {
                build_sq_dists(&mut feature.geometry, tolerance, maxzoom);
            }
            feature.into()
        }
    }
}
