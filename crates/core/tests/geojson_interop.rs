//! GeoJSON read with the `geojson` crate, handed over as `geo` geometries.

use geojson::GeoJson;
use s2_tiles_core::feature::{FeatureCollection, WmFeature};
use s2_tiles_core::wm::{lon_lat_to_tile, tile_id};
use s2_tiles_core::{Error, Feature, Geometry, JsonCollection, TileStore, TileStoreOptions};

const CITIES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {"name": "Lisbon"},
      "geometry": {"type": "Point", "coordinates": [-9.14, 38.72]}
    },
    {
      "type": "Feature",
      "properties": {"name": "Tagus"},
      "geometry": {
        "type": "LineString",
        "coordinates": [[-9.4, 38.69], [-9.2, 38.7], [-9.0, 38.8], [-8.7, 39.0]]
      }
    },
    {
      "type": "Feature",
      "properties": {"name": "Park"},
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[-9.2, 38.72], [-9.15, 38.72], [-9.15, 38.75], [-9.2, 38.75], [-9.2, 38.72]]]
      }
    }
  ]
}"#;

/// Parse with `geojson`, route every geometry through `geo`
fn load(source: &str) -> Result<JsonCollection, Error> {
    let GeoJson::FeatureCollection(collection) = source.parse::<GeoJson>().expect("geojson")
    else {
        panic!("expected a feature collection");
    };

    let mut features = Vec::new();
    for feature in collection.features {
        let value = feature.geometry.expect("geometry").value;
        let geometry = geo::Geometry::<f64>::try_from(value).expect("geo geometry");
        let mut converted = Feature::new(Geometry::try_from(&geometry)?);
        converted.properties = feature.properties.unwrap_or_default();
        features.push(WmFeature::Feature(converted));
    }

    Ok(JsonCollection::FeatureCollection(FeatureCollection {
        features,
        attributions: None,
        bbox: None,
    }))
}

#[test]
fn test_geojson_into_store() {
    let data = load(CITIES).unwrap();
    let mut store = TileStore::new(data, TileStoreOptions::default()).unwrap();

    let root = store.get_tile(0).unwrap();
    let names: Vec<_> = root.layers["default"]
        .features
        .iter()
        .map(|f| f.properties()["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Lisbon", "Tagus", "Park"]);

    let kinds: Vec<_> = root.layers["default"]
        .features
        .iter()
        .map(|f| f.geometry().type_name())
        .collect();
    assert_eq!(kinds, vec!["Point", "LineString", "Polygon"]);

    // the city tile at zoom 10 holds the point
    let coord = lon_lat_to_tile(-9.14, 38.72, 10);
    let tile = store.get_tile(tile_id::to_id(10, coord.x, coord.y)).unwrap();
    assert!(tile.layers["default"]
        .features
        .iter()
        .any(|f| f.properties()["name"] == "Lisbon"));
}

#[test]
fn test_geometry_collection_rejected() {
    let source = r#"{
      "type": "FeatureCollection",
      "features": [{
        "type": "Feature",
        "properties": {},
        "geometry": {
          "type": "GeometryCollection",
          "geometries": [{"type": "Point", "coordinates": [0.0, 0.0]}]
        }
      }]
    }"#;

    let err = load(source).unwrap_err();
    assert!(matches!(err, Error::InvalidGeometryType(_)));
}
