//! `GeoEnricher`: point-in-polygon lookup across the three static layers
//! (census tracts, council districts, hex grid), backed by an R-tree over
//! each feature's bounding box so that candidate polygons are narrowed down
//! before exact containment testing.

use geo::{Contains, Polygon};
use geojson::{GeoJson, Geometry, Value as GeoValue};
use mds_core::GeoEnricherPort;
use mds_domain::{GeoLayer, MdsError, Result};
use rstar::{RTree, RTreeObject, AABB};

struct IndexedFeature {
    envelope: AABB<[f64; 2]>,
    polygon: Polygon<f64>,
    identifier: Option<String>,
}

impl RTreeObject for IndexedFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

struct Layer {
    tree: RTree<IndexedFeature>,
}

impl Layer {
    fn load(path: &str, identifier_property: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MdsError::ConfigMissing(format!("cannot read geojson layer {path}: {e}")))?;
        let parsed: GeoJson =
            raw.parse().map_err(|e| MdsError::ConfigMissing(format!("cannot parse geojson layer {path}: {e}")))?;

        let features = match parsed {
            GeoJson::FeatureCollection(collection) => collection.features,
            other => {
                return Err(MdsError::ConfigMissing(format!(
                    "geojson layer {path} is not a FeatureCollection (got {other:?})"
                )))
            }
        };

        let mut indexed = Vec::with_capacity(features.len());
        for feature in features {
            let Some(geometry) = feature.geometry.as_ref() else { continue };
            let Some(polygon) = first_polygon(geometry) else { continue };

            let identifier = feature
                .properties
                .as_ref()
                .and_then(|props| props.get(identifier_property))
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                });

            use geo::BoundingRect;
            let rect = polygon.bounding_rect().ok_or_else(|| {
                MdsError::ConfigMissing(format!("degenerate polygon in {path} (no bounding box)"))
            })?;
            let envelope = AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            );

            indexed.push(IndexedFeature { envelope, polygon, identifier });
        }

        Ok(Self { tree: RTree::bulk_load(indexed) })
    }

    fn lookup(&self, longitude: f64, latitude: f64) -> Option<String> {
        let point = geo::Point::new(longitude, latitude);
        let query = AABB::from_point([longitude, latitude]);
        self.tree
            .locate_in_envelope_intersecting(&query)
            .find(|candidate| candidate.polygon.contains(&point))
            .and_then(|candidate| candidate.identifier.clone())
    }
}

/// Takes the first polygon out of a `Polygon` or `MultiPolygon` geometry;
/// every layer this pipeline indexes uses one or the other.
fn first_polygon(geometry: &Geometry) -> Option<Polygon<f64>> {
    match &geometry.value {
        GeoValue::Polygon(coords) => geojson_polygon_to_geo(coords),
        GeoValue::MultiPolygon(polygons) => polygons.first().and_then(|coords| geojson_polygon_to_geo(coords)),
        _ => None,
    }
}

fn geojson_polygon_to_geo(coords: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let exterior = coords.first()?;
    let exterior_line: Vec<geo::Coord<f64>> =
        exterior.iter().map(|pair| geo::Coord { x: pair[0], y: pair[1] }).collect();

    let interiors: Vec<geo::LineString<f64>> = coords[1..]
        .iter()
        .map(|ring| geo::LineString::new(ring.iter().map(|pair| geo::Coord { x: pair[0], y: pair[1] }).collect()))
        .collect();

    Some(Polygon::new(geo::LineString::new(exterior_line), interiors))
}

/// R-tree-backed [`GeoEnricherPort`]. Construction fails closed: if any of
/// the three layer files is missing or unparseable the pipeline should not
/// start, since every trip needs all three enrichments.
pub struct RTreeGeoEnricher {
    census_tracts: Layer,
    council_districts: Layer,
    hex_grid: Layer,
}

impl RTreeGeoEnricher {
    pub fn load(census_path: &str, districts_path: &str, hex_path: &str) -> Result<Self> {
        Ok(Self {
            census_tracts: Layer::load(census_path, GeoLayer::CensusTracts.identifier_property())?,
            council_districts: Layer::load(districts_path, GeoLayer::CouncilDistricts.identifier_property())?,
            hex_grid: Layer::load(hex_path, GeoLayer::HexGrid.identifier_property())?,
        })
    }
}

impl GeoEnricherPort for RTreeGeoEnricher {
    fn lookup(&self, longitude: f64, latitude: f64, layer: GeoLayer) -> Option<String> {
        let layer = match layer {
            GeoLayer::CensusTracts => &self.census_tracts,
            GeoLayer::CouncilDistricts => &self.council_districts,
            GeoLayer::HexGrid => &self.hex_grid,
        };
        layer.lookup(longitude, latitude)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_square_layer(property: &str, value: &str) -> NamedTempFile {
        let geojson = serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { property: value },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0], [0.0, 0.0]]]
                }
            }]
        });

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(geojson.to_string().as_bytes()).unwrap();
        file
    }

    #[test]
    fn finds_containing_polygon_identifier() {
        let file = write_square_layer("GEOID10", "48453001100");
        let layer = Layer::load(file.path().to_str().unwrap(), "GEOID10").unwrap();

        assert_eq!(layer.lookup(5.0, 5.0), Some("48453001100".to_string()));
    }

    #[test]
    fn returns_none_outside_every_polygon() {
        let file = write_square_layer("GEOID10", "48453001100");
        let layer = Layer::load(file.path().to_str().unwrap(), "GEOID10").unwrap();

        assert_eq!(layer.lookup(50.0, 50.0), None);
    }

    #[test]
    fn fails_to_load_a_missing_file() {
        let err = Layer::load("/nonexistent/path/census.geojson", "GEOID10").unwrap_err();
        assert!(matches!(err, MdsError::ConfigMissing(_)));
    }
}
