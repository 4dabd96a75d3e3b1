use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::key::coerce_district_id;

/// Geographic bounding box in lon/lat degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Bounds {
    pub fn of_point(x: f64, y: f64) -> Self {
        Self {
            west: x,
            south: y,
            east: x,
            north: y,
        }
    }

    pub fn extend(&mut self, x: f64, y: f64) {
        self.west = self.west.min(x);
        self.south = self.south.min(y);
        self.east = self.east.max(x);
        self.north = self.north.max(y);
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        )
    }
}

/// Feature geometry. Kinds the renderer cannot fill are retained as
/// `Unsupported` so the join still sees the feature; they are skipped for
/// bounds, hit-testing and drawing.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    Unsupported(String),
}

impl Geometry {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Geometry::Unsupported(_))
    }

    /// Exterior rings of every member polygon.
    pub fn exterior_rings(&self) -> Vec<&LineString<f64>> {
        match self {
            Geometry::Polygon(polygon) => vec![polygon.exterior()],
            Geometry::MultiPolygon(multi) => multi.0.iter().map(Polygon::exterior).collect(),
            Geometry::Unsupported(_) => Vec::new(),
        }
    }

    /// Member polygons, one for `Polygon`, all for `MultiPolygon`.
    pub fn polygons(&self) -> Vec<&Polygon<f64>> {
        match self {
            Geometry::Polygon(polygon) => vec![polygon],
            Geometry::MultiPolygon(multi) => multi.0.iter().collect(),
            Geometry::Unsupported(_) => Vec::new(),
        }
    }
}

/// Typed properties of a boundary feature. District identifiers are
/// string-normalized at parse time so key comparison is type-stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryProperties {
    pub state: String,
    pub map_type: String,
    pub district: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub geometry: Geometry,
    pub properties: BoundaryProperties,
}

/// One loaded boundary dataset. Immutable once parsed; a map switch replaces
/// the whole collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryCollection {
    pub features: Vec<BoundaryFeature>,
}

impl BoundaryCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn unsupported_count(&self) -> usize {
        self.features
            .iter()
            .filter(|f| f.geometry.is_unsupported())
            .count()
    }
}

#[derive(Debug, Error)]
pub enum GeoJsonError {
    #[error("invalid GeoJSON document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a FeatureCollection, got {0:?}")]
    NotFeatureCollection(String),
}

#[derive(Debug, Deserialize)]
struct RawFeatureCollection {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: RawProperties,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperties {
    #[serde(default)]
    state: String,
    #[serde(default)]
    map_type: String,
    #[serde(default)]
    district: Option<serde_json::Value>,
    #[serde(default)]
    name: Option<String>,
}

impl From<RawProperties> for BoundaryProperties {
    fn from(raw: RawProperties) -> Self {
        Self {
            state: raw.state,
            map_type: raw.map_type,
            district: raw.district.as_ref().and_then(coerce_district_id),
            name: raw.name,
        }
    }
}

/// Parse a GeoJSON FeatureCollection. The document shape is strict (anything
/// but a FeatureCollection fails the load); individual features degrade to
/// `Geometry::Unsupported` instead of failing, per-feature geometry problems
/// must never sink a whole dataset.
pub fn parse_feature_collection(raw: &str) -> Result<BoundaryCollection, GeoJsonError> {
    let collection: RawFeatureCollection = serde_json::from_str(raw)?;
    if collection.ty != "FeatureCollection" {
        return Err(GeoJsonError::NotFeatureCollection(collection.ty));
    }

    let features = collection
        .features
        .into_iter()
        .map(|feature| BoundaryFeature {
            geometry: convert_geometry(feature.geometry),
            properties: feature.properties.into(),
        })
        .collect();

    Ok(BoundaryCollection { features })
}

fn convert_geometry(raw: Option<RawGeometry>) -> Geometry {
    let Some(raw) = raw else {
        return Geometry::Unsupported("null".to_owned());
    };
    match raw.ty.as_str() {
        "Polygon" => match parse_polygon(&raw.coordinates) {
            Some(polygon) => Geometry::Polygon(polygon),
            None => Geometry::Unsupported(raw.ty),
        },
        "MultiPolygon" => match parse_multi_polygon(&raw.coordinates) {
            Some(multi) => Geometry::MultiPolygon(multi),
            None => Geometry::Unsupported(raw.ty),
        },
        _ => Geometry::Unsupported(raw.ty),
    }
}

fn parse_multi_polygon(value: &serde_json::Value) -> Option<MultiPolygon<f64>> {
    let members = value.as_array()?;
    let polygons = members
        .iter()
        .map(parse_polygon)
        .collect::<Option<Vec<_>>>()?;
    Some(MultiPolygon(polygons))
}

fn parse_polygon(value: &serde_json::Value) -> Option<Polygon<f64>> {
    let rings = value.as_array()?;
    let mut rings = rings.iter();
    let exterior = parse_ring(rings.next()?)?;
    let interiors = rings.map(parse_ring).collect::<Option<Vec<_>>>()?;
    // Polygon::new closes rings that do not repeat their first coordinate.
    Some(Polygon::new(exterior, interiors))
}

fn parse_ring(value: &serde_json::Value) -> Option<LineString<f64>> {
    let points = value.as_array()?;
    let mut coords = Vec::with_capacity(points.len());
    for point in points {
        let pair = point.as_array()?;
        let x = pair.first()?.as_f64()?;
        let y = pair.get(1)?.as_f64()?;
        coords.push(Coord { x, y });
    }
    Some(LineString::from(coords))
}

/// Bounding region of every polygon exterior ring in the dataset. Interior
/// rings cannot extend a polygon's extent; unsupported geometries are
/// skipped. `None` when nothing usable remains.
pub fn dataset_bounds<'a, I>(features: I) -> Option<Bounds>
where
    I: IntoIterator<Item = &'a Geometry>,
{
    let mut bounds: Option<Bounds> = None;
    for geometry in features {
        for ring in geometry.exterior_rings() {
            for coord in &ring.0 {
                match bounds.as_mut() {
                    Some(b) => b.extend(coord.x, coord.y),
                    None => bounds = Some(Bounds::of_point(coord.x, coord.y)),
                }
            }
        }
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::{Bounds, Geometry, dataset_bounds, parse_feature_collection};

    fn sample_document() -> &'static str {
        r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[-100.0, 30.0], [-99.0, 30.0], [-99.0, 31.0], [-100.0, 31.0], [-100.0, 30.0]]]
                    },
                    "properties": {"state": "TX", "map_type": "current", "district": 5, "name": "District 5"}
                },
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": [
                            [[[-98.0, 29.0], [-97.5, 29.0], [-97.5, 29.5], [-98.0, 29.0]]],
                            [[[-97.0, 28.0], [-96.5, 28.0], [-96.5, 28.5], [-97.0, 28.0]]]
                        ]
                    },
                    "properties": {"state": "TX", "map_type": "current", "district": "6"}
                },
                {
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [-95.0, 27.0]},
                    "properties": {"state": "TX", "map_type": "current", "district": "7"}
                }
            ]
        }"#
    }

    #[test]
    fn parses_features_and_coerces_numeric_district() {
        let collection = parse_feature_collection(sample_document()).expect("parse collection");

        assert_eq!(collection.len(), 3);
        assert_eq!(
            collection.features[0].properties.district.as_deref(),
            Some("5")
        );
        assert_eq!(
            collection.features[0].properties.name.as_deref(),
            Some("District 5")
        );
        assert!(matches!(
            collection.features[0].geometry,
            Geometry::Polygon(_)
        ));
        assert!(matches!(
            collection.features[1].geometry,
            Geometry::MultiPolygon(_)
        ));
    }

    #[test]
    fn unsupported_geometry_is_retained_not_dropped() {
        let collection = parse_feature_collection(sample_document()).expect("parse collection");

        assert_eq!(collection.unsupported_count(), 1);
        match &collection.features[2].geometry {
            Geometry::Unsupported(ty) => assert_eq!(ty, "Point"),
            other => panic!("expected unsupported geometry, got {other:?}"),
        }
    }

    #[test]
    fn non_feature_collection_document_fails_the_load() {
        let err = parse_feature_collection(
            r#"{"type": "Feature", "geometry": null, "properties": {}}"#,
        )
        .expect_err("document shape must be rejected");
        assert!(err.to_string().contains("FeatureCollection"));
    }

    #[test]
    fn malformed_coordinates_degrade_to_unsupported() {
        let collection = parse_feature_collection(
            r#"{
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": {"type": "Polygon", "coordinates": [[["oops", 1.0]]]},
                    "properties": {"state": "TX", "map_type": "current", "district": "1"}
                }]
            }"#,
        )
        .expect("collection still parses");

        assert_eq!(collection.len(), 1);
        assert!(collection.features[0].geometry.is_unsupported());
    }

    #[test]
    fn bounds_cover_all_exterior_rings_including_multi_polygons() {
        let collection = parse_feature_collection(sample_document()).expect("parse collection");
        let geometries: Vec<_> = collection.features.iter().map(|f| &f.geometry).collect();

        let bounds = dataset_bounds(geometries.into_iter()).expect("bounds present");
        assert_eq!(
            bounds,
            Bounds {
                west: -100.0,
                south: 28.0,
                east: -96.5,
                north: 31.0,
            }
        );
    }

    #[test]
    fn bounds_of_empty_or_unsupported_only_dataset_is_none() {
        assert_eq!(dataset_bounds(std::iter::empty()), None);

        let unsupported = Geometry::Unsupported("Point".to_owned());
        assert_eq!(dataset_bounds(std::iter::once(&unsupported)), None);
    }

    #[test]
    fn bounds_extend_grows_in_every_direction() {
        let mut bounds = Bounds::of_point(-100.0, 30.0);
        bounds.extend(-99.0, 32.0);
        bounds.extend(-101.0, 29.0);

        assert_eq!(bounds.west, -101.0);
        assert_eq!(bounds.east, -99.0);
        assert_eq!(bounds.south, 29.0);
        assert_eq!(bounds.north, 32.0);
        assert_eq!(bounds.center(), (-100.0, 30.5));
    }
}
