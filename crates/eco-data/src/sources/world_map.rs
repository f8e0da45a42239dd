use std::path::{Path, PathBuf};

use geo::Contains;
use geo_types::{Geometry, LineString, Point, Polygon};
use geojson::{FeatureCollection, GeoJson};
use tracing::warn;

use crate::DataError;

/// One named country outline.
///
/// Rings are stored in projected plot coordinates (unit Mercator square,
/// y growing north) together with matching polygons for click hit-testing.
#[derive(Debug, Clone)]
pub struct WorldFeature {
    pub name: String,
    rings: Vec<Vec<[f64; 2]>>,
    hit_areas: Vec<Polygon<f64>>,
}

impl WorldFeature {
    /// Outer boundary rings, ready to draw
    pub fn rings(&self) -> &[Vec<[f64; 2]>] {
        &self.rings
    }

    /// Whether a projected point lies inside this country
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let point = Point::new(x, y);
        self.hit_areas.iter().any(|area| area.contains(&point))
    }
}

/// The world boundary document: named country polygons from GeoJSON.
#[derive(Debug, Clone, Default)]
pub struct WorldMap {
    pub features: Vec<WorldFeature>,
}

impl WorldMap {
    /// Parse a GeoJSON FeatureCollection of named country polygons
    pub fn from_geojson(text: &str) -> Result<Self, DataError> {
        let geojson: GeoJson = text
            .parse()
            .map_err(|e: geojson::Error| DataError::Geo(e.to_string()))?;
        let collection = FeatureCollection::try_from(geojson)
            .map_err(|e| DataError::Geo(e.to_string()))?;

        let mut features = Vec::with_capacity(collection.features.len());
        for feature in collection.features {
            let Some(name) = feature
                .properties
                .as_ref()
                .and_then(|props| props.get("name"))
                .and_then(|value| value.as_str())
                .map(str::to_string)
            else {
                warn!("skipping boundary feature without a name property");
                continue;
            };

            let Some(geometry) = feature.geometry else {
                warn!(country = %name, "skipping boundary feature without geometry");
                continue;
            };
            let shape: Geometry<f64> = geometry
                .try_into()
                .map_err(|e: geojson::Error| DataError::Geo(e.to_string()))?;

            let rings = projected_exterior_rings(&shape);
            if rings.is_empty() {
                warn!(country = %name, "skipping boundary feature without polygon rings");
                continue;
            }
            let hit_areas = rings
                .iter()
                .map(|ring| {
                    Polygon::new(
                        LineString::from(
                            ring.iter().map(|p| (p[0], p[1])).collect::<Vec<_>>(),
                        ),
                        vec![],
                    )
                })
                .collect();

            features.push(WorldFeature {
                name,
                rings,
                hit_areas,
            });
        }

        Ok(Self { features })
    }

    /// Read and parse a boundary file synchronously
    pub fn read_file(path: &Path) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_geojson(&text)
    }

    /// Load a boundary file off the UI thread
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, DataError> {
        let path = path.into();
        tokio::task::spawn_blocking(move || Self::read_file(&path)).await?
    }

    /// Bounding box of all projected rings as ([min_x, min_y], [max_x, max_y])
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let mut bounds: Option<([f64; 2], [f64; 2])> = None;
        for feature in &self.features {
            for ring in feature.rings() {
                for point in ring {
                    let (min, max) = bounds.get_or_insert((*point, *point));
                    min[0] = min[0].min(point[0]);
                    min[1] = min[1].min(point[1]);
                    max[0] = max[0].max(point[0]);
                    max[1] = max[1].max(point[1]);
                }
            }
        }
        bounds
    }
}

/// Spherical Mercator onto the unit square, y growing north.
/// Latitudes are clamped to the usual web-mercator cutoff.
pub fn project(lon: f64, lat: f64) -> [f64; 2] {
    let x = (lon + 180.0) / 360.0;
    let lat = lat.clamp(-85.0, 85.0).to_radians();
    let y = 0.5 + (lat.tan() + 1.0 / lat.cos()).ln() / (2.0 * std::f64::consts::PI);
    [x, y]
}

fn projected_exterior_rings(shape: &Geometry<f64>) -> Vec<Vec<[f64; 2]>> {
    fn ring_of(polygon: &Polygon<f64>) -> Vec<[f64; 2]> {
        polygon
            .exterior()
            .coords()
            .map(|c| project(c.x, c.y))
            .collect()
    }

    match shape {
        Geometry::Polygon(polygon) => vec![ring_of(polygon)],
        Geometry::MultiPolygon(multi) => multi.0.iter().map(ring_of).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "Testland" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[10.0,10.0],[20.0,10.0],[20.0,20.0],[10.0,20.0],[10.0,10.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "Islandia" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[ -10.0,-5.0],[ -8.0,-5.0],[ -8.0,-3.0],[ -10.0,-3.0],[ -10.0,-5.0]]],
                        [[[ -6.0,-5.0],[ -4.0,-5.0],[ -4.0,-3.0],[ -6.0,-3.0],[ -6.0,-5.0]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]] }
            }
        ]
    }"#;

    #[test]
    fn test_parses_named_features_only() {
        let world = WorldMap::from_geojson(WORLD).unwrap();
        let names: Vec<&str> = world.features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Testland", "Islandia"]);

        assert_eq!(world.features[0].rings().len(), 1);
        assert_eq!(world.features[1].rings().len(), 2);
    }

    #[test]
    fn test_projection_fixed_points() {
        // Null island sits at the center of the unit square.
        assert_eq!(project(0.0, 0.0), [0.5, 0.5]);
        // West is left, north is up.
        let [x, y] = project(-90.0, 45.0);
        assert!(x < 0.5);
        assert!(y > 0.5);
    }

    #[test]
    fn test_hit_testing_in_projected_space() {
        let world = WorldMap::from_geojson(WORLD).unwrap();
        let testland = &world.features[0];

        let [cx, cy] = project(15.0, 15.0);
        assert!(testland.contains(cx, cy));

        let [ox, oy] = project(40.0, 40.0);
        assert!(!testland.contains(ox, oy));
    }

    #[test]
    fn test_bounds_cover_all_rings() {
        let world = WorldMap::from_geojson(WORLD).unwrap();
        let (min, max) = world.bounds().unwrap();

        let west = project(-10.0, -5.0);
        let east = project(20.0, 20.0);
        assert!(min[0] <= west[0] && min[1] <= west[1]);
        assert!(max[0] >= east[0] && max[1] >= east[1]);
    }

    #[test]
    fn test_malformed_document_is_a_geo_error() {
        assert!(matches!(
            WorldMap::from_geojson("{ not geojson"),
            Err(DataError::Geo(_))
        ));
        assert!(matches!(
            WorldMap::from_geojson(r#"{"type":"Feature","properties":{},"geometry":null}"#),
            Err(DataError::Geo(_))
        ));
    }

    #[tokio::test]
    async fn test_load_surfaces_missing_file() {
        assert!(matches!(
            WorldMap::load("no/such/world.geojson").await,
            Err(DataError::Io(_))
        ));
    }
}
