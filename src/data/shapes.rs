use anyhow::{Context, Result};
use geojson::{GeoJson, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Property keys tried in order when looking for a feature's country name.
/// Natural Earth admin-0 files use ADMIN/NAME, hand-rolled files use name.
const NAME_KEYS: [&str; 4] = ["ADMIN", "NAME", "name", "admin"];

/// One country's geometry: the exterior ring of each of its polygons,
/// as (lon, lat) pairs.
#[derive(Clone)]
pub struct CountryShape {
    pub name: String,
    pub rings: Vec<Vec<(f64, f64)>>,
}

impl CountryShape {
    /// Point used for the highlight marker. The mean of all ring vertices is
    /// a crude centroid but lands inside (or near) the country at world zoom.
    pub fn centroid(&self) -> (f64, f64) {
        let mut sum = (0.0, 0.0);
        let mut n = 0usize;
        for ring in &self.rings {
            for &(lon, lat) in ring {
                sum.0 += lon;
                sum.1 += lat;
                n += 1;
            }
        }
        if n == 0 {
            (0.0, 0.0)
        } else {
            (sum.0 / n as f64, sum.1 / n as f64)
        }
    }
}

/// Country polygons keyed by name, loaded once at startup.
pub struct WorldShapes {
    shapes: Vec<CountryShape>,
    by_name: HashMap<String, usize>,
}

impl WorldShapes {
    pub fn empty() -> Self {
        Self {
            shapes: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn from_geojson_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let geojson: GeoJson = content
            .parse()
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Self::from_geojson(&geojson))
    }

    pub fn from_geojson(geojson: &GeoJson) -> Self {
        let mut world = Self::empty();

        let GeoJson::FeatureCollection(fc) = geojson else {
            return world;
        };

        for feature in &fc.features {
            let Some(name) = feature.properties.as_ref().and_then(|props| {
                NAME_KEYS
                    .iter()
                    .find_map(|k| props.get(*k))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
            }) else {
                continue;
            };

            let Some(geometry) = &feature.geometry else {
                continue;
            };

            let mut rings = Vec::new();
            match &geometry.value {
                Value::Polygon(poly) => {
                    if let Some(exterior) = poly.first() {
                        rings.push(ring_coords(exterior));
                    }
                }
                Value::MultiPolygon(polys) => {
                    for poly in polys {
                        if let Some(exterior) = poly.first() {
                            rings.push(ring_coords(exterior));
                        }
                    }
                }
                _ => continue,
            }

            if !rings.is_empty() {
                world.add(CountryShape { name, rings });
            }
        }

        world
    }

    fn add(&mut self, shape: CountryShape) {
        self.by_name.insert(shape.name.clone(), self.shapes.len());
        self.shapes.push(shape);
    }

    pub fn get(&self, name: &str) -> Option<&CountryShape> {
        self.by_name.get(name).map(|&i| &self.shapes[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountryShape> {
        self.shapes.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn ring_coords(ring: &[Vec<f64>]) -> Vec<(f64, f64)> {
    ring.iter()
        .filter(|c| c.len() >= 2)
        .map(|c| (c[0], c[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WorldShapes {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "ADMIN": "Squareland" },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": { "name": "Twin Isles" },
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": [
                            [[[20.0, 0.0], [22.0, 0.0], [22.0, 2.0], [20.0, 0.0]]],
                            [[[24.0, 0.0], [26.0, 0.0], [26.0, 2.0], [24.0, 0.0]]]
                        ]
                    }
                }
            ]
        }"#;
        let geojson: GeoJson = raw.parse().unwrap();
        WorldShapes::from_geojson(&geojson)
    }

    #[test]
    fn test_loads_polygon_and_multipolygon() {
        let world = sample();
        assert_eq!(world.get("Squareland").unwrap().rings.len(), 1);
        assert_eq!(world.get("Twin Isles").unwrap().rings.len(), 2);
        assert!(world.get("Nowhere").is_none());
    }

    #[test]
    fn test_centroid_of_square() {
        let world = sample();
        let (lon, lat) = world.get("Squareland").unwrap().centroid();
        assert!((lon - 4.0).abs() < 1.0e-9);
        assert!((lat - 4.0).abs() < 1.0e-9);
    }
}
