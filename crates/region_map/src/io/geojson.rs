use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{RegionMapError, Result},
    mapper::RegionMapper,
    types::{GridPoint, MapArea, MapShape},
};

fn polygon_ring(points: &[GridPoint]) -> Vec<Vec<f64>> {
    let mut ring: Vec<Vec<f64>> = points
        .iter()
        .map(|p| vec![p.x as f64, p.y as f64])
        .collect();
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }
    ring
}

fn to_grid_point(position: &[f64]) -> Result<GridPoint> {
    match position {
        [x, y, ..] => Ok(GridPoint::new(x.round() as i32, y.round() as i32)),
        _ => Err(RegionMapError::InvalidInput(format!(
            "position needs two coordinates, got {}",
            position.len()
        ))),
    }
}

/// Export areas as a GeoJSON FeatureCollection in image coordinates.
///
/// Polygons become Polygon features, circles become Point features with a
/// `radius` property. Every feature carries `id`, `shape`, `area` and the
/// serialized `tag`.
pub fn areas_to_geojson<T: Serialize>(
    areas: &[MapArea<T>],
    image_width: u32,
    image_height: u32,
) -> Result<FeatureCollection> {
    let mut features = Vec::with_capacity(areas.len());

    for (i, area) in areas.iter().enumerate() {
        let mut properties = JsonObject::new();
        properties.insert("id".to_string(), serde_json::Value::from(i));
        let shape = area.shape.kind().to_string();
        properties.insert("shape".to_string(), serde_json::Value::from(shape));
        properties.insert("area".to_string(), serde_json::Value::from(area.shape.area()));
        properties.insert("tag".to_string(), serde_json::to_value(&area.tag)?);

        let value = match &area.shape {
            MapShape::Polygon { points } => Value::Polygon(vec![polygon_ring(points)]),
            MapShape::Circle { center, radius } => {
                properties.insert("radius".to_string(), serde_json::Value::from(*radius));
                Value::Point(vec![center.x as f64, center.y as f64])
            }
        };

        features.push(Feature {
            bbox: None,
            geometry: Some(Geometry::new(value)),
            id: Some(geojson::feature::Id::Number(serde_json::Number::from(i))),
            properties: Some(properties),
            foreign_members: None,
        });
    }

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("image_width".to_string(), serde_json::Value::from(image_width));
    foreign_members.insert("image_height".to_string(), serde_json::Value::from(image_height));
    foreign_members.insert("area_count".to_string(), serde_json::Value::from(areas.len()));

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    })
}

/// Read areas back from a collection written by [`areas_to_geojson`].
/// Features without geometry are skipped.
pub fn areas_from_geojson<T: DeserializeOwned>(
    collection: &FeatureCollection,
) -> Result<Vec<MapArea<T>>> {
    let mut areas = Vec::new();

    for feature in &collection.features {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        let property = |name: &str| {
            feature
                .properties
                .as_ref()
                .and_then(|properties| properties.get(name))
                .cloned()
                .unwrap_or(serde_json::Value::Null)
        };

        let shape = match &geometry.value {
            Value::Polygon(rings) => {
                let Some(exterior) = rings.first() else {
                    continue;
                };
                let mut points = exterior
                    .iter()
                    .map(|position| to_grid_point(position))
                    .collect::<Result<Vec<_>>>()?;
                if points.len() > 1 && points.first() == points.last() {
                    points.pop();
                }
                MapShape::Polygon { points }
            }
            Value::Point(position) => {
                let radius = property("radius").as_i64().ok_or_else(|| {
                    RegionMapError::InvalidInput("circle feature without radius".to_string())
                })?;
                MapShape::Circle {
                    center: to_grid_point(position)?,
                    radius: radius as i32,
                }
            }
            _ => {
                return Err(RegionMapError::InvalidInput(
                    "only Polygon and Point features describe map areas".to_string(),
                ));
            }
        };

        let tag: T = serde_json::from_value(property("tag"))?;
        areas.push(MapArea::new(shape, tag));
    }

    Ok(areas)
}

/// Parse a GeoJSON document holding a FeatureCollection of areas
pub fn areas_from_geojson_str<T: DeserializeOwned>(content: &str) -> Result<Vec<MapArea<T>>> {
    let collection = FeatureCollection::try_from(content.parse::<GeoJson>()?)?;
    areas_from_geojson(&collection)
}

impl<T: Serialize> RegionMapper<T> {
    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        areas_to_geojson(self.areas(), self.mask().width(), self.mask().height())
    }

    /// Export to GeoJSON and serialize to JSON string
    pub fn to_geojson_string(&self) -> Result<String> {
        let geojson = self.to_geojson()?;
        Ok(serde_json::to_string_pretty(&geojson)?)
    }

    pub fn save_geojson<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_geojson_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel_mask::PixelMask;

    fn create_test_mapper() -> RegionMapper<String> {
        let mut mask = PixelMask::new(20, 20).expect("valid dimensions");
        for y in 3..=12 {
            for x in 3..=12 {
                mask.set(x, y, 1);
            }
        }
        let mut mapper = RegionMapper::new(mask);
        mapper.trace_all_regions(|value: u32, _: GridPoint| Some(format!("region-{value}")));
        mapper.add_circle(16.0, 16.0, 2.0, "needle".to_string());
        mapper
    }

    #[test]
    fn test_geojson_export() {
        let mapper = create_test_mapper();
        let collection = mapper.to_geojson().expect("should export");
        assert_eq!(collection.features.len(), 2);

        let polygon = &collection.features[0];
        let properties = polygon.properties.as_ref().expect("properties");
        assert_eq!(properties["shape"], "poly");
        assert_eq!(properties["tag"], "region-1");
        assert_eq!(properties["area"], 64.0);
        let Some(Geometry { value: Value::Polygon(rings), .. }) = &polygon.geometry else {
            panic!("expected polygon geometry");
        };
        assert_eq!(rings[0].len(), 5, "ring is closed");
        assert_eq!(rings[0].first(), rings[0].last());

        let circle = &collection.features[1];
        let properties = circle.properties.as_ref().expect("properties");
        assert_eq!(properties["shape"], "circle");
        assert_eq!(properties["radius"], 2);
        assert_eq!(
            collection.foreign_members.as_ref().expect("metadata")["area_count"],
            2
        );
    }

    #[test]
    fn test_geojson_import_restores_areas() {
        let mapper = create_test_mapper();
        let json = mapper.to_geojson_string().expect("should serialize");
        let areas: Vec<MapArea<String>> = areas_from_geojson_str(&json).expect("should import");
        assert_eq!(areas, mapper.areas());
    }

    #[test]
    fn test_geojson_import_rejects_lines() {
        let collection = FeatureCollection {
            bbox: None,
            features: vec![Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::LineString(vec![
                    vec![0.0, 0.0],
                    vec![1.0, 1.0],
                ]))),
                id: None,
                properties: None,
                foreign_members: None,
            }],
            foreign_members: None,
        };
        assert!(areas_from_geojson::<String>(&collection).is_err());
    }

    #[test]
    fn test_geojson_str_requires_collection() {
        let point = r#"{ "type": "Point", "coordinates": [1.0, 2.0] }"#;
        assert!(matches!(
            areas_from_geojson_str::<String>(point),
            Err(RegionMapError::GeoJson(_))
        ));
    }
}
