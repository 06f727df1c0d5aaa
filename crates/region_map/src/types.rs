use geo_types::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Integer lattice point. Inside the mapper Y grows upward; emitted areas are
/// Y-down image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan_distance(self, other: GridPoint) -> i64 {
        (self.x as i64 - other.x as i64).abs() + (self.y as i64 - other.y as i64).abs()
    }
}

impl From<(i32, i32)> for GridPoint {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Image-map `shape` attribute of an area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
pub enum ShapeKind {
    #[strum(serialize = "poly")]
    Polygon,
    #[strum(serialize = "circle")]
    Circle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum MapShape {
    Polygon { points: Vec<GridPoint> },
    Circle { center: GridPoint, radius: i32 },
}

impl MapShape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Polygon { .. } => ShapeKind::Polygon,
            Self::Circle { .. } => ShapeKind::Circle,
        }
    }

    /// Flattened `coords` attribute values: `x1,y1,x2,y2,...` for polygons,
    /// `cx,cy,r` for circles.
    pub fn coords(&self) -> Vec<i32> {
        match self {
            Self::Polygon { points } => points.iter().flat_map(|p| [p.x, p.y]).collect(),
            Self::Circle { center, radius } => vec![center.x, center.y, *radius],
        }
    }

    /// Convert a polygon shape to geo-types for geometric queries
    pub fn to_geo_polygon(&self) -> Option<Polygon<f64>> {
        match self {
            Self::Polygon { points } if points.len() >= 3 => {
                let coords: Vec<Coord<f64>> = points
                    .iter()
                    .map(|p| Coord { x: p.x as f64, y: p.y as f64 })
                    .collect();
                Some(Polygon::new(LineString::new(coords), vec![]))
            }
            _ => None,
        }
    }

    /// Point containment; points on the outline count as inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        use geo::Intersects;

        match self {
            Self::Polygon { .. } => self
                .to_geo_polygon()
                .is_some_and(|polygon| polygon.intersects(&Coord { x, y })),
            Self::Circle { center, radius } => {
                let dx = x - center.x as f64;
                let dy = y - center.y as f64;
                let r = *radius as f64;
                dx * dx + dy * dy <= r * r
            }
        }
    }

    /// Enclosed area in square pixels
    pub fn area(&self) -> f64 {
        use geo::Area;

        match self {
            Self::Polygon { .. } => self
                .to_geo_polygon()
                .map(|polygon| polygon.unsigned_area())
                .unwrap_or(0.0),
            Self::Circle { radius, .. } => {
                let r = *radius as f64;
                std::f64::consts::PI * r * r
            }
        }
    }
}

/// A clickable region together with the caller's object reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapArea<T> {
    pub shape: MapShape,
    pub tag: T,
}

impl<T> MapArea<T> {
    pub fn new(shape: MapShape, tag: T) -> Self {
        Self { shape, tag }
    }
}
