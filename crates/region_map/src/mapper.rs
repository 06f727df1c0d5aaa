use std::path::Path;

use image::DynamicImage;
use tracing::debug;

use crate::config::MapperConfig;
use crate::error::Result;
use crate::marks::VisitGrid;
use crate::pixel_mask::PixelMask;
use crate::tracer::BoundaryTracer;
use crate::traits::TagProvider;
use crate::types::{GridPoint, MapArea, MapShape};

/// Turns a pixel mask into tagged image-map areas.
///
/// The mapper owns its mask and the visit state used while tracing, so each
/// instance is independent. Emitted coordinates are Y-down:
/// `y_out = height - 1 - y_mask`.
#[derive(Debug, Clone)]
pub struct RegionMapper<T> {
    mask: PixelMask,
    visits: VisitGrid,
    config: MapperConfig,
    areas: Vec<MapArea<T>>,
}

impl<T> RegionMapper<T> {
    pub fn new(mask: PixelMask) -> Self {
        let visits = VisitGrid::new(mask.width(), mask.height());
        Self {
            mask,
            visits,
            config: MapperConfig::default(),
            areas: Vec::new(),
        }
    }

    pub fn with_config(mask: PixelMask, config: MapperConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(mask)
        })
    }

    /// Build the mask from the image's alpha channel
    pub fn from_image(image: &DynamicImage, config: MapperConfig) -> Result<Self> {
        let mask = PixelMask::from_image(image, config.alpha_threshold)?;
        Self::with_config(mask, config)
    }

    pub fn open<P: AsRef<Path>>(path: P, config: MapperConfig) -> Result<Self> {
        let image = image::open(path)?;
        Self::from_image(&image, config)
    }

    pub fn mask(&self) -> &PixelMask {
        &self.mask
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn areas(&self) -> &[MapArea<T>] {
        &self.areas
    }

    pub fn into_areas(self) -> Vec<MapArea<T>> {
        self.areas
    }

    pub fn clear(&mut self) {
        self.areas.clear();
    }

    fn flip(&self, x: i32, y: i32) -> GridPoint {
        GridPoint::new(x, self.mask.height() as i32 - 1 - y)
    }

    /// Replace the emitted areas with one polygon per connected region of
    /// equal non-zero mask values.
    ///
    /// Works on a copy of the mask with its border cleared and sharp edge
    /// pixels removed, so repeated calls give the same result. Regions that
    /// simplify to fewer than three vertices, or that `tags` declines, are
    /// left out. Returns the number of areas emitted.
    pub fn trace_all_regions<P: TagProvider<T>>(&mut self, mut tags: P) -> usize {
        self.areas.clear();
        self.visits.reset();

        let mut working = self.mask.clone();
        working.clear_border();
        let removed = working.remove_sharp_edges(self.config.min_agreeing_neighbors);
        debug!(removed, "cleared sharp edge pixels");

        let (width, height) = (working.width() as i32, working.height() as i32);
        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let seed = GridPoint::new(x, y);
                let value = working.get_point(seed);
                if value == 0 || self.visits.is_visited(seed) {
                    continue;
                }

                let traced = BoundaryTracer::new(&working, &mut self.visits).trace(seed);
                let Some(mut ring) = traced else {
                    continue;
                };
                let simplified = match ring.approximation(
                    self.config.max_vertices,
                    self.config.precision,
                    &mut self.visits,
                ) {
                    Ok(simplified) => simplified,
                    Err(error) => {
                        debug!(%error, "skipping region");
                        continue;
                    }
                };

                let points: Vec<GridPoint> = simplified
                    .points()
                    .into_iter()
                    .map(|point| self.flip(point.x, point.y))
                    .collect();
                if points.len() < 3 {
                    debug!(x, y, vertices = points.len(), "skipping region without area");
                    continue;
                }

                let Some(tag) = tags.tag_for(value, seed) else {
                    debug!(x, y, value, "no tag for region");
                    continue;
                };
                debug!(x, y, value, vertices = points.len(), "mapped region");
                self.areas.push(MapArea::new(MapShape::Polygon { points }, tag));
            }
        }

        self.areas.len()
    }

    /// Register a circle given in mask coordinates (Y up)
    pub fn add_circle(&mut self, x: f64, y: f64, radius: f64, tag: T) {
        let center = self.flip(x.round() as i32, y.round() as i32);
        let radius = radius.abs().round() as i32;
        self.areas.push(MapArea::new(MapShape::Circle { center, radius }, tag));
    }

    /// Register a polygon given in mask coordinates (Y up), shifted by the
    /// offsets before flipping
    pub fn add_polygon(&mut self, points: &[[f64; 2]], x_offset: f64, y_offset: f64, tag: T) {
        let points = points
            .iter()
            .map(|&[x, y]| {
                self.flip((x + x_offset).round() as i32, (y + y_offset).round() as i32)
            })
            .collect();
        self.areas.push(MapArea::new(MapShape::Polygon { points }, tag));
    }

    /// Tag of the first area containing the Y-down point `(x, y)`
    pub fn lookup_object_at(&self, x: i32, y: i32) -> Option<&T> {
        self.areas
            .iter()
            .find(|area| area.shape.contains(x as f64, y as f64))
            .map(|area| &area.tag)
    }
}
