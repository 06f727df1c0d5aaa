use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{RegionMapError, Result};
use crate::pixel_mask::SHARP_EDGE_MIN_AGREEING_NEIGHBORS;

/// Vertex budget applied to each traced region by default
pub const DEFAULT_MAX_VERTICES: usize = 120;

/// Default allowed deviation of the simplified outline, in pixels
pub const DEFAULT_PRECISION: f64 = 1.0;

/// Tuning for mask construction, noise removal and simplification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MapperConfig {
    /// Pixels with alpha strictly above this value are foreground
    pub alpha_threshold: u8,
    /// Maximum number of vertices per traced polygon
    #[schemars(range(min = 2))]
    pub max_vertices: usize,
    /// Maximum allowed distance between the outline and its simplification
    #[schemars(range(min = 0.0))]
    pub precision: f64,
    /// Neighbours (out of 8) that must share a pixel's value for it to
    /// survive the sharp-edge pass
    #[schemars(range(max = 8))]
    pub min_agreeing_neighbors: u8,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            alpha_threshold: 0,
            max_vertices: DEFAULT_MAX_VERTICES,
            precision: DEFAULT_PRECISION,
            min_agreeing_neighbors: SHARP_EDGE_MIN_AGREEING_NEIGHBORS,
        }
    }
}

impl MapperConfig {
    pub fn with_alpha_threshold(mut self, alpha_threshold: u8) -> Self {
        self.alpha_threshold = alpha_threshold;
        self
    }

    pub fn with_max_vertices(mut self, max_vertices: usize) -> Self {
        self.max_vertices = max_vertices;
        self
    }

    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_min_agreeing_neighbors(mut self, min_agreeing_neighbors: u8) -> Self {
        self.min_agreeing_neighbors = min_agreeing_neighbors;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_vertices < 2 {
            return Err(RegionMapError::InvalidInput(format!(
                "max_vertices must be at least 2, got {}",
                self.max_vertices
            )));
        }
        if !self.precision.is_finite() || self.precision < 0.0 {
            return Err(RegionMapError::InvalidInput(format!(
                "precision must be a non-negative number, got {}",
                self.precision
            )));
        }
        if self.min_agreeing_neighbors > 8 {
            return Err(RegionMapError::InvalidInput(format!(
                "min_agreeing_neighbors must be at most 8, got {}",
                self.min_agreeing_neighbors
            )));
        }
        Ok(())
    }
}
