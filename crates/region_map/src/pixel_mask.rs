use image::{DynamicImage, RgbaImage};

use crate::error::{RegionMapError, Result};
use crate::types::GridPoint;

/// Neighbour agreement the sharp-edge pass requires for a pixel to survive.
pub const SHARP_EDGE_MIN_AGREEING_NEIGHBORS: u8 = 6;

const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Grid of region values, `0` meaning background.
///
/// Rows are stored bottom-up: `y = 0` is the last row of the source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelMask {
    width: u32,
    height: u32,
    values: Vec<u32>,
}

impl PixelMask {
    /// Create an all-background mask
    pub fn new(width: u32, height: u32) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            values: vec![0; width as usize * height as usize],
        })
    }

    /// Wrap a pre-built row-major value matrix (row 0 at the bottom)
    pub fn from_values(width: u32, height: u32, values: Vec<u32>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(RegionMapError::InvalidInput(format!(
                "expected {expected} mask values for {width}x{height}, got {}",
                values.len()
            )));
        }
        Ok(Self { width, height, values })
    }

    /// Foreground wherever the pixel alpha exceeds `alpha_threshold`.
    pub fn from_alpha(image: &RgbaImage, alpha_threshold: u8) -> Result<Self> {
        let (width, height) = image.dimensions();
        let mut mask = Self::new(width, height)?;
        for (x, row, pixel) in image.enumerate_pixels() {
            if pixel.0[3] > alpha_threshold {
                let y = height - 1 - row;
                mask.values[y as usize * width as usize + x as usize] = 1;
            }
        }
        Ok(mask)
    }

    pub fn from_image(image: &DynamicImage, alpha_threshold: u8) -> Result<Self> {
        Self::from_alpha(&image.to_rgba8(), alpha_threshold)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.values.len()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Whether `(x, y)` lies on the outermost row or column
    pub fn is_border(&self, x: i32, y: i32) -> bool {
        x == 0 || y == 0 || x == self.width as i32 - 1 || y == self.height as i32 - 1
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Region value at `(x, y)`; anything outside the grid reads as background.
    pub fn get(&self, x: i32, y: i32) -> u32 {
        self.index(x, y).map_or(0, |i| self.values[i])
    }

    pub fn get_point(&self, point: GridPoint) -> u32 {
        self.get(point.x, point.y)
    }

    /// Set a cell; writes outside the grid are ignored.
    pub fn set(&mut self, x: i32, y: i32, value: u32) {
        if let Some(i) = self.index(x, y) {
            self.values[i] = value;
        }
    }

    pub fn clear_border(&mut self) {
        let (w, h) = (self.width as i32, self.height as i32);
        for x in 0..w {
            self.set(x, 0, 0);
            self.set(x, h - 1, 0);
        }
        for y in 0..h {
            self.set(0, y, 0);
            self.set(w - 1, y, 0);
        }
    }

    pub fn foreground_count(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0).count()
    }

    /// Clear every foreground pixel with fewer than `min_agreeing` of its
    /// eight neighbours holding the same value. Neighbour counts come from the
    /// mask as it was before the pass. Returns the number of cleared pixels.
    pub fn remove_sharp_edges(&mut self, min_agreeing: u8) -> usize {
        let source = self.values.clone();
        let (w, h) = (self.width as i32, self.height as i32);
        let at = |x: i32, y: i32| -> u32 {
            if x < 0 || y < 0 || x >= w || y >= h {
                0
            } else {
                source[y as usize * w as usize + x as usize]
            }
        };

        let mut removed = 0;
        for y in 0..h {
            for x in 0..w {
                let value = at(x, y);
                if value == 0 {
                    continue;
                }
                let agreeing = NEIGHBORS_8
                    .iter()
                    .filter(|(dx, dy)| at(x + dx, y + dy) == value)
                    .count();
                if agreeing < min_agreeing as usize {
                    self.values[y as usize * w as usize + x as usize] = 0;
                    removed += 1;
                }
            }
        }
        removed
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(RegionMapError::InvalidInput(format!(
            "mask dimensions must be non-zero, got {width}x{height}"
        )));
    }
    Ok(())
}
