use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegionMapError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A traced ring collapsed below two distinct points. The mapper skips
    /// such regions instead of reporting them.
    #[error("Region at ({x}, {y}) is too small to map")]
    RegionTooSmall { x: i32, y: i32 },

    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

pub type Result<T> = std::result::Result<T, RegionMapError>;
