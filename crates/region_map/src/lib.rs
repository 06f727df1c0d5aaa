//! # Region Map
//!
//! Turns a raster mask into tagged, clickable image-map areas.
//!
//! Every connected group of equal non-zero pixels becomes one polygon: its
//! boundary is grown cell by cell on the pixel grid, holes are joined to the
//! outer outline through doubled seam edges, and the result is simplified to
//! a vertex budget. Analytic circles and polygons can be added alongside the
//! traced regions, and any image coordinate can be resolved to the tag of the
//! area covering it.
//!
//! ## Core Features
//!
//! - **Boundary Growing**: One ring per 4-connected region, holes included
//! - **Bounded Simplification**: Douglas-Peucker with a vertex budget that keeps seams intact
//! - **Noise Removal**: Border clearing and a sharp-edge pass before tracing
//! - **Hit Testing**: First-match lookup across traced and analytic areas
//! - **GeoJSON Support**: Export/import of the resulting areas
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use region_map::{GridPoint, MapperConfig, RegionMapper};
//!
//! let mut mapper = RegionMapper::open("gauge.png", MapperConfig::default())?;
//! mapper.trace_all_regions(|value: u32, _: GridPoint| Some(format!("part-{value}")));
//! mapper.add_circle(64.0, 64.0, 6.0, "hub".to_string());
//!
//! if let Some(tag) = mapper.lookup_object_at(70, 40) {
//!     println!("clicked {tag}");
//! }
//!
//! mapper.save_geojson("gauge.geojson")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod io;
pub mod mapper;
pub mod marks;
pub mod pixel_mask;
pub mod polygon;
pub mod simplify;
pub mod tracer;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use config::{DEFAULT_MAX_VERTICES, DEFAULT_PRECISION, MapperConfig};
pub use error::{RegionMapError, Result};
pub use io::*;
pub use mapper::RegionMapper;
pub use marks::{VisitGrid, WalkMark};
pub use pixel_mask::{PixelMask, SHARP_EDGE_MIN_AGREEING_NEIGHBORS};
pub use polygon::{LinkedPolygon, NodeId};
pub use tracer::BoundaryTracer;
pub use traits::*;
pub use types::{GridPoint, MapArea, MapShape, ShapeKind};
