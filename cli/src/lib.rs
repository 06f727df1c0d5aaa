use region_map::{GridPoint, MapperConfig, RegionMapError, RegionMapper};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    MapError(#[from] RegionMapError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Tag assigned to every region whose mask value carries this label
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct RegionLabel {
    pub value: u32,
    pub label: String,
}

/// Circle in mask coordinates (Y up)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CircleArea {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub label: String,
}

/// Polygon in mask coordinates (Y up), shifted by the offsets
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PolygonArea {
    pub points: Vec<[f64; 2]>,
    #[serde(default)]
    pub x_offset: f64,
    #[serde(default)]
    pub y_offset: f64,
    pub label: String,
}

/// One mapping run: which image to trace, how, and what to call the areas
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct MapJob {
    pub input: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub mapper: MapperConfig,
    /// When empty every region is labelled `region-<value>`
    #[serde(default)]
    pub labels: Vec<RegionLabel>,
    #[serde(default)]
    pub circles: Vec<CircleArea>,
    #[serde(default)]
    pub polygons: Vec<PolygonArea>,
}

impl MapJob {
    pub fn new<P: Into<PathBuf>>(input: P) -> Self {
        Self {
            input: input.into(),
            output: None,
            mapper: MapperConfig::default(),
            labels: Vec::new(),
            circles: Vec::new(),
            polygons: Vec::new(),
        }
    }

    /// Load MapJob configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load MapJob configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, JobError> {
        Ok(toml::from_str(content)?)
    }

    /// Load MapJob configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load MapJob configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self, JobError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration. Relative `input` and
    /// `output` paths are taken relative to the job file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, JobError> {
        let path_ref = path.as_ref();
        let mut job = match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path_ref)?,
            Some("json") => Self::from_json_file(path_ref)?,
            _ => return Err(JobError::UnsupportedFileFormat),
        };
        if let Some(base) = path_ref.parent() {
            job.resolve_relative_to(base);
        }
        Ok(job)
    }

    /// Prefix relative `input` and `output` paths with `base`
    pub fn resolve_relative_to(&mut self, base: &Path) {
        if self.input.is_relative() {
            self.input = base.join(&self.input);
        }
        if let Some(output) = self.output.as_mut().filter(|output| output.is_relative()) {
            *output = base.join(&*output);
        }
    }

    /// Convert MapJob to TOML string
    pub fn to_toml(&self) -> Result<String, JobError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert MapJob to JSON string
    pub fn to_json(&self) -> Result<String, JobError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    /// Label for a traced region, `None` when the value is not listed
    pub fn label_for(&self, value: u32) -> Option<String> {
        if self.labels.is_empty() {
            return Some(format!("region-{value}"));
        }
        self.labels
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.label.clone())
    }

    /// Trace every labelled region of the mapper's mask and register the
    /// configured circles and polygons after them. Returns the area count.
    pub fn apply(&self, mapper: &mut RegionMapper<String>) -> usize {
        mapper.trace_all_regions(|value: u32, _: GridPoint| self.label_for(value));
        for circle in &self.circles {
            mapper.add_circle(circle.x, circle.y, circle.radius, circle.label.clone());
        }
        for polygon in &self.polygons {
            mapper.add_polygon(
                &polygon.points,
                polygon.x_offset,
                polygon.y_offset,
                polygon.label.clone(),
            );
        }
        mapper.areas().len()
    }

    /// Open the input image and run [`apply`](Self::apply) on it
    pub fn run(&self) -> Result<RegionMapper<String>, JobError> {
        let mut mapper = RegionMapper::open(&self.input, self.mapper.clone())?;
        self.apply(&mut mapper);
        Ok(mapper)
    }
}
