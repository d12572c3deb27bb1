use crate::constants::*;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrustGenConfig {
    pub grid: GridConfig,
    pub fracture: FractureConfig,
    pub segmentation: SegmentationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Lattice vertices along one icosahedron edge, at least 2
    pub vertices_per_side: usize,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FractureConfig {
    pub plate_count: usize,
    pub compressive_strength: f32,
    pub tensile_strength: f32,
    pub shear_strength: f32,
    #[serde(default)]
    pub seed_growth_steps: usize,
    #[serde(default = "default_true")]
    pub assign_unclaimed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    pub segment_count: usize,
    pub min_segment_vertex_count: usize,
    /// Defaults to an even share of the grid per segment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps_per_segment: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            vertices_per_side: 32,
            radius: 6.371e6,
        }
    }
}

impl Default for FractureConfig {
    fn default() -> Self {
        Self {
            plate_count: DEFAULT_PLATE_COUNT,
            compressive_strength: DEFAULT_COMPRESSIVE_STRENGTH,
            tensile_strength: DEFAULT_TENSILE_STRENGTH,
            shear_strength: DEFAULT_SHEAR_STRENGTH,
            seed_growth_steps: 0,
            assign_unclaimed: true,
        }
    }
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            segment_count: DEFAULT_PLATE_COUNT,
            min_segment_vertex_count: DEFAULT_MIN_SEGMENT_VERTEX_COUNT,
            max_steps_per_segment: None,
        }
    }
}

impl CrustGenConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
