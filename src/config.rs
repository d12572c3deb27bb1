use crustgen::CrustGenConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "tectonica.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TectonicaConfig {
    pub crust: CrustGenConfig,
    pub stress: StressConfig,
    pub motion: MotionConfig,
}

/// Noise field whose surface gradient drives the crust stress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressConfig {
    pub seed: u32,
    pub frequency: f32,
    pub amplitude: f32,
}

/// Random plate rotations applied before resampling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    pub seed: u64,
    /// Largest rotation applied to any plate, in radians
    pub max_rotation_angle: f32,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            frequency: 2.0,
            amplitude: 1e-4,
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            seed: 1,
            max_rotation_angle: 0.05,
        }
    }
}

impl TectonicaConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: TectonicaConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reads `path` when given, else `tectonica.toml` when present, else defaults
    pub fn resolve(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        match path {
            Some(path) => Self::load_from_file(path),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::load_from_file(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }
}
