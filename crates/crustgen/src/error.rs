//! Error types for crust generation

use thiserror::Error;

/// Main error type for grids, rasters and crust operations
#[derive(Debug, Error)]
pub enum CrustError {
    /// A memory offset, coordinate or raster length does not fit the grid
    #[error("index {index} out of range for grid of {len} vertices")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid grid size: {vertices_per_side} vertices per side (expected {min}..={max})")]
    InvalidGridSize {
        vertices_per_side: usize,
        min: usize,
        max: usize,
    },

    /// An aggregation was requested over a raster with no entries
    #[error("cannot aggregate an empty series")]
    EmptySeries,

    #[error("{frames} reference frames supplied for {rasters} plate rasters")]
    PlateCountMismatch { frames: usize, rasters: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, CrustError>;
