//! Crust generation on a geodesic sphere grid: plate segmentation by flood fill,
//! resampling between plate and global frames, and compact rock material storage.

pub mod config;
pub mod constants;
pub mod error;
pub mod flood;
pub mod fracture;
pub mod frames;
pub mod grid;
pub mod material;
pub mod prelude;
pub mod raster;

pub use config::CrustGenConfig;
pub use error::{CrustError, Result};
