//! Region growing over grid rasters.
//!
//! Fills grow one vertex per [`FloodFill::advance`] call so that drivers can interleave
//! several of them against one shared considered mask.

mod filling;
mod frontier;
mod segmentation;

pub use filling::{
    distance_priority, FillStatus, FillStep, FloodFill, FloodFillState, FloodFilling, PriorityFloodFilling,
};
pub use segmentation::{ImageSegmentation, Segmentation};
