pub use crate::config::{CrustGenConfig, FractureConfig, GridConfig, SegmentationConfig};
pub use crate::error::{CrustError, Result};
pub use crate::flood::{
    distance_priority, FillStatus, FillStep, FloodFill, FloodFillState, FloodFilling, ImageSegmentation,
    PriorityFloodFilling, Segmentation,
};
pub use crate::fracture::{CrustFractures, CrustFracturing, CrustIsUnfractured};
pub use crate::frames::{LithosphereReferenceFrames, PlateReferenceFrame};
pub use crate::grid::{Grid, GridCoordinate, IcosahedralGrid};
pub use crate::material::{Combine, GrainType, MaterialRecord, MaterialRecordStore};
pub use crate::raster::{PlateLabel, Raster, UNASSIGNED};
