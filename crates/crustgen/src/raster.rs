//! Per-vertex rasters and the aggregations used across the crate.
//!
//! A raster is a plain `Vec<T>` with one entry per grid vertex, indexed by
//! memory offset. Grids never own rasters; rasters never own grids.

use crate::error::{CrustError, Result};
use glam::{Vec2, Vec3};

pub type Raster<T> = Vec<T>;

/// Plate membership of a vertex. Plates are labeled from 1.
pub type PlateLabel = u32;

/// Label left on vertices that no plate or segment claimed
pub const UNASSIGNED: PlateLabel = 0;

/// Scalar size of a raster value, used to rank seed candidates
pub trait Magnitude {
    fn magnitude(&self) -> f32;
}

impl Magnitude for f32 {
    fn magnitude(&self) -> f32 {
        self.abs()
    }
}

impl Magnitude for f64 {
    fn magnitude(&self) -> f32 {
        self.abs() as f32
    }
}

impl Magnitude for Vec2 {
    fn magnitude(&self) -> f32 {
        self.length()
    }
}

impl Magnitude for Vec3 {
    fn magnitude(&self) -> f32 {
        self.length()
    }
}

pub fn magnitudes<T: Magnitude>(raster: &[T]) -> Raster<f32> {
    raster.iter().map(Magnitude::magnitude).collect()
}

/// Fails with `IndexOutOfRange` when a raster does not hold exactly one entry per vertex
pub fn check_size<T>(raster: &[T], vertex_count: usize) -> Result<()> {
    if raster.len() != vertex_count {
        return Err(CrustError::IndexOutOfRange {
            index: raster.len(),
            len: vertex_count,
        });
    }
    Ok(())
}

/// Offset of the largest value; the lowest offset wins ties.
pub fn max_id(values: &[f32]) -> Result<usize> {
    max_id_where(values, |_| true).ok_or(CrustError::EmptySeries)
}

/// Like [`max_id`], restricted to offsets accepted by `eligible`.
/// Returns `None` when nothing is eligible.
pub fn max_id_where(values: &[f32], eligible: impl Fn(usize) -> bool) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, value) in values.iter().enumerate() {
        if !eligible(i) {
            continue;
        }
        match best {
            Some(b) if values[b].total_cmp(value).is_ge() => {}
            _ => best = Some(i),
        }
    }
    best
}

pub fn sum(values: &[f32]) -> Result<f32> {
    if values.is_empty() {
        return Err(CrustError::EmptySeries);
    }
    Ok(values.iter().sum())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_id_prefers_lowest_offset_on_ties() {
        let values = [1.0, 3.0, 2.0, 3.0];
        assert_eq!(max_id(&values).unwrap(), 1);
    }

    #[test]
    fn max_id_where_skips_ineligible() {
        let values = [1.0, 3.0, 2.0, 3.0];
        assert_eq!(max_id_where(&values, |i| i != 1), Some(3));
        assert_eq!(max_id_where(&values, |_| false), None);
    }

    #[test]
    fn empty_aggregations_fail() {
        assert!(matches!(max_id(&[]), Err(CrustError::EmptySeries)));
        assert!(matches!(sum(&[]), Err(CrustError::EmptySeries)));
    }

    #[test]
    fn check_size_reports_mismatch() {
        let raster = vec![0.0f32; 11];
        assert!(check_size(&raster, 11).is_ok());
        assert!(matches!(
            check_size(&raster, 12),
            Err(CrustError::IndexOutOfRange { index: 11, len: 12 })
        ));
    }

    #[test]
    fn vector_magnitudes() {
        let raster = vec![Vec3::new(3.0, 4.0, 0.0), Vec3::ZERO];
        assert_eq!(magnitudes(&raster), vec![5.0, 0.0]);
    }
}
