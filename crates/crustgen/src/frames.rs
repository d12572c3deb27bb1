//! Rigid plate rotations and resampling between plate-local and global rasters.

use crate::error::{CrustError, Result};
use crate::grid::Grid;
use crate::material::Combine;
use crate::raster::{self, Raster};
use glam::{Mat3, Vec3};
use rayon::prelude::*;

/// Rotation carrying a plate's local grid into global space.
/// The rotation is assumed orthonormal; the inverse is its transpose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateReferenceFrame {
    rotation: Mat3,
    inverse: Mat3,
}

impl Default for PlateReferenceFrame {
    fn default() -> Self {
        Self::identity()
    }
}

impl PlateReferenceFrame {
    pub fn identity() -> Self {
        Self::from_rotation(Mat3::IDENTITY)
    }

    pub fn from_rotation(rotation: Mat3) -> Self {
        Self {
            rotation,
            inverse: rotation.transpose(),
        }
    }

    /// `axis` need not be normalized
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        Self::from_rotation(Mat3::from_axis_angle(axis.normalize(), angle))
    }

    pub fn rotation(&self) -> Mat3 {
        self.rotation
    }

    pub fn inverse(&self) -> Mat3 {
        self.inverse
    }

    pub fn local_to_global(&self, position: Vec3) -> Vec3 {
        self.rotation * position
    }

    pub fn global_to_local(&self, position: Vec3) -> Vec3 {
        self.inverse * position
    }

    /// This frame followed by a further rotation expressed in global space
    pub fn rotated(&self, rotation: Mat3) -> Self {
        Self::from_rotation(rotation * self.rotation)
    }
}

/// Resamples rasters between each plate's local grid and the shared global grid
/// by nearest-vertex lookup.
pub struct LithosphereReferenceFrames<'a, L, G> {
    local: &'a L,
    global: &'a G,
}

impl<'a, L, G> LithosphereReferenceFrames<'a, L, G>
where
    L: Grid + Sync,
    G: Grid + Sync,
{
    pub fn new(local: &'a L, global: &'a G) -> Self {
        Self { local, global }
    }

    /// For each plate, the global raster seen through that plate's frame
    pub fn globalize<T>(&self, frames: &[PlateReferenceFrame], locals: &[Raster<T>]) -> Result<Vec<Raster<T>>>
    where
        T: Clone + Send + Sync,
    {
        check_plate_count(frames, locals.len())?;
        for local in locals {
            raster::check_size(local, self.local.vertex_count())?;
        }

        Ok(frames
            .par_iter()
            .zip(locals.par_iter())
            .map(|(frame, local)| {
                (0..self.global.vertex_count())
                    .map(|v| {
                        let position = frame.global_to_local(self.global.vertex_position(v));
                        local[self.local.nearest_vertex(position)].clone()
                    })
                    .collect()
            })
            .collect())
    }

    /// For each plate, the local raster sampled from one global raster
    pub fn localize<T>(&self, frames: &[PlateReferenceFrame], global: &[T]) -> Result<Vec<Raster<T>>>
    where
        T: Clone + Send + Sync,
    {
        raster::check_size(global, self.global.vertex_count())?;

        Ok(frames
            .par_iter()
            .map(|frame| {
                (0..self.local.vertex_count())
                    .map(|u| {
                        let position = frame.local_to_global(self.local.vertex_position(u));
                        global[self.global.nearest_vertex(position)].clone()
                    })
                    .collect()
            })
            .collect())
    }

    /// Merges globalized plate rasters vertex by vertex, folding plates in ascending order
    pub fn flatten<T>(&self, globals: &[Raster<T>]) -> Result<Raster<T>>
    where
        T: Combine + Default + Send + Sync,
    {
        for global in globals {
            raster::check_size(global, self.global.vertex_count())?;
        }

        Ok((0..self.global.vertex_count())
            .into_par_iter()
            .map(|v| {
                globals
                    .iter()
                    .fold(T::default(), |merged, plate| merged.combine(&plate[v]))
            })
            .collect())
    }
}

fn check_plate_count(frames: &[PlateReferenceFrame], rasters: usize) -> Result<()> {
    if frames.len() != rasters {
        return Err(CrustError::PlateCountMismatch {
            frames: frames.len(),
            rasters,
        });
    }
    Ok(())
}
