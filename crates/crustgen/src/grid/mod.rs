//! Sphere tilings and the capability set every crust operation relies on.

mod icosahedral;
mod vertex_hash;

pub use icosahedral::{GridCoordinate, IcosahedralGrid};
pub use vertex_hash::VertexHash;

use crate::error::Result;
use glam::Vec3;

/// A discrete tiling of the sphere.
///
/// Implementations provide a bijection between their own coordinate type and
/// linear memory offsets (`memory_offset(coordinate(o)) == o`), ordered neighbor
/// lookup, and nearest-vertex search. Tilings may alias several coordinates onto
/// one offset at seams; `coordinate` always returns the canonical one.
pub trait Grid {
    type Coordinate;

    fn vertex_count(&self) -> usize;

    fn memory_offset(&self, coordinate: &Self::Coordinate) -> Result<usize>;

    fn coordinate(&self, offset: usize) -> Result<Self::Coordinate>;

    /// Neighbors of `offset` in ascending offset order.
    ///
    /// # Panics
    /// When `offset` is out of range.
    fn neighbors(&self, offset: usize) -> &[u32];

    /// Unit vector pointing at the vertex
    fn vertex_normal(&self, offset: usize) -> Vec3;

    /// Vertex position scaled by the grid radius
    fn vertex_position(&self, offset: usize) -> Vec3;

    /// Vertex closest to the direction of `position`; the lowest offset wins exact ties.
    fn nearest_vertex(&self, position: Vec3) -> usize;
}
