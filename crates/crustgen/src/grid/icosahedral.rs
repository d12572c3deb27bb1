use super::{Grid, VertexHash};
use crate::config::GridConfig;
use crate::constants::*;
use crate::error::{CrustError, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Address of a lattice point on one icosahedron face.
///
/// `row` counts lattice steps away from the face's first corner and `col`
/// runs from the edge toward the second corner (`col == 0`) to the edge
/// toward the third corner (`col == row`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub face: u8,
    pub row: u32,
    pub col: u32,
}

/// Identity of a lattice point independent of the face it was reached from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum VertexKey {
    Corner(u8),
    /// lower corner, higher corner, steps from the lower corner
    Edge(u8, u8, u32),
    Interior(u8, u32, u32),
}

/// Geodesic grid built by subdividing each icosahedron face into a triangular lattice.
///
/// The twelve icosahedron corners occupy offsets `0..12` and have five neighbors;
/// every other vertex has six. Lattice points on face edges and corners are shared
/// between faces, so their coordinates alias: `coordinate(o)` returns the first
/// coordinate found when walking faces in order, rows in order, then columns.
#[derive(Debug, Clone)]
pub struct IcosahedralGrid {
    vertices_per_side: usize,
    radius: f32,
    normals: Vec<Vec3>,
    face_offsets: Vec<u32>,
    coordinates: Vec<GridCoordinate>,
    neighbor_starts: Vec<u32>,
    neighbor_ids: Vec<u32>,
    hash: VertexHash,
}

impl IcosahedralGrid {
    /// Builds a grid with `vertices_per_side` lattice points along every icosahedron edge.
    /// Two gives the bare icosahedron.
    pub fn new(vertices_per_side: usize, radius: f32) -> Result<Self> {
        if !(MIN_VERTICES_PER_SIDE..=MAX_VERTICES_PER_SIDE).contains(&vertices_per_side) {
            return Err(CrustError::InvalidGridSize {
                vertices_per_side,
                min: MIN_VERTICES_PER_SIDE,
                max: MAX_VERTICES_PER_SIDE,
            });
        }
        let steps = (vertices_per_side - 1) as u32;
        let per_face = lattice_size(steps);
        let vertex_count = 10 * (steps as usize).pow(2) + 2;

        let corners: Vec<Vec3> = ICOSAHEDRON_CORNERS
            .iter()
            .map(|c| Vec3::from_array(*c).normalize())
            .collect();

        let mut normals = corners.clone();
        normals.reserve(vertex_count - corners.len());
        let mut offsets: HashMap<VertexKey, u32> = (0..corners.len() as u8)
            .map(|c| (VertexKey::Corner(c), c as u32))
            .collect();
        let mut face_offsets = Vec::with_capacity(ICOSAHEDRON_FACES.len() * per_face);
        let mut coordinates = vec![GridCoordinate::default(); vertex_count];
        let mut seen = vec![false; vertex_count];

        for (face, corner_ids) in ICOSAHEDRON_FACES.iter().enumerate() {
            let face = face as u8;
            for row in 0..=steps {
                for col in 0..=row {
                    let key = vertex_key(face, corner_ids, steps, row, col);
                    let offset = *offsets.entry(key).or_insert_with(|| {
                        normals.push(lattice_normal(&corners, corner_ids, key, steps, row, col));
                        (normals.len() - 1) as u32
                    });
                    face_offsets.push(offset);
                    if !seen[offset as usize] {
                        seen[offset as usize] = true;
                        coordinates[offset as usize] = GridCoordinate { face, row, col };
                    }
                }
            }
        }
        debug_assert_eq!(normals.len(), vertex_count);

        let (neighbor_starts, neighbor_ids) = build_adjacency(&face_offsets, steps, vertex_count);

        // mean vertex spacing on the unit sphere, doubled to keep buckets populated
        let spacing = (4.0 * std::f32::consts::PI / vertex_count as f32).sqrt();
        let hash = VertexHash::new(&normals, 2.0 * spacing);

        log::debug!(
            "built icosahedral grid: {} vertices per side, {} vertices",
            vertices_per_side,
            vertex_count
        );

        Ok(Self {
            vertices_per_side,
            radius,
            normals,
            face_offsets,
            coordinates,
            neighbor_starts,
            neighbor_ids,
            hash,
        })
    }

    pub fn from_config(config: &GridConfig) -> Result<Self> {
        Self::new(config.vertices_per_side, config.radius)
    }

    pub fn vertices_per_side(&self) -> usize {
        self.vertices_per_side
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Unit normals of every vertex, indexed by memory offset
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Surface area represented by one vertex, assuming equal-area cells
    pub fn vertex_area(&self) -> f32 {
        4.0 * std::f32::consts::PI * self.radius * self.radius / self.normals.len() as f32
    }

    /// Longest straight-line distance between two neighboring vertices
    pub fn max_edge_length(&self) -> f32 {
        (0..self.vertex_count())
            .flat_map(|a| {
                self.neighbors(a)
                    .iter()
                    .map(move |&b| (a, b as usize))
            })
            .map(|(a, b)| self.vertex_position(a).distance(self.vertex_position(b)))
            .fold(0.0, f32::max)
    }

    fn steps(&self) -> u32 {
        (self.vertices_per_side - 1) as u32
    }
}

impl Grid for IcosahedralGrid {
    type Coordinate = GridCoordinate;

    fn vertex_count(&self) -> usize {
        self.normals.len()
    }

    fn memory_offset(&self, coordinate: &GridCoordinate) -> Result<usize> {
        let steps = self.steps();
        let face = coordinate.face as usize;
        if face >= ICOSAHEDRON_FACES.len() || coordinate.row > steps || coordinate.col > coordinate.row {
            return Err(CrustError::IndexOutOfRange {
                index: (face * lattice_size(steps)).saturating_add(lattice_index(coordinate.row, coordinate.col)),
                len: self.face_offsets.len(),
            });
        }
        let local = lattice_index(coordinate.row, coordinate.col);
        Ok(self.face_offsets[face * lattice_size(steps) + local] as usize)
    }

    fn coordinate(&self, offset: usize) -> Result<GridCoordinate> {
        self.coordinates
            .get(offset)
            .copied()
            .ok_or(CrustError::IndexOutOfRange {
                index: offset,
                len: self.vertex_count(),
            })
    }

    fn neighbors(&self, offset: usize) -> &[u32] {
        let start = self.neighbor_starts[offset] as usize;
        let end = self.neighbor_starts[offset + 1] as usize;
        &self.neighbor_ids[start..end]
    }

    fn vertex_normal(&self, offset: usize) -> Vec3 {
        self.normals[offset]
    }

    fn vertex_position(&self, offset: usize) -> Vec3 {
        self.normals[offset] * self.radius
    }

    fn nearest_vertex(&self, position: Vec3) -> usize {
        // the hash always holds at least the twelve corners
        self.hash.nearest(&self.normals, position).unwrap_or(0)
    }
}

/// Number of lattice points on one face
fn lattice_size(steps: u32) -> usize {
    let n = steps as usize;
    (n + 1) * (n + 2) / 2
}

fn lattice_index(row: u32, col: u32) -> usize {
    let row = row as usize;
    row * (row + 1) / 2 + col as usize
}

fn vertex_key(face: u8, corner_ids: &[u8; 3], steps: u32, row: u32, col: u32) -> VertexKey {
    // barycentric weights in lattice steps; they always sum to `steps`
    let weights = [steps - row, row - col, col];
    let nonzero: Vec<usize> = (0..3).filter(|&i| weights[i] > 0).collect();
    match nonzero.as_slice() {
        [i] => VertexKey::Corner(corner_ids[*i]),
        [i, j] => {
            let (a, b) = (corner_ids[*i], corner_ids[*j]);
            if a < b {
                VertexKey::Edge(a, b, weights[*j])
            } else {
                VertexKey::Edge(b, a, weights[*i])
            }
        }
        _ => VertexKey::Interior(face, row, col),
    }
}

/// Position of a newly discovered lattice point. Shared edge points are
/// interpolated from their canonical corner pair so every face agrees on them.
fn lattice_normal(
    corners: &[Vec3],
    corner_ids: &[u8; 3],
    key: VertexKey,
    steps: u32,
    row: u32,
    col: u32,
) -> Vec3 {
    let steps = steps as f32;
    match key {
        VertexKey::Corner(c) => corners[c as usize],
        VertexKey::Edge(a, b, t) => {
            let (a, b) = (corners[a as usize], corners[b as usize]);
            (a + (b - a) * (t as f32 / steps)).normalize()
        }
        VertexKey::Interior(..) => {
            let a = corners[corner_ids[0] as usize];
            let b = corners[corner_ids[1] as usize];
            let c = corners[corner_ids[2] as usize];
            (a + (b - a) * ((row - col) as f32 / steps) + (c - a) * (col as f32 / steps)).normalize()
        }
    }
}

/// Compressed adjacency lists, sorted ascending per vertex
fn build_adjacency(face_offsets: &[u32], steps: u32, vertex_count: usize) -> (Vec<u32>, Vec<u32>) {
    let per_face = lattice_size(steps);
    let mut lists: Vec<Vec<u32>> = vec![Vec::with_capacity(6); vertex_count];

    for face in 0..ICOSAHEDRON_FACES.len() {
        let at = |row: u32, col: u32| face_offsets[face * per_face + lattice_index(row, col)];
        for row in 0..steps {
            for col in 0..=row {
                let mut triangles = vec![[at(row, col), at(row + 1, col), at(row + 1, col + 1)]];
                if col < row {
                    triangles.push([at(row, col), at(row + 1, col + 1), at(row, col + 1)]);
                }
                for triangle in triangles {
                    for i in 0..3 {
                        let (a, b) = (triangle[i], triangle[(i + 1) % 3]);
                        lists[a as usize].push(b);
                        lists[b as usize].push(a);
                    }
                }
            }
        }
    }

    let mut starts = Vec::with_capacity(vertex_count + 1);
    let mut ids = Vec::with_capacity(vertex_count * 6);
    starts.push(0);
    for mut list in lists {
        list.sort_unstable();
        list.dedup();
        ids.extend(list);
        starts.push(ids.len() as u32);
    }
    (starts, ids)
}
