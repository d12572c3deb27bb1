//! Uniform spatial hash over unit vectors for nearest-vertex queries.
//!
//! Queries expand cubic shells of cells around the query cell and stop as soon
//! as no unvisited cell can hold a closer vertex.

use glam::{IVec3, Vec3};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct VertexHash {
    cell_size: f32,
    max_ring: i32,
    cells: HashMap<IVec3, Vec<u32>>,
}

impl VertexHash {
    /// Builds the hash over unit vectors. `cell_size` should be on the order
    /// of the vertex spacing.
    pub fn new(normals: &[Vec3], cell_size: f32) -> Self {
        let cell_size = cell_size.max(1e-3);
        let mut cells: HashMap<IVec3, Vec<u32>> = HashMap::new();
        for (i, normal) in normals.iter().enumerate() {
            cells
                .entry(cell_of(*normal, cell_size))
                .or_default()
                .push(i as u32);
        }
        Self {
            cell_size,
            max_ring: (2.0 / cell_size).ceil() as i32 + 1,
            cells,
        }
    }

    /// Offset of the normal closest to the direction of `position`.
    /// Returns `None` only when the hash is empty.
    pub fn nearest(&self, normals: &[Vec3], position: Vec3) -> Option<usize> {
        let query = position.normalize_or_zero();
        let center = cell_of(query, self.cell_size);
        let mut best: Option<(f32, u32)> = None;

        for ring in 0..=self.max_ring {
            for dx in -ring..=ring {
                for dy in -ring..=ring {
                    for dz in -ring..=ring {
                        if dx.abs().max(dy.abs()).max(dz.abs()) != ring {
                            continue;
                        }
                        let Some(ids) = self.cells.get(&(center + IVec3::new(dx, dy, dz))) else {
                            continue;
                        };
                        for &id in ids {
                            let d = normals[id as usize].distance_squared(query);
                            let closer = match best {
                                None => true,
                                Some((bd, bid)) => d < bd || (d == bd && id < bid),
                            };
                            if closer {
                                best = Some((d, id));
                            }
                        }
                    }
                }
            }
            // every cell beyond this ring lies at least ring * cell_size away
            if let Some((d, _)) = best {
                if d.sqrt() < ring as f32 * self.cell_size {
                    break;
                }
            }
        }
        best.map(|(_, id)| id as usize)
    }
}

fn cell_of(p: Vec3, cell_size: f32) -> IVec3 {
    ((p + Vec3::ONE) / cell_size).floor().as_ivec3()
}
