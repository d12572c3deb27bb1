//! Initial partition of the crust into plates.
//!
//! Seeds are placed at the highest-stress vertices, then all plates grow in lock-step,
//! each refusing to cross any edge where the relative stress between the two vertices
//! exceeds the crust's strength.

use crate::config::FractureConfig;
use crate::constants::*;
use crate::error::Result;
use crate::flood::{distance_priority, FillStep, FloodFill, FloodFillState, PriorityFloodFilling};
use crate::grid::Grid;
use crate::raster::{self, PlateLabel, Raster, UNASSIGNED};
use glam::Vec3;

/// Strength thresholds deciding whether the crust between two vertices holds together.
///
/// The relative displacement of the two stress vectors is projected onto the edge
/// (positive is tension, negative is compression) and onto the horizontal direction
/// across the edge (shear), both per unit length squared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrustIsUnfractured {
    pub compressive_strength: f32,
    pub tensile_strength: f32,
    pub shear_strength: f32,
}

impl Default for CrustIsUnfractured {
    fn default() -> Self {
        Self {
            compressive_strength: DEFAULT_COMPRESSIVE_STRENGTH,
            tensile_strength: DEFAULT_TENSILE_STRENGTH,
            shear_strength: DEFAULT_SHEAR_STRENGTH,
        }
    }
}

impl CrustIsUnfractured {
    pub fn new(compressive_strength: f32, tensile_strength: f32, shear_strength: f32) -> Self {
        Self {
            compressive_strength,
            tensile_strength,
            shear_strength,
        }
    }

    pub fn check(&self, a: Vec3, stress_a: &Vec3, b: Vec3, stress_b: &Vec3) -> bool {
        let edge = b - a;
        let length = edge.length();
        if length == 0.0 {
            return true;
        }
        let up = (a + b).normalize_or_zero();
        let across = edge.cross(up).normalize_or_zero() * length;
        let displacement = *stress_b - *stress_a;

        let tension = displacement.dot(edge) / length / length;
        let shear = displacement.dot(across) / length / length;
        -self.compressive_strength < tension && tension < self.tensile_strength && shear.abs() < self.shear_strength
    }
}

/// Plates produced by [`CrustFracturing::fracture`]
#[derive(Debug, Clone)]
pub struct CrustFractures {
    pub fills: Vec<FloodFillState>,
    pub plate_map: Raster<PlateLabel>,
    /// Vertices no fill reached, in ascending order. They carry a plate label only
    /// when unclaimed assignment was enabled.
    pub unclaimed: Vec<usize>,
}

impl CrustFractures {
    pub fn plate_count(&self) -> usize {
        self.fills.len()
    }

    /// How many plates include each vertex. Every entry is 0 or 1.
    pub fn plate_counts(&self) -> Raster<u32> {
        let mut counts = vec![0; self.plate_map.len()];
        for fill in &self.fills {
            for vertex in fill.included_ids() {
                counts[vertex] += 1;
            }
        }
        counts
    }

    pub fn plate_sizes(&self) -> Vec<usize> {
        self.fills.iter().map(FloodFillState::size).collect()
    }

    pub fn plate_map(&self) -> &[PlateLabel] {
        &self.plate_map
    }

    pub fn seeds(&self) -> Vec<usize> {
        self.fills.iter().map(FloodFillState::seed).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrustFracturing {
    pub plate_count: usize,
    pub strength: CrustIsUnfractured,
    /// Steps each new plate grows before the next seed is chosen
    pub seed_growth_steps: usize,
    /// Hand vertices no plate reached to the plate of the nearest claimed vertex
    pub assign_unclaimed: bool,
}

impl Default for CrustFracturing {
    fn default() -> Self {
        Self::new(DEFAULT_PLATE_COUNT)
    }
}

impl CrustFracturing {
    pub fn new(plate_count: usize) -> Self {
        Self {
            plate_count,
            strength: CrustIsUnfractured::default(),
            seed_growth_steps: 0,
            assign_unclaimed: true,
        }
    }

    pub fn from_config(config: &FractureConfig) -> Self {
        Self {
            plate_count: config.plate_count,
            strength: CrustIsUnfractured::new(
                config.compressive_strength,
                config.tensile_strength,
                config.shear_strength,
            ),
            seed_growth_steps: config.seed_growth_steps,
            assign_unclaimed: config.assign_unclaimed,
        }
    }

    pub fn with_strength(mut self, strength: CrustIsUnfractured) -> Self {
        self.strength = strength;
        self
    }

    pub fn fracture<G: Grid>(&self, grid: &G, stress: &[Vec3]) -> Result<CrustFractures> {
        let vertex_count = grid.vertex_count();
        raster::check_size(stress, vertex_count)?;

        let strength = self.strength;
        let fill = PriorityFloodFilling::<Vec3, _, _>::new(
            move |a: Vec3, stress_a: &Vec3, b: Vec3, stress_b: &Vec3| strength.check(a, stress_a, b, stress_b),
            distance_priority::<Vec3>,
        );

        let magnitudes = raster::magnitudes(stress);
        let mut order: Vec<usize> = (0..vertex_count).collect();
        order.sort_by(|a, b| magnitudes[*b].total_cmp(&magnitudes[*a]).then(a.cmp(b)));

        let mut considered = vec![true; vertex_count];
        let mut is_seed = vec![false; vertex_count];
        let mut fills: Vec<FloodFillState> = Vec::with_capacity(self.plate_count);
        for vertex in order {
            if fills.len() == self.plate_count {
                break;
            }
            if !considered[vertex] || grid.neighbors(vertex).iter().any(|n| is_seed[*n as usize]) {
                continue;
            }
            is_seed[vertex] = true;
            let mut state = fill.start(vertex, vertex_count, &mut considered)?;
            if self.seed_growth_steps > 0 {
                fill.run(grid, stress, &mut considered, &mut state, Some(self.seed_growth_steps));
            }
            fills.push(state);
        }
        if fills.len() < self.plate_count {
            log::warn!("placed {} of {} requested plate seeds", fills.len(), self.plate_count);
        }

        let mut rounds = 0;
        loop {
            let mut progressed = false;
            for state in fills.iter_mut() {
                if let FillStep::Advanced(_) = fill.advance(grid, stress, &mut considered, state) {
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
            rounds += 1;
        }
        log::debug!("grew {} plates in {} rounds", fills.len(), rounds);

        let mut plate_map = vec![UNASSIGNED; vertex_count];
        for (i, state) in fills.iter().enumerate() {
            for vertex in state.included_ids() {
                plate_map[vertex] = (i + 1) as PlateLabel;
            }
        }
        let unclaimed: Vec<usize> = (0..vertex_count).filter(|v| plate_map[*v] == UNASSIGNED).collect();

        if self.assign_unclaimed && !fills.is_empty() && !unclaimed.is_empty() {
            assign_to_nearest_plate(grid, &mut fills, &mut plate_map);
        }
        log::debug!("{} vertices were not reached by any plate", unclaimed.len());

        Ok(CrustFractures {
            fills,
            plate_map,
            unclaimed,
        })
    }
}

/// Hands each unclaimed vertex to the plate of its nearest claimed vertex in grid steps.
/// All plates spread at once, one ring per step. A vertex reached by several plates in
/// the same step goes to the lowest label, so every assigned vertex borders its own plate.
fn assign_to_nearest_plate<G: Grid>(grid: &G, fills: &mut [FloodFillState], plate_map: &mut [PlateLabel]) {
    let mut frontier: Vec<usize> = (0..plate_map.len()).filter(|v| plate_map[*v] != UNASSIGNED).collect();
    let mut fresh = vec![false; plate_map.len()];
    while !frontier.is_empty() {
        let mut reached = Vec::new();
        for &vertex in &frontier {
            let label = plate_map[vertex];
            for &n in grid.neighbors(vertex) {
                let n = n as usize;
                if plate_map[n] == UNASSIGNED {
                    plate_map[n] = label;
                    fresh[n] = true;
                    reached.push(n);
                } else if fresh[n] && label < plate_map[n] {
                    plate_map[n] = label;
                }
            }
        }
        reached.sort_unstable();
        for &vertex in &reached {
            fresh[vertex] = false;
            fills[plate_map[vertex] as usize - 1].claim(vertex);
        }
        frontier = reached;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::IcosahedralGrid;
    use rstest::rstest;

    fn weak_crust() -> CrustIsUnfractured {
        CrustIsUnfractured::new(1e-3, 1e-3, 1e-3)
    }

    fn uniform_stress() -> Vec<Vec3> {
        vec![Vec3::Y; 12]
    }

    #[test]
    fn equal_stress_never_fractures() {
        let rule = CrustIsUnfractured::default();
        assert!(rule.check(Vec3::X, &Vec3::Y, Vec3::Y, &Vec3::Y));
    }

    #[test]
    fn tension_and_compression_along_the_edge() {
        let rule = CrustIsUnfractured::new(0.1, 0.1, 0.1);
        let a = Vec3::new(0.0, 0.0, 1.0);
        let b = Vec3::new(1.0, 0.0, 1.0).normalize();
        // b pulled away from a
        assert!(!rule.check(a, &Vec3::ZERO, b, &(b - a)));
        // b pushed toward a
        assert!(!rule.check(a, &Vec3::ZERO, b, &(a - b)));
        // b sliding sideways across the edge
        assert!(!rule.check(a, &Vec3::ZERO, b, &Vec3::Y));
        assert!(rule.check(a, &Vec3::ZERO, b, &(Vec3::Y * 0.01)));
    }

    #[test]
    fn uniform_stress_yields_one_connected_cover() {
        let grid = IcosahedralGrid::new(2, 1.0).unwrap();
        let fractures = CrustFracturing::new(2)
            .with_strength(weak_crust())
            .fracture(&grid, &uniform_stress())
            .unwrap();

        assert_eq!(fractures.seeds(), vec![0, 2]);
        assert!(fractures.unclaimed.is_empty());
        assert!(fractures.plate_map.iter().all(|l| *l != UNASSIGNED));
        assert_eq!(fractures.plate_sizes().iter().sum::<usize>(), 12);
    }

    #[test]
    fn seeds_skip_neighbors_of_earlier_seeds() {
        let grid = IcosahedralGrid::new(2, 1.0).unwrap();
        let fractures = CrustFracturing::new(3)
            .with_strength(weak_crust())
            .fracture(&grid, &uniform_stress())
            .unwrap();
        assert_eq!(fractures.seeds(), vec![0, 2, 8]);
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn opposed_vertex_is_cut_off(#[case] assign_unclaimed: bool) {
        let grid = IcosahedralGrid::new(2, 1.0).unwrap();
        let mut stress = uniform_stress();
        stress[11] = -Vec3::Y;
        let mut fracturing = CrustFracturing::new(2).with_strength(weak_crust());
        fracturing.assign_unclaimed = assign_unclaimed;
        let fractures = fracturing.fracture(&grid, &stress).unwrap();

        assert_eq!(fractures.seeds(), vec![0, 2]);
        assert_eq!(fractures.unclaimed, vec![11]);
        for vertex in 0..11 {
            assert_ne!(fractures.plate_map[vertex], UNASSIGNED);
        }
        if assign_unclaimed {
            let label = fractures.plate_map[11];
            assert_ne!(label, UNASSIGNED);
            assert!(grid.neighbors(11).iter().any(|n| fractures.plate_map[*n as usize] == label));
            assert_eq!(fractures.plate_sizes().iter().sum::<usize>(), 12);
        } else {
            assert_eq!(fractures.plate_map[11], UNASSIGNED);
            assert_eq!(fractures.plate_sizes().iter().sum::<usize>(), 11);
        }
    }

    #[test]
    fn plates_are_disjoint_and_match_the_map() {
        let grid = IcosahedralGrid::new(8, 2.0).unwrap();
        let stress: Vec<Vec3> = grid
            .normals()
            .iter()
            .map(|n| Vec3::new((n.y * 5.0).sin(), (n.z * 3.0).cos(), n.x * n.y) * 1e-3)
            .collect();
        let fractures = CrustFracturing::new(6)
            .with_strength(CrustIsUnfractured::new(1e-3, 1e-3, 1e-3))
            .fracture(&grid, &stress)
            .unwrap();

        assert_eq!(fractures.plate_count(), 6);
        assert!(fractures.plate_counts().iter().all(|c| *c == 1));
        for (i, fill) in fractures.fills.iter().enumerate() {
            let label = (i + 1) as PlateLabel;
            for vertex in fill.included_ids() {
                assert_eq!(fractures.plate_map[vertex], label);
            }
            assert!(fill.is_included(fill.seed()));
        }
    }

    /// Vertices reachable from `start` without leaving its plate
    fn connected_within_plate(grid: &IcosahedralGrid, plate_map: &[PlateLabel], start: usize) -> usize {
        let label = plate_map[start];
        let mut seen = vec![false; plate_map.len()];
        let mut stack = vec![start];
        seen[start] = true;
        let mut count = 0;
        while let Some(vertex) = stack.pop() {
            count += 1;
            for &n in grid.neighbors(vertex) {
                let n = n as usize;
                if !seen[n] && plate_map[n] == label {
                    seen[n] = true;
                    stack.push(n);
                }
            }
        }
        count
    }

    #[rstest]
    #[case(3.0)]
    #[case(7.0)]
    #[case(11.0)]
    #[case(17.0)]
    fn leftovers_join_a_bordering_plate(#[case] wavenumber: f32) {
        let grid = IcosahedralGrid::new(10, 1.0).unwrap();
        let stress: Vec<Vec3> = grid
            .normals()
            .iter()
            .map(|n| {
                Vec3::new(
                    (n.y * wavenumber).sin(),
                    (n.z * wavenumber).cos(),
                    (n.x * wavenumber * 0.5).sin(),
                ) * 2e-3
            })
            .collect();
        let grown = CrustFracturing {
            assign_unclaimed: false,
            ..CrustFracturing::new(6).with_strength(CrustIsUnfractured::new(1e-2, 1e-2, 1e-2))
        }
        .fracture(&grid, &stress)
        .unwrap();
        let fractures = CrustFracturing::new(6)
            .with_strength(CrustIsUnfractured::new(1e-2, 1e-2, 1e-2))
            .fracture(&grid, &stress)
            .unwrap();

        assert_eq!(grown.unclaimed, fractures.unclaimed);
        assert!(fractures.plate_map.iter().all(|l| *l != UNASSIGNED));
        for &vertex in &fractures.unclaimed {
            let label = fractures.plate_map[vertex];
            assert!(grid.neighbors(vertex).iter().any(|n| fractures.plate_map[*n as usize] == label));
            // a leftover touching grown plates joins the lowest of them
            let bordering = grid
                .neighbors(vertex)
                .iter()
                .map(|n| grown.plate_map[*n as usize])
                .filter(|l| *l != UNASSIGNED)
                .min();
            if let Some(lowest) = bordering {
                assert_eq!(label, lowest);
            }
        }
        for (i, fill) in fractures.fills.iter().enumerate() {
            assert_eq!(fractures.plate_map[fill.seed()], (i + 1) as PlateLabel);
            assert_eq!(connected_within_plate(&grid, &fractures.plate_map, fill.seed()), fill.size());
        }
    }

    #[test]
    fn stress_size_must_match_grid() {
        let grid = IcosahedralGrid::new(3, 1.0).unwrap();
        assert!(CrustFracturing::default().fracture(&grid, &uniform_stress()).is_err());
    }
}
