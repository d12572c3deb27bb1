use super::frontier::Frontier;
use crate::error::{CrustError, Result};
use crate::grid::Grid;
use glam::Vec3;
use std::marker::PhantomData;

/// Outcome of one call to [`FloodFill::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStep {
    /// The vertex was popped from the frontier and is now part of the fill
    Advanced(usize),
    /// Nothing was left on the frontier
    Exhausted,
}

/// Lifecycle of a fill. A fill the caller stops advancing early simply stays `Growing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStatus {
    Seeded,
    Growing,
    Exhausted,
}

/// Working state of one fill.
///
/// The considered mask shared by sibling fills lives outside this struct and is
/// handed to every `advance` call, so several fills can grow against the same
/// eligibility set without owning it.
#[derive(Debug, Clone)]
pub struct FloodFillState {
    seed: usize,
    frontier: Frontier,
    included: Vec<bool>,
    size: usize,
    steps: usize,
    status: FillStatus,
}

impl FloodFillState {
    fn new(seed: usize, vertex_count: usize, considered: &mut [bool], mut frontier: Frontier) -> Result<Self> {
        if considered.len() != vertex_count {
            return Err(CrustError::IndexOutOfRange {
                index: considered.len(),
                len: vertex_count,
            });
        }
        if seed >= vertex_count {
            return Err(CrustError::IndexOutOfRange {
                index: seed,
                len: vertex_count,
            });
        }
        considered[seed] = false;
        frontier.push(seed as u32, 0.0);
        Ok(Self {
            seed,
            frontier,
            included: vec![false; vertex_count],
            size: 0,
            steps: 0,
            status: FillStatus::Seeded,
        })
    }

    pub fn seed(&self) -> usize {
        self.seed
    }

    /// Number of vertices included so far
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of successful `advance` calls
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn status(&self) -> FillStatus {
        self.status
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn is_included(&self, vertex: usize) -> bool {
        self.included[vertex]
    }

    pub fn included(&self) -> &[bool] {
        &self.included
    }

    /// Included vertices in ascending order
    pub fn included_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.included
            .iter()
            .enumerate()
            .filter_map(|(i, included)| included.then_some(i))
    }

    /// Adds a vertex without visiting it. Used when leftovers are handed out after growth.
    pub(crate) fn claim(&mut self, vertex: usize) {
        if !self.included[vertex] {
            self.included[vertex] = true;
            self.size += 1;
        }
    }

    fn pop(&mut self) -> Option<usize> {
        let Some(id) = self.frontier.pop() else {
            self.status = FillStatus::Exhausted;
            return None;
        };
        let id = id as usize;
        self.included[id] = true;
        self.size += 1;
        self.steps += 1;
        Some(id)
    }

    fn settle(&mut self) {
        self.status = if self.frontier.is_empty() {
            FillStatus::Exhausted
        } else {
            FillStatus::Growing
        };
    }
}

/// A region-growing strategy over a grid raster
pub trait FloodFill<T> {
    /// Starts a fill at `seed`, clearing its considered flag
    fn start(&self, seed: usize, vertex_count: usize, considered: &mut [bool]) -> Result<FloodFillState>;

    /// Pops one vertex from the frontier, includes it, and queues every neighbor that is
    /// still considered and admitted by the fill's predicate. Queued neighbors stop being
    /// considered, so no sibling fill can take them.
    ///
    /// # Panics
    /// When `raster` or `considered` is shorter than the grid.
    fn advance<G: Grid>(&self, grid: &G, raster: &[T], considered: &mut [bool], state: &mut FloodFillState) -> FillStep;

    /// Advances until the frontier is empty or `max_steps` steps were taken.
    /// Returns the number of steps taken.
    ///
    /// A fill stopped by its budget is suspended: it keeps its frontier, reports
    /// [`FillStatus::Growing`], and picks up where it left off on the next `advance` or `run`.
    fn run<G: Grid>(
        &self,
        grid: &G,
        raster: &[T],
        considered: &mut [bool],
        state: &mut FloodFillState,
        max_steps: Option<usize>,
    ) -> usize {
        let mut taken = 0;
        while max_steps.is_none_or(|max| taken < max) {
            match self.advance(grid, raster, considered, state) {
                FillStep::Advanced(_) => taken += 1,
                FillStep::Exhausted => break,
            }
        }
        taken
    }
}

fn expand<G, T, S>(
    grid: &G,
    raster: &[T],
    considered: &mut [bool],
    state: &mut FloodFillState,
    is_similar: &S,
    mut key: impl FnMut(Vec3, &T) -> f32,
) -> FillStep
where
    G: Grid,
    S: Fn(Vec3, &T, Vec3, &T) -> bool,
{
    let Some(id) = state.pop() else {
        return FillStep::Exhausted;
    };
    let position = grid.vertex_position(id);
    for &neighbor in grid.neighbors(id) {
        let n = neighbor as usize;
        if !considered[n] {
            continue;
        }
        let neighbor_position = grid.vertex_position(n);
        if is_similar(position, &raster[id], neighbor_position, &raster[n]) {
            considered[n] = false;
            state.frontier.push(neighbor, key(neighbor_position, &raster[n]));
        }
    }
    state.settle();
    FillStep::Advanced(id)
}

/// Breadth-first fill admitting neighbors that pass `is_similar(a, value_a, b, value_b)`,
/// where `a` is the vertex being visited and `b` its neighbor.
pub struct FloodFilling<T, S> {
    is_similar: S,
    _marker: PhantomData<fn(&T)>,
}

impl<T, S> FloodFilling<T, S>
where
    S: Fn(Vec3, &T, Vec3, &T) -> bool,
{
    pub fn new(is_similar: S) -> Self {
        Self {
            is_similar,
            _marker: PhantomData,
        }
    }
}

impl<T, S> FloodFill<T> for FloodFilling<T, S>
where
    S: Fn(Vec3, &T, Vec3, &T) -> bool,
{
    fn start(&self, seed: usize, vertex_count: usize, considered: &mut [bool]) -> Result<FloodFillState> {
        FloodFillState::new(seed, vertex_count, considered, Frontier::fifo())
    }

    fn advance<G: Grid>(&self, grid: &G, raster: &[T], considered: &mut [bool], state: &mut FloodFillState) -> FillStep {
        expand(grid, raster, considered, state, &self.is_similar, |_, _| 0.0)
    }
}

/// Fill with the same admission rule as [`FloodFilling`], visiting queued vertices in
/// ascending `priority(seed_position, seed_value, position, value)`.
pub struct PriorityFloodFilling<T, S, P> {
    is_similar: S,
    priority: P,
    _marker: PhantomData<fn(&T)>,
}

impl<T, S, P> PriorityFloodFilling<T, S, P>
where
    S: Fn(Vec3, &T, Vec3, &T) -> bool,
    P: Fn(Vec3, &T, Vec3, &T) -> f32,
{
    pub fn new(is_similar: S, priority: P) -> Self {
        Self {
            is_similar,
            priority,
            _marker: PhantomData,
        }
    }
}

impl<T, S, P> FloodFill<T> for PriorityFloodFilling<T, S, P>
where
    S: Fn(Vec3, &T, Vec3, &T) -> bool,
    P: Fn(Vec3, &T, Vec3, &T) -> f32,
{
    fn start(&self, seed: usize, vertex_count: usize, considered: &mut [bool]) -> Result<FloodFillState> {
        FloodFillState::new(seed, vertex_count, considered, Frontier::priority())
    }

    fn advance<G: Grid>(&self, grid: &G, raster: &[T], considered: &mut [bool], state: &mut FloodFillState) -> FillStep {
        let seed = state.seed;
        let seed_position = grid.vertex_position(seed);
        let seed_value = &raster[seed];
        expand(grid, raster, considered, state, &self.is_similar, |position, value| {
            (self.priority)(seed_position, seed_value, position, value)
        })
    }
}

/// Straight-line distance from the seed, ignoring raster values
pub fn distance_priority<T>(seed_position: Vec3, _: &T, position: Vec3, _: &T) -> f32 {
    seed_position.distance(position)
}
