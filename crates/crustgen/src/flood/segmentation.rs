use super::filling::FloodFill;
use crate::config::SegmentationConfig;
use crate::error::Result;
use crate::grid::Grid;
use crate::raster::{self, Magnitude, PlateLabel, Raster, UNASSIGNED};

/// Labeled partition of a raster. Segments are labeled from 1 in acceptance order;
/// vertices outside every segment keep [`UNASSIGNED`].
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub labels: Raster<PlateLabel>,
    pub sizes: Vec<usize>,
}

impl Segmentation {
    pub fn segment_count(&self) -> usize {
        self.sizes.len()
    }

    pub fn unassigned_count(&self) -> usize {
        self.labels.iter().filter(|l| **l == UNASSIGNED).count()
    }
}

/// Splits a raster into up to `segment_count` contiguous regions, each grown from the
/// largest-magnitude vertex not yet taken.
pub struct ImageSegmentation<F> {
    fill: F,
    segment_count: usize,
    min_segment_vertex_count: usize,
    max_steps_per_segment: Option<usize>,
}

impl<F> ImageSegmentation<F> {
    pub fn new(fill: F, segment_count: usize, min_segment_vertex_count: usize) -> Self {
        Self {
            fill,
            segment_count,
            min_segment_vertex_count,
            max_steps_per_segment: None,
        }
    }

    pub fn from_config(fill: F, config: &SegmentationConfig) -> Self {
        Self::new(fill, config.segment_count, config.min_segment_vertex_count)
            .with_max_steps_per_segment(config.max_steps_per_segment)
    }

    /// Caps the growth of each attempt. Defaults to `ceil(vertex_count / segment_count)`.
    pub fn with_max_steps_per_segment(mut self, max_steps: Option<usize>) -> Self {
        self.max_steps_per_segment = max_steps;
        self
    }

    pub fn segment<G, T>(&self, grid: &G, raster: &[T]) -> Result<Segmentation>
    where
        G: Grid,
        T: Magnitude,
        F: FloodFill<T>,
    {
        let vertex_count = grid.vertex_count();
        raster::check_size(raster, vertex_count)?;

        let mut labels = vec![UNASSIGNED; vertex_count];
        let mut sizes = Vec::with_capacity(self.segment_count);
        if self.segment_count == 0 {
            return Ok(Segmentation { labels, sizes });
        }

        let magnitudes = raster::magnitudes(raster);
        let budget = self
            .max_steps_per_segment
            .unwrap_or_else(|| vertex_count.div_ceil(self.segment_count));
        let mut occupied = vec![false; vertex_count];
        let mut tried = vec![false; vertex_count];
        let mut attempts = 0;

        while sizes.len() < self.segment_count && attempts < 2 * self.segment_count {
            let Some(seed) = raster::max_id_where(&magnitudes, |i| !occupied[i] && !tried[i]) else {
                break;
            };
            tried[seed] = true;
            attempts += 1;

            let mut considered: Vec<bool> = occupied.iter().map(|o| !o).collect();
            let mut state = self.fill.start(seed, vertex_count, &mut considered)?;
            self.fill
                .run(grid, raster, &mut considered, &mut state, Some(budget));

            let size = state.size();
            if size == 0 || size < self.min_segment_vertex_count {
                log::debug!("rejected segment seeded at {} with {} vertices", seed, size);
                continue;
            }

            let label = (sizes.len() + 1) as PlateLabel;
            for vertex in state.included_ids() {
                labels[vertex] = label;
                occupied[vertex] = true;
            }
            sizes.push(size);
            log::debug!("segment {} seeded at {} holds {} vertices", label, seed, size);
        }

        if sizes.len() < self.segment_count {
            log::warn!(
                "found {} of {} requested segments after {} attempts",
                sizes.len(),
                self.segment_count,
                attempts
            );
        }

        Ok(Segmentation { labels, sizes })
    }
}
