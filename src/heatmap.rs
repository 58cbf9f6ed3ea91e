//! Visit-density heatmap.
//!
//! Builds a sparse grid of cells from visit coordinates, counting how many
//! eligible visits fall into each cell. Home and work visits are excluded so
//! the map shows where the subject *went*, not where they live.
//!
//! The grid is an accumulator like [`crate::aggregate::Aggregator`]: shards
//! build their own grids and [`HeatmapGrid::merge`] sums the cell counts.

use serde::Serialize;
use std::collections::HashMap;

use crate::geo_utils::{cell_center, quantize};
use crate::segment::Segment;

/// Configuration for heatmap generation
#[derive(Debug, Clone)]
pub struct HeatmapConfig {
    /// Decimal places kept when snapping coordinates (default: 1, ~11km cells)
    pub precision: u32,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self { precision: 1 }
    }
}

/// A single non-empty cell in the heatmap grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatPoint {
    pub lat: f64,
    pub lng: f64,
    /// Number of eligible visits snapped into this cell
    pub weight: u32,
}

/// Complete heatmap result
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapResult {
    /// Non-empty cells only, heaviest first
    pub points: Vec<HeatPoint>,
    pub max_weight: u32,
    /// Sum of all weights == number of eligible visits
    pub total_weight: u64,
}

/// Grid coordinate
type CellCoord = (i32, i32);

/// Heatmap grid builder
#[derive(Debug, Clone)]
pub struct HeatmapGrid {
    precision: u32,
    cells: HashMap<CellCoord, u32>,
}

impl HeatmapGrid {
    pub fn new(config: &HeatmapConfig) -> Self {
        Self {
            precision: config.precision,
            cells: HashMap::new(),
        }
    }

    /// Add a segment. Only non-routine visits with coordinates count.
    pub fn add(&mut self, segment: &Segment) {
        let Segment::Visit(visit) = segment else {
            return;
        };
        if visit.semantic_type.is_routine() {
            return;
        }
        let Some(point) = visit.location else {
            return;
        };

        *self.cells.entry(quantize(&point, self.precision)).or_insert(0) += 1;
    }

    pub fn merge(mut self, other: HeatmapGrid) -> HeatmapGrid {
        for (cell, weight) in other.cells {
            *self.cells.entry(cell).or_insert(0) += weight;
        }
        self
    }

    /// Build the final heatmap result
    pub fn build(self) -> HeatmapResult {
        if self.cells.is_empty() {
            return HeatmapResult {
                points: vec![],
                max_weight: 0,
                total_weight: 0,
            };
        }

        let mut cells: Vec<(CellCoord, u32)> = self.cells.into_iter().collect();
        // Heaviest first, then by cell so output order is stable
        cells.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let max_weight = cells[0].1;
        let total_weight = cells.iter().map(|&(_, w)| w as u64).sum();

        let points = cells
            .into_iter()
            .map(|(cell, weight)| {
                let (lat, lng) = cell_center(cell, self.precision);
                HeatPoint { lat, lng, weight }
            })
            .collect();

        HeatmapResult {
            points,
            max_weight,
            total_weight,
        }
    }
}

/// Generate a heatmap from normalized segments, sharded into `chunk`-sized
/// pieces when the `parallel` feature is on.
pub fn generate_heatmap(segments: &[Segment], config: &HeatmapConfig, chunk: usize) -> HeatmapResult {
    #[cfg(feature = "parallel")]
    let grid = {
        use rayon::prelude::*;
        segments
            .par_chunks(chunk.max(1))
            .map(|chunk| {
                let mut grid = HeatmapGrid::new(config);
                chunk.iter().for_each(|s| grid.add(s));
                grid
            })
            .reduce(|| HeatmapGrid::new(config), HeatmapGrid::merge)
    };

    #[cfg(not(feature = "parallel"))]
    let grid = {
        let _ = chunk;
        let mut grid = HeatmapGrid::new(config);
        segments.iter().for_each(|s| grid.add(s));
        grid
    };

    grid.build()
}
