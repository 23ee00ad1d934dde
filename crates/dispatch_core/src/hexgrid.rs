//! Fixed hexagonal tiling used for demand/supply aggregation.
//!
//! Built once at startup by sampling a lat/lng grid over the operational
//! area and resolving each sample point to its H3 cell. The resulting cell
//! set never changes after construction — only the counts attached to each
//! cell in [`crate::demand`] change, tick to tick.

use h3o::{CellIndex, Resolution};
use std::collections::{BTreeSet, HashMap};

use crate::config::Config;
use crate::geo::{cell_boundary, cell_center, cell_of, Location};

#[derive(Debug, Clone)]
pub struct HexCell {
    pub cell: CellIndex,
    pub center: Location,
    pub boundary: Vec<Location>,
}

/// The fixed set of H3 cells the engine reports demand over, indexed by
/// cell id for O(1) membership lookup.
#[derive(Debug, Clone)]
pub struct HexGrid {
    cells: Vec<HexCell>,
    index: HashMap<CellIndex, usize>,
}

impl HexGrid {
    /// Sample a `lat_steps` x `lng_steps` grid over the box centered on
    /// `config.center` with half-width `config.tiling_half_width_deg`, and
    /// deduplicate the resulting cells.
    pub fn build(config: &Config) -> Self {
        Self::build_with_steps(
            config.center,
            config.tiling_half_width_deg,
            config.h3_resolution,
            crate::config::TILING_LAT_STEPS,
            crate::config::TILING_LNG_STEPS,
        )
    }

    pub fn build_with_steps(
        center: Location,
        half_width_deg: f64,
        resolution: Resolution,
        lat_steps: usize,
        lng_steps: usize,
    ) -> Self {
        let mut seen = BTreeSet::new();
        let mut cells = Vec::new();

        for i in 0..lat_steps {
            for j in 0..lng_steps {
                let lat_t = i as f64 / (lat_steps.saturating_sub(1).max(1)) as f64;
                let lng_t = j as f64 / (lng_steps.saturating_sub(1).max(1)) as f64;
                let lat = center.lat - half_width_deg + 2.0 * half_width_deg * lat_t;
                let lng = center.lng - half_width_deg + 2.0 * half_width_deg * lng_t;
                let Some(cell) = cell_of(Location::new(lat, lng), resolution) else {
                    continue;
                };
                if seen.insert(cell) {
                    cells.push(HexCell {
                        cell,
                        center: cell_center(cell),
                        boundary: cell_boundary(cell),
                    });
                }
            }
        }

        let index = cells
            .iter()
            .enumerate()
            .map(|(i, c)| (c.cell, i))
            .collect();

        Self { cells, index }
    }

    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell in this grid that contains `loc`, if any. A sampled point
    /// near the edge of the tiling box can resolve to a cell outside the
    /// fixed set, in which case this returns `None` and the point
    /// contributes to no hexagon's demand.
    pub fn containing(&self, loc: Location, resolution: Resolution) -> Option<CellIndex> {
        let cell = cell_of(loc, resolution)?;
        self.index.contains_key(&cell).then_some(cell)
    }

    /// Index of `cell` within [`Self::cells`], for O(1) lookup by callers
    /// that need to mutate a parallel per-cell array.
    pub fn index_of(&self, cell: CellIndex) -> Option<usize> {
        self.index.get(&cell).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_non_empty_and_deduplicated() {
        let config = Config::default();
        let grid = HexGrid::build(&config);
        assert!(!grid.is_empty());
        let mut cells: Vec<_> = grid.cells().iter().map(|c| c.cell).collect();
        let before = cells.len();
        cells.sort();
        cells.dedup();
        assert_eq!(before, cells.len());
    }

    #[test]
    fn center_point_resolves_to_a_grid_cell() {
        let config = Config::default();
        let grid = HexGrid::build(&config);
        let found = grid.containing(config.center, config.h3_resolution);
        assert!(found.is_some());
    }
}
