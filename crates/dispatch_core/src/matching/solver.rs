//! Hungarian (Kuhn-Munkres) solver over a padded square cost matrix.
//!
//! The `pathfinding` crate's `kuhn_munkres` only solves square,
//! maximum-weight perfect matchings, so a rectangular minimum-cost matrix
//! gets two treatments before it can be handed over — costs are negated and
//! scaled to integers (`kuhn_munkres` wants a type with cheap `Ord`, not
//! `f64`), and the shorter side is padded with sentinel rows/columns that
//! the solver is free to match real rows to, at a cost ruinous enough that
//! it only happens when there's no real counterpart left.

use pathfinding::kuhn_munkres::{kuhn_munkres, Weights};

/// Scale factor to convert `f64` costs into `i64` weights without losing
/// meaningful precision.
const SCALE: f64 = 1_000_000.0;

/// Weight assigned to a pairing that crosses into padding. Large enough
/// that the solver never prefers it over any real pairing, however bad.
const SENTINEL_WEIGHT: i64 = -1_000_000_000_000;

struct PaddedWeights {
    /// Negated, scaled costs; `rows[i][j]` is the weight for real taxi `i`
    /// matched to real order `j`. Padded indices fall back to
    /// `SENTINEL_WEIGHT`.
    rows: Vec<Vec<i64>>,
    size: usize,
    real_rows: usize,
    real_cols: usize,
}

impl Weights<i64> for PaddedWeights {
    fn rows(&self) -> usize {
        self.size
    }

    fn columns(&self) -> usize {
        self.size
    }

    fn at(&self, row: usize, col: usize) -> i64 {
        if row < self.real_rows && col < self.real_cols {
            self.rows[row][col]
        } else {
            SENTINEL_WEIGHT
        }
    }
}

/// Solve a minimum-cost bipartite assignment over `cost[taxi][order]`.
/// Returns the kept `(taxi_index, order_index)` pairs — pairs that landed
/// on a padded row or column are discarded.
pub fn solve_assignment(cost: &[Vec<f64>]) -> Vec<(usize, usize)> {
    let real_rows = cost.len();
    let real_cols = cost.first().map_or(0, |r| r.len());
    if real_rows == 0 || real_cols == 0 {
        return Vec::new();
    }

    let size = real_rows.max(real_cols);
    let weights = PaddedWeights {
        rows: cost
            .iter()
            .map(|row| row.iter().map(|c| -(c * SCALE) as i64).collect())
            .collect(),
        size,
        real_rows,
        real_cols,
    };

    let (_total, assignment) = kuhn_munkres(&weights);

    assignment
        .into_iter()
        .enumerate()
        .filter(|&(row, col)| row < real_rows && col < real_cols)
        .collect()
}
