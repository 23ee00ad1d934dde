//! Cost matrix construction for the three matcher modes.
//!
//! Lower cost is better; the solver in [`super::solver`] minimizes.

use h3o::Resolution;

use crate::demand::DemandHexagon;
use crate::geo::distance_km;
use crate::hexgrid::HexGrid;
use crate::model::{Order, Taxi};

use super::types::MatchMode;

/// `ε` in the demand-weighting formulas.
const EPSILON: f64 = 1e-6;

/// The demand ratio of the hex containing an order's pickup, as seen by the
/// cost functions: `f64::INFINITY` for an unmet-demand cell (taxis = 0,
/// orders > 0), `0.0` for a cell with no signal at all (either it has
/// taxis and no orders, or the pickup falls outside the tiling).
///
/// Demand-only treats `0.0` as "no ratio" and special-cases it to cost
/// `1.0` directly, matching the no-signal cell exactly. Hybrid instead
/// feeds this `0.0` through `demand_weight`, where it saturates to the same
/// weight as ratio `1.0` would — a ~`1e-6` divergence in the hybrid weight
/// that can't flip any assignment.
fn ratio_for_pickup(order: &Order, hexagons: &[DemandHexagon], grid: &HexGrid, resolution: Resolution) -> f64 {
    let Some(cell) = grid.containing(order.pickup, resolution) else {
        return 0.0;
    };
    let Some(hex) = grid.index_of(cell).and_then(|idx| hexagons.get(idx)) else {
        return 0.0;
    };
    match hex.ratio {
        None => 0.0,
        Some(r) if r < 0.0 => f64::INFINITY,
        Some(r) => r,
    }
}

fn demand_only_cost(r: f64) -> f64 {
    if r.is_infinite() {
        0.1
    } else if r == 0.0 {
        1.0
    } else {
        1.0 / (r + EPSILON)
    }
}

fn demand_weight(r: f64) -> f64 {
    (1.0 / (r + EPSILON)).min(1.0)
}

/// Build the taxi-by-order cost matrix, rows = `taxis`, columns = `orders`.
pub fn build_cost_matrix(
    mode: MatchMode,
    taxis: &[Taxi],
    orders: &[Order],
    hexagons: &[DemandHexagon],
    grid: &HexGrid,
    resolution: Resolution,
) -> Vec<Vec<f64>> {
    taxis
        .iter()
        .map(|taxi| {
            orders
                .iter()
                .map(|order| match mode {
                    MatchMode::Proximity => distance_km(taxi.location, order.pickup),
                    MatchMode::Demand => {
                        let r = ratio_for_pickup(order, hexagons, grid, resolution);
                        demand_only_cost(r)
                    }
                    MatchMode::Hybrid => {
                        let d = distance_km(taxi.location, order.pickup);
                        let r = ratio_for_pickup(order, hexagons, grid, resolution);
                        let w = demand_weight(r);
                        0.6 * d + 0.4 * d * (1.0 - w)
                    }
                })
                .collect()
        })
        .collect()
}
