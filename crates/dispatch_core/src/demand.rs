//! Demand/supply aggregation over the fixed hex grid.
//!
//! Every tick,
//! each hexagon's taxi and order counts are reset to zero and recounted
//! from scratch against the current store snapshot, then banded into a
//! color and level label. Nothing here is incremental — stale counts never
//! survive a tick.

use h3o::{CellIndex, Resolution};
use serde::Serialize;

use crate::geo::Location;
use crate::hexgrid::HexGrid;
use crate::model::{Order, OrderStatus, Taxi, TaxiStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DemandLevel {
    None,
    SupplyOnly,
    UnmetDemand,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl DemandLevel {
    /// Hex color used by the dashboard for this demand band.
    pub fn color(self) -> &'static str {
        match self {
            DemandLevel::None => "#F0F0F0",
            DemandLevel::SupplyOnly => "#90EE90",
            DemandLevel::UnmetDemand => "#FF4500",
            DemandLevel::Low => "#90EE90",
            DemandLevel::Moderate => "#FFD700",
            DemandLevel::High => "#FFA500",
            DemandLevel::VeryHigh => "#FF4500",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DemandLevel::None => "None",
            DemandLevel::SupplyOnly => "Supply Only",
            DemandLevel::UnmetDemand => "High Unmet Demand",
            DemandLevel::Low => "Low",
            DemandLevel::Moderate => "Moderate",
            DemandLevel::High => "High",
            DemandLevel::VeryHigh => "Very High",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DemandHexagon {
    #[serde(skip)]
    pub cell: CellIndex,
    pub center: Location,
    pub taxi_count: usize,
    pub order_count: usize,
    /// Orders per taxi. `None` when there are no taxis and no orders
    /// (nothing to report); `-1` on the wire when taxis are zero but
    /// orders are not (infinite, unmet demand).
    pub ratio: Option<f64>,
    pub color: &'static str,
    pub level: &'static str,
}

/// Recompute every hexagon's counts from a fresh snapshot of taxis and
/// pending orders. Called once per demand-broadcast tick.
pub fn recount(grid: &HexGrid, resolution: Resolution, taxis: &[Taxi], orders: &[Order]) -> Vec<DemandHexagon> {
    let mut hexagons: Vec<DemandHexagon> = grid
        .cells()
        .iter()
        .map(|c| DemandHexagon {
            cell: c.cell,
            center: c.center,
            taxi_count: 0,
            order_count: 0,
            ratio: None,
            color: DemandLevel::None.color(),
            level: DemandLevel::None.label(),
        })
        .collect();

    for taxi in taxis {
        if taxi.status != TaxiStatus::Free {
            continue;
        }
        if let Some(cell) = grid.containing(taxi.location, resolution) {
            if let Some(idx) = grid.index_of(cell) {
                hexagons[idx].taxi_count += 1;
            }
        }
    }

    for order in orders {
        if order.status != OrderStatus::Pending {
            continue;
        }
        if let Some(cell) = grid.containing(order.pickup, resolution) {
            if let Some(idx) = grid.index_of(cell) {
                hexagons[idx].order_count += 1;
            }
        }
    }

    for h in hexagons.iter_mut() {
        let level = band(h.taxi_count, h.order_count);
        h.ratio = ratio(h.taxi_count, h.order_count);
        h.color = level.color();
        h.level = level.label();
    }

    hexagons
}

fn ratio(taxi_count: usize, order_count: usize) -> Option<f64> {
    if taxi_count == 0 && order_count == 0 {
        None
    } else if taxi_count == 0 {
        Some(-1.0)
    } else {
        Some(order_count as f64 / taxi_count as f64)
    }
}

fn band(taxi_count: usize, order_count: usize) -> DemandLevel {
    if taxi_count == 0 && order_count == 0 {
        return DemandLevel::None;
    }
    if order_count == 0 {
        return DemandLevel::SupplyOnly;
    }
    if taxi_count == 0 {
        return DemandLevel::UnmetDemand;
    }
    let ratio = order_count as f64 / taxi_count as f64;
    if ratio < 0.5 {
        DemandLevel::Low
    } else if ratio < 1.0 {
        DemandLevel::Moderate
    } else if ratio < 2.0 {
        DemandLevel::High
    } else {
        DemandLevel::VeryHigh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_zero_bands_as_none() {
        assert_eq!(band(0, 0), DemandLevel::None);
        assert_eq!(ratio(0, 0), None);
    }

    #[test]
    fn taxis_with_no_orders_is_supply_only() {
        assert_eq!(band(3, 0), DemandLevel::SupplyOnly);
    }

    #[test]
    fn orders_with_no_taxis_is_unmet_demand_with_sentinel_ratio() {
        assert_eq!(band(0, 4), DemandLevel::UnmetDemand);
        assert_eq!(ratio(0, 4), Some(-1.0));
    }

    #[test]
    fn ratio_bands_follow_the_configured_thresholds() {
        assert_eq!(band(10, 4), DemandLevel::Low); // 0.4
        assert_eq!(band(10, 9), DemandLevel::Moderate); // 0.9
        assert_eq!(band(10, 15), DemandLevel::High); // 1.5
        assert_eq!(band(10, 25), DemandLevel::VeryHigh); // 2.5
    }
}
