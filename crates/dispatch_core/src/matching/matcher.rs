//! Matcher orchestration: build the cost matrix, solve it, and commit the
//! kept pairs through the store, attaching routes as each pair is enacted.
//!
//! All three matching modes share this commit-then-route shape, differing
//! only in the cost function built by [`super::cost::build_cost_matrix`].

use h3o::Resolution;
use tokio::sync::RwLock;
use tracing::info;

use crate::demand::{self, DemandHexagon};
use crate::hexgrid::HexGrid;
use crate::model::{Assignment, OrderId};
use crate::routing::RoutingClient;
use crate::store::Store;

use super::cost::build_cost_matrix;
use super::solver::solve_assignment;
use super::types::MatchMode;

/// Runs one matching pass per call to [`Matcher::assign`]. Mode is mutable
/// at runtime (an `algorithm_config` message can switch it) behind a lock of
/// its own, separate from the state store.
pub struct Matcher {
    mode: RwLock<MatchMode>,
}

impl Matcher {
    pub fn new(mode: MatchMode) -> Self {
        Self {
            mode: RwLock::new(mode),
        }
    }

    pub async fn mode(&self) -> MatchMode {
        *self.mode.read().await
    }

    pub async fn set_mode(&self, mode: MatchMode) {
        *self.mode.write().await = mode;
    }

    /// Recompute demand (if the active mode needs it), build the cost
    /// matrix, solve it, and commit/route every kept pair in turn. Returns
    /// the empty vector, with no store mutation, when there are no pending
    /// orders or no free taxis.
    pub async fn assign(
        &self,
        store: &Store,
        grid: &HexGrid,
        resolution: Resolution,
        routing: &RoutingClient,
    ) -> Vec<Assignment> {
        let taxis = store.free_taxis().await;
        let orders = store.pending_orders().await;
        if taxis.is_empty() || orders.is_empty() {
            return Vec::new();
        }

        let mode = self.mode().await;
        let hexagons: Vec<DemandHexagon> = if mode.uses_demand() {
            let snapshot = store.snapshot().await;
            demand::recount(grid, resolution, &snapshot.taxis, &snapshot.orders)
        } else {
            Vec::new()
        };

        let cost = build_cost_matrix(mode, &taxis, &orders, &hexagons, grid, resolution);
        let pairs = solve_assignment(&cost);

        let mut assignments = Vec::with_capacity(pairs.len());
        for (taxi_idx, order_idx) in pairs {
            let taxi = &taxis[taxi_idx];
            let order = &orders[order_idx];

            if store.commit_match(taxi.id, order.id).await.is_err() {
                // Invariant violation: another matcher tick already claimed
                // this taxi or order between the snapshot read above and
                // this commit. Skip the pair rather than partially commit it.
                continue;
            }

            info!(taxi_id = %taxi.id, order_id = %order.id, mode = ?mode, "constructing routes for assignment");
            let to_pickup_route = routing.route(taxi.location, order.pickup).await;
            let to_dropoff_route = routing.route(order.pickup, order.dropoff).await;

            let assignment = Assignment {
                taxi_id: taxi.id,
                order_id: order.id,
                to_pickup_route,
                to_dropoff_route,
                algorithm_used: mode.as_algorithm(),
            };
            store.insert_assignment(assignment.clone()).await;
            assignments.push(assignment);
        }

        assignments
    }

    /// Complete a trip: see [`Store::complete_assignment`]. Idempotent.
    pub async fn complete(&self, store: &Store, order_id: OrderId) {
        store.complete_assignment(order_id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::geo::Location;
    use crate::model::{OrderStatus, TaxiStatus};

    fn routing_disabled() -> RoutingClient {
        RoutingClient::new(&crate::config::RoutingConfig {
            enabled: false,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn empty_pending_or_empty_free_yields_no_assignments() {
        let store = Store::new(10, 2);
        let grid = HexGrid::build(&Config::default());
        let routing = routing_disabled();
        let matcher = Matcher::new(MatchMode::Proximity);

        let result = matcher
            .assign(&store, &grid, Resolution::Seven, &routing)
            .await;
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn scenario_1_single_taxi_single_order_gets_assigned_and_completes() {
        use crate::model::{Taxi, TaxiId};

        let store = Store::new(10, 2);
        store
            .seed_taxis([Taxi {
                id: TaxiId(1),
                location: Location::new(51.111, 71.416),
                status: TaxiStatus::Free,
            }])
            .await;
        store
            .admit_order(Location::new(51.120, 71.420), Location::new(51.130, 71.430))
            .await;

        let grid = HexGrid::build(&Config::default());
        let routing = routing_disabled();
        let matcher = Matcher::new(MatchMode::Proximity);

        let assignments = matcher
            .assign(&store, &grid, Resolution::Seven, &routing)
            .await;
        assert_eq!(assignments.len(), 1);
        let assignment = &assignments[0];
        assert_eq!(assignment.taxi_id, TaxiId(1));

        let order_id = assignment.order_id;
        matcher.complete(&store, order_id).await;

        let free = store.free_taxis().await;
        assert_eq!(free.len(), 1);
        assert_eq!(free[0].location, assignment.to_dropoff_route.last_point());

        let snapshot = store.snapshot().await;
        let order = snapshot.orders.iter().find(|o| o.id == order_id).unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn more_orders_than_taxis_assigns_at_most_the_taxi_count() {
        use crate::model::{Taxi, TaxiId};

        let store = Store::new(10, 2);
        store
            .seed_taxis([Taxi {
                id: TaxiId(1),
                location: Location::new(51.111, 71.416),
                status: TaxiStatus::Free,
            }])
            .await;
        store
            .admit_order(Location::new(51.120, 71.420), Location::new(51.130, 71.430))
            .await;
        store
            .admit_order(Location::new(51.050, 71.350), Location::new(51.060, 71.360))
            .await;

        let grid = HexGrid::build(&Config::default());
        let routing = routing_disabled();
        let matcher = Matcher::new(MatchMode::Proximity);

        let assignments = matcher
            .assign(&store, &grid, Resolution::Seven, &routing)
            .await;
        assert_eq!(assignments.len(), 1);
    }
}
