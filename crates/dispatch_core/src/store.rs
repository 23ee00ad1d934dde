//! The sole owner of taxis, orders, and assignments.
//!
//! Every mutation goes through a method here so the invariants in
//! [`crate::model`] — a taxi is `Busy` iff exactly one assignment
//! references it, an order is `Assigned` iff exactly one assignment
//! references it — hold at every observation point. Reads for broadcast
//! take a read guard and clone, so a snapshot is always internally
//! consistent.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;
use tokio::sync::RwLock;
use tracing::error;

use crate::config::Config;
use crate::error::{DispatchError, Result};
use crate::geo::Location;
use crate::model::{Assignment, Order, OrderId, OrderStatus, Route, Taxi, TaxiId, TaxiStatus};

/// Seed a fresh fleet of `config.max_taxis` taxis at random positions
/// inside the spawn square around `config.center`. Taxi ids run
/// `1..=max_taxis`.
pub fn spawn_fleet(config: &Config) -> Vec<Taxi> {
    let mut rng = rand::thread_rng();
    (1..=config.max_taxis as u64)
        .map(|id| {
            let lat = config.center.lat
                + rng.gen_range(-config.spawn_half_width_deg..=config.spawn_half_width_deg);
            let lng = config.center.lng
                + rng.gen_range(-config.spawn_half_width_deg..=config.spawn_half_width_deg);
            Taxi {
                id: TaxiId(id),
                location: Location::new(lat, lng),
                status: TaxiStatus::Free,
            }
        })
        .collect()
}

#[derive(Default)]
struct Inner {
    taxis: HashMap<TaxiId, Taxi>,
    orders: BTreeMap<OrderId, Order>,
    assignments: HashMap<OrderId, Assignment>,
    next_order_id: u64,
}

pub struct Store {
    inner: RwLock<Inner>,
    max_pending_orders: usize,
    max_completed_orders: usize,
}

/// Point-in-time view of the store, used for broadcasting and for the
/// demand aggregator's recount pass.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub taxis: Vec<Taxi>,
    pub orders: Vec<Order>,
    pub assignments: Vec<Assignment>,
}

impl Store {
    pub fn new(max_pending_orders: usize, max_completed_orders: usize) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            max_pending_orders,
            max_completed_orders,
        }
    }

    /// Seed the fleet at startup. Not subject to the pending-order
    /// admission cap — that only governs orders.
    pub async fn seed_taxis(&self, taxis: impl IntoIterator<Item = Taxi>) {
        let mut guard = self.inner.write().await;
        for taxi in taxis {
            guard.taxis.insert(taxi.id, taxi);
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        let guard = self.inner.read().await;
        Snapshot {
            taxis: guard.taxis.values().cloned().collect(),
            orders: guard.orders.values().cloned().collect(),
            assignments: guard.assignments.values().cloned().collect(),
        }
    }

    pub async fn free_taxis(&self) -> Vec<Taxi> {
        let guard = self.inner.read().await;
        guard
            .taxis
            .values()
            .filter(|t| t.status == TaxiStatus::Free)
            .cloned()
            .collect()
    }

    pub async fn pending_orders(&self) -> Vec<Order> {
        let guard = self.inner.read().await;
        guard
            .orders
            .values()
            .filter(|o| o.status == OrderStatus::Pending)
            .cloned()
            .collect()
    }

    pub async fn pending_order_count(&self) -> usize {
        let guard = self.inner.read().await;
        guard
            .orders
            .values()
            .filter(|o| o.status == OrderStatus::Pending)
            .count()
    }

    /// Admit a new order if the pending cap allows it, and prune completed
    /// orders down to the retention bound by lowest id. Returns `None` if
    /// the admission cap is full.
    pub async fn admit_order(&self, pickup: Location, dropoff: Location) -> Option<OrderId> {
        let mut guard = self.inner.write().await;
        let pending = guard
            .orders
            .values()
            .filter(|o| o.status == OrderStatus::Pending)
            .count();
        if pending >= self.max_pending_orders {
            return None;
        }

        let id = OrderId(guard.next_order_id);
        guard.next_order_id += 1;
        guard.orders.insert(
            id,
            Order {
                id,
                pickup,
                dropoff,
                status: OrderStatus::Pending,
            },
        );

        prune_completed(&mut guard.orders, self.max_completed_orders);
        Some(id)
    }

    /// Transition a free taxi and a pending order into `Busy`/`Assigned`
    /// together. Aborts (and leaves state untouched) if either precondition
    /// doesn't hold.
    pub async fn commit_match(&self, taxi_id: TaxiId, order_id: OrderId) -> Result<()> {
        let mut guard = self.inner.write().await;

        let taxi_ok = guard
            .taxis
            .get(&taxi_id)
            .map(|t| t.status == TaxiStatus::Free)
            .unwrap_or(false);
        let order_ok = guard
            .orders
            .get(&order_id)
            .map(|o| o.status == OrderStatus::Pending)
            .unwrap_or(false);

        if !taxi_ok {
            error!(?taxi_id, "matcher tried to commit a non-free taxi");
            return Err(DispatchError::TaxiNotFree(taxi_id));
        }
        if !order_ok {
            error!(?order_id, "matcher tried to commit a non-pending order");
            return Err(DispatchError::OrderNotPending(order_id));
        }

        guard.taxis.get_mut(&taxi_id).unwrap().status = TaxiStatus::Busy;
        guard.orders.get_mut(&order_id).unwrap().status = OrderStatus::Assigned;
        Ok(())
    }

    /// Record a fully-routed assignment after `commit_match` has already
    /// flipped the taxi/order statuses.
    pub async fn insert_assignment(&self, assignment: Assignment) {
        let mut guard = self.inner.write().await;
        guard
            .assignments
            .insert(assignment.order_id, assignment);
    }

    /// Snap the taxi to the dropoff route's last point, free it, complete
    /// the order, and drop the assignment record. A no-op for an unknown
    /// or already-completed order id.
    pub async fn complete_assignment(&self, order_id: OrderId) {
        let mut guard = self.inner.write().await;
        let Some(assignment) = guard.assignments.remove(&order_id) else {
            return;
        };
        let last = assignment.to_dropoff_route.last_point();
        if let Some(taxi) = guard.taxis.get_mut(&assignment.taxi_id) {
            taxi.location = last;
            taxi.status = TaxiStatus::Free;
        }
        if let Some(order) = guard.orders.get_mut(&order_id) {
            order.status = OrderStatus::Completed;
        }
        prune_completed(&mut guard.orders, self.max_completed_orders);
    }

    /// Invoked by the broadcast fabric once its subscriber registry empties:
    /// delete every pending order, clear all assignments, and free every
    /// taxi. Completed orders are retained.
    pub async fn cleanup_idle(&self) {
        let mut guard = self.inner.write().await;
        guard.orders.retain(|_, o| o.status != OrderStatus::Pending);
        guard.assignments.clear();
        for taxi in guard.taxis.values_mut() {
            taxi.status = TaxiStatus::Free;
        }
    }

    #[cfg(test)]
    pub async fn assignment_count(&self) -> usize {
        self.inner.read().await.assignments.len()
    }
}

fn prune_completed(orders: &mut BTreeMap<OrderId, Order>, retention: usize) {
    let mut completed: Vec<OrderId> = orders
        .values()
        .filter(|o| o.status == OrderStatus::Completed)
        .map(|o| o.id)
        .collect();
    completed.sort();
    if completed.len() > retention {
        for id in &completed[..completed.len() - retention] {
            orders.remove(id);
        }
    }
}
