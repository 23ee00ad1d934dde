//! Subscriber registry and multicast fabric.
//!
//! Each subscriber is represented by an unbounded channel the connection
//! task drains into its WebSocket. A send that fails (the receiver was
//! dropped — the connection task exited) removes that subscriber; when the
//! registry empties, the store is swept back to idle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use h3o::Resolution;
use tokio::sync::{mpsc, RwLock};
use tracing::{error, info};

use dispatch_core::demand;
use dispatch_core::hexgrid::HexGrid;
use dispatch_core::store::Store;

use crate::wire::{demand_update_message, StateUpdateMessage};

pub type SubscriberId = u64;

/// Registry of connected subscribers plus the two serialize-and-multicast
/// operations the supervisor's periodic tasks drive.
pub struct Hub {
    store: Arc<Store>,
    subscribers: RwLock<HashMap<SubscriberId, mpsc::UnboundedSender<String>>>,
    next_id: AtomicU64,
}

impl Hub {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a new subscriber, returning its id and the receiving half
    /// of its outbound channel.
    pub async fn subscribe(&self) -> (SubscriberId, mpsc::UnboundedReceiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.write().await.insert(id, tx);
        info!(subscriber_id = id, "subscriber connected");
        (id, rx)
    }

    /// Drop a subscriber from the registry. A no-op if it's already gone.
    /// If this empties the registry, enters idle mode.
    pub async fn unsubscribe(&self, id: SubscriberId) {
        let became_empty = {
            let mut guard = self.subscribers.write().await;
            if guard.remove(&id).is_none() {
                return;
            }
            guard.is_empty()
        };
        info!(subscriber_id = id, "subscriber disconnected");
        if became_empty {
            info!("subscriber registry is empty, entering idle mode");
            self.store.cleanup_idle().await;
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.subscribers.read().await.is_empty()
    }

    async fn send_all(&self, text: String) {
        let dead: Vec<SubscriberId> = {
            let guard = self.subscribers.read().await;
            guard
                .iter()
                .filter_map(|(&id, tx)| tx.send(text.clone()).err().map(|_| id))
                .collect()
        };
        for id in dead {
            self.unsubscribe(id).await;
        }
    }

    /// Serialize the full state snapshot and multicast it.
    pub async fn broadcast_state(&self) {
        let snapshot = self.store.snapshot().await;
        let message = StateUpdateMessage::from(&snapshot);
        match serde_json::to_string(&message) {
            Ok(text) => self.send_all(text).await,
            Err(err) => error!(%err, "failed to serialize state_update"),
        }
    }

    /// Recount demand over `grid` and multicast it.
    pub async fn broadcast_demand(&self, grid: &HexGrid, resolution: Resolution) {
        let snapshot = self.store.snapshot().await;
        let hexagons = demand::recount(grid, resolution, &snapshot.taxis, &snapshot.orders);
        let boundaries: Vec<_> = grid.cells().iter().map(|c| c.boundary.clone()).collect();
        let message = demand_update_message(&hexagons, &boundaries, resolution);
        match serde_json::to_string(&message) {
            Ok(text) => self.send_all(text).await,
            Err(err) => error!(%err, "failed to serialize demand_update"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::config::Config;

    fn store() -> Arc<Store> {
        Arc::new(Store::new(10, 2))
    }

    #[tokio::test]
    async fn subscribe_then_unsubscribe_empties_the_registry() {
        let hub = Hub::new(store());
        assert!(hub.is_empty().await);
        let (id, _rx) = hub.subscribe().await;
        assert!(!hub.is_empty().await);
        hub.unsubscribe(id).await;
        assert!(hub.is_empty().await);
    }

    #[tokio::test]
    async fn a_dropped_receiver_is_pruned_on_next_send() {
        let hub = Hub::new(store());
        let (_id, rx) = hub.subscribe().await;
        drop(rx);
        hub.broadcast_state().await;
        assert!(hub.is_empty().await);
    }

    #[tokio::test]
    async fn last_unsubscribe_clears_pending_orders_and_frees_taxis() {
        use dispatch_core::geo::Location;
        use dispatch_core::model::{Taxi, TaxiId, TaxiStatus};

        let store = store();
        store
            .seed_taxis([Taxi {
                id: TaxiId(1),
                location: Location::new(0.0, 0.0),
                status: TaxiStatus::Busy,
            }])
            .await;
        store
            .admit_order(Location::new(0.0, 0.0), Location::new(0.0, 0.0))
            .await;

        let hub = Hub::new(store.clone());
        let (id, _rx) = hub.subscribe().await;
        hub.unsubscribe(id).await;

        let snapshot = store.snapshot().await;
        assert!(snapshot.taxis.iter().all(|t| t.status == TaxiStatus::Free));
        assert!(snapshot
            .orders
            .iter()
            .all(|o| o.status != dispatch_core::model::OrderStatus::Pending));
    }

    #[tokio::test]
    async fn broadcast_state_reaches_every_live_subscriber() {
        let store = store();
        let hub = Hub::new(store);
        let (_id1, mut rx1) = hub.subscribe().await;
        let (_id2, mut rx2) = hub.subscribe().await;

        hub.broadcast_state().await;

        let msg1 = rx1.recv().await.expect("subscriber 1 receives a message");
        let msg2 = rx2.recv().await.expect("subscriber 2 receives a message");
        assert!(msg1.contains("\"type\":\"state_update\""));
        assert_eq!(msg1, msg2);
    }

    #[tokio::test]
    async fn broadcast_demand_reports_the_full_tiling() {
        let store = store();
        let hub = Hub::new(store);
        let (_id, mut rx) = hub.subscribe().await;
        let config = Config::default();
        let grid = HexGrid::build(&config);

        hub.broadcast_demand(&grid, config.h3_resolution).await;

        let msg = rx.recv().await.expect("demand broadcast received");
        assert!(msg.contains("\"type\":\"demand_update\""));
        assert!(msg.contains("\"total_hexagons\""));
    }
}
