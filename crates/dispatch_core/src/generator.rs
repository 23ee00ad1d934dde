//! Periodic synthetic order creation.
//!
//! Sample a pickup within
//! the spawn square around the operational center, sample a dropoff within
//! the same square around the pickup, admit through the store (which
//! enforces the pending-order cap and prunes completed orders), and log
//! when admission is rejected.

use rand::Rng;
use tracing::warn;

use crate::config::Config;
use crate::geo::Location;
use crate::model::OrderId;
use crate::store::Store;

/// Creates one order per call, sampled around `config.center`.
pub struct OrderGenerator {
    center: Location,
    half_width_deg: f64,
}

impl OrderGenerator {
    pub fn new(config: &Config) -> Self {
        Self {
            center: config.center,
            half_width_deg: config.spawn_half_width_deg,
        }
    }

    /// Sample and admit one order. Returns `None` (and logs) if the
    /// pending-order cap is full; admission rejection is not an error,
    /// just a skipped tick.
    pub async fn generate(&self, store: &Store) -> Option<OrderId> {
        let pickup = sample_around(self.center, self.half_width_deg);
        let dropoff = sample_around(pickup, self.half_width_deg);

        match store.admit_order(pickup, dropoff).await {
            Some(id) => Some(id),
            None => {
                warn!("pending order cap reached, skipping order creation");
                None
            }
        }
    }
}

fn sample_around(center: Location, half_width_deg: f64) -> Location {
    let mut rng = rand::thread_rng();
    let lat = center.lat + rng.gen_range(-half_width_deg..=half_width_deg);
    let lng = center.lng + rng.gen_range(-half_width_deg..=half_width_deg);
    Location::new(lat, lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn generates_an_order_within_the_spawn_square() {
        let config = Config::default();
        let generator = OrderGenerator::new(&config);
        let store = Store::new(config.max_pending_orders, config.max_completed_orders);

        let id = generator.generate(&store).await;
        assert!(id.is_some());

        let snapshot = store.snapshot().await;
        let order = snapshot.orders.iter().find(|o| Some(o.id) == id).unwrap();
        assert!((order.pickup.lat - config.center.lat).abs() <= config.spawn_half_width_deg);
        assert!((order.pickup.lng - config.center.lng).abs() <= config.spawn_half_width_deg);
        assert!((order.dropoff.lat - order.pickup.lat).abs() <= config.spawn_half_width_deg);
    }

    #[tokio::test]
    async fn admission_cap_stops_new_orders() {
        let store = Store::new(1, 2);
        let config = Config::default();
        let generator = OrderGenerator::new(&config);

        let first = generator.generate(&store).await;
        let second = generator.generate(&store).await;
        assert!(first.is_some());
        assert!(second.is_none());
    }
}
