//! Loop supervisor: three cooperative periodic tasks.
//!
//! Each task owns an interval timer and a clone of the shared shutdown
//! flag. Cancellation is cooperative — no `tokio_util::CancellationToken`,
//! just a `watch<bool>` polled between ticks, so an in-flight tick always
//! finishes before the task exits.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::interval;
use tracing::info;

use dispatch_core::config::Config;
use dispatch_core::generator::OrderGenerator;
use dispatch_core::hexgrid::HexGrid;
use dispatch_core::matching::Matcher;
use dispatch_core::routing::RoutingClient;
use dispatch_core::store::Store;

use crate::broadcast::Hub;

/// Shared handles every periodic task needs. Cheap to clone (everything
/// inside is an `Arc`).
#[derive(Clone)]
pub struct Engine {
    pub store: Arc<Store>,
    pub grid: Arc<HexGrid>,
    pub config: Arc<Config>,
    pub matcher: Arc<Matcher>,
    pub routing: Arc<RoutingClient>,
    pub generator: Arc<OrderGenerator>,
    pub hub: Arc<Hub>,
}

/// Spawn the generator, matcher, and demand-broadcaster tasks. Returns
/// their join handles so the caller can await them during shutdown.
pub fn spawn_supervisor(
    engine: Engine,
    shutdown: watch::Receiver<bool>,
) -> Vec<tokio::task::JoinHandle<()>> {
    vec![
        tokio::spawn(generator_task(engine.clone(), shutdown.clone())),
        tokio::spawn(matcher_task(engine.clone(), shutdown.clone())),
        tokio::spawn(demand_task(engine, shutdown)),
    ]
}

async fn should_stop(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow()
}

/// period 3s: create one order, then broadcast state.
async fn generator_task(engine: Engine, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(std::time::Duration::from_secs(
        dispatch_core::config::GENERATOR_PERIOD_SECS,
    ));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if should_stop(&shutdown).await {
                    break;
                }
                if engine.hub.is_empty().await {
                    continue;
                }
                engine.generator.generate(&engine.store).await;
                engine.hub.broadcast_state().await;
            }
            _ = shutdown.changed() => {
                if should_stop(&shutdown).await {
                    break;
                }
            }
        }
    }
    info!("generator task shutting down");
}

/// period 5s: run `assign()`, broadcast state if any pairs were made.
async fn matcher_task(engine: Engine, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(std::time::Duration::from_secs(
        dispatch_core::config::MATCHER_PERIOD_SECS,
    ));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if should_stop(&shutdown).await {
                    break;
                }
                if engine.hub.is_empty().await {
                    continue;
                }
                let assignments = engine
                    .matcher
                    .assign(
                        &engine.store,
                        &engine.grid,
                        engine.config.h3_resolution,
                        &engine.routing,
                    )
                    .await;
                if !assignments.is_empty() {
                    engine.hub.broadcast_state().await;
                }
            }
            _ = shutdown.changed() => {
                if should_stop(&shutdown).await {
                    break;
                }
            }
        }
    }
    info!("matcher task shutting down");
}

/// period 2s: recount demand and broadcast it.
async fn demand_task(engine: Engine, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(std::time::Duration::from_secs(
        dispatch_core::config::DEMAND_BROADCAST_PERIOD_SECS,
    ));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if should_stop(&shutdown).await {
                    break;
                }
                if engine.hub.is_empty().await {
                    continue;
                }
                engine
                    .hub
                    .broadcast_demand(&engine.grid, engine.config.h3_resolution)
                    .await;
            }
            _ = shutdown.changed() => {
                if should_stop(&shutdown).await {
                    break;
                }
            }
        }
    }
    info!("demand broadcaster task shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::config::RoutingConfig;

    fn test_engine() -> Engine {
        let config = Arc::new(Config::default().with_max_taxis(1));
        let store = Arc::new(Store::new(config.max_pending_orders, config.max_completed_orders));
        let grid = Arc::new(HexGrid::build(&config));
        let hub = Arc::new(Hub::new(store.clone()));
        Engine {
            store,
            grid,
            matcher: Arc::new(Matcher::new(config.match_mode)),
            routing: Arc::new(RoutingClient::new(&RoutingConfig {
                enabled: false,
                ..Default::default()
            })),
            generator: Arc::new(OrderGenerator::new(&config)),
            config,
            hub,
        }
    }

    #[tokio::test]
    async fn generator_task_skips_work_while_idle_and_runs_once_subscribed() {
        let engine = test_engine();
        let (_tx, rx) = watch::channel(false);

        tokio::time::pause();
        let handle = tokio::spawn(generator_task(engine.clone(), rx));
        tokio::time::advance(std::time::Duration::from_secs(4)).await;
        tokio::task::yield_now().await;

        // No subscribers: idle, no order created.
        assert_eq!(engine.store.pending_order_count().await, 0);

        let _subscriber = engine.hub.subscribe().await;
        tokio::time::advance(std::time::Duration::from_secs(4)).await;
        tokio::task::yield_now().await;

        assert_eq!(engine.store.pending_order_count().await, 1);
        handle.abort();
    }

    #[tokio::test]
    async fn shutdown_signal_stops_the_demand_task_between_ticks() {
        let engine = test_engine();
        let (tx, rx) = watch::channel(false);
        let _subscriber = engine.hub.subscribe().await;

        tokio::time::pause();
        let handle = tokio::spawn(demand_task(engine.clone(), rx));
        tx.send(true).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("task exits promptly after shutdown")
            .unwrap();
    }
}
