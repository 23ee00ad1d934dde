//! # Dispatch Engine Core
//!
//! The dispatch engine behind a real-time taxi simulation: a periodic
//! matching loop that pairs pending orders with free taxis, an H3-indexed
//! demand/supply aggregator, and a route-acquisition client with provider
//! key rotation and a deterministic fallback.
//!
//! ## Key concepts
//!
//! - **State store**: the sole owner of taxis, orders, and assignments.
//!   Every mutation goes through its methods so the lifecycle invariants in
//!   [`model`] hold after every tick.
//! - **Demand aggregation**: a fixed hexagonal tiling recomputed every tick
//!   from a store snapshot, never mutated by the matcher.
//! - **Matching**: three selectable cost functions over a rectangular cost
//!   matrix, solved with the Hungarian algorithm.
//! - **Routing**: every pairing gets two routes (to pickup, to dropoff) from
//!   an external provider that always produces a route, even on failure.

pub mod config;
pub mod demand;
pub mod error;
pub mod generator;
pub mod geo;
pub mod hexgrid;
pub mod matching;
pub mod model;
pub mod routing;
pub mod store;
