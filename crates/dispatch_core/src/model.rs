//! Core data model: taxis, orders, routes, and assignments.
//!
//! These are the entities the state store ([`crate::store`]) owns. Status
//! enums intentionally have no `Default` impl — every entity is created in
//! an explicit initial state by the component that creates it (the
//! generator for orders, the store's startup seeding for taxis).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::Location;

/// Stable taxi identifier, assigned once at fleet startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaxiId(pub u64);

impl fmt::Display for TaxiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "taxi_{}", self.0)
    }
}

/// Monotonically increasing order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxiStatus {
    Free,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Assigned,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Taxi {
    pub id: TaxiId,
    pub location: Location,
    pub status: TaxiStatus,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub pickup: Location,
    pub dropoff: Location,
    pub status: OrderStatus,
}

/// A road-network route: an ordered polyline plus an advisory duration.
///
/// `duration` is informational only — the engine never uses
/// it for correctness, only to report it to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub path: Vec<(f64, f64)>,
    pub duration: f64,
}

impl Route {
    /// The route's final waypoint, used to snap a taxi's location on trip
    /// completion.
    pub fn last_point(&self) -> Location {
        let (lat, lng) = *self.path.last().expect("route path is never empty");
        Location::new(lat, lng)
    }
}

/// Which cost function produced an assignment, recorded for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchAlgorithm {
    Proximity,
    Demand,
    Hybrid,
}

impl MatchAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchAlgorithm::Proximity => "proximity",
            MatchAlgorithm::Demand => "demand",
            MatchAlgorithm::Hybrid => "hybrid",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub taxi_id: TaxiId,
    pub order_id: OrderId,
    pub to_pickup_route: Route,
    pub to_dropoff_route: Route,
    pub algorithm_used: MatchAlgorithm,
}
