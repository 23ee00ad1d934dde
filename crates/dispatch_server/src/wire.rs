//! Wire DTOs for the subscriber channel.
//!
//! Kept separate from [`dispatch_core::model`] and [`dispatch_core::demand`]
//! on purpose: the store's internal representation (newtype ids, `Option`
//! ratios that mean "nothing to report") and the wire's display projection
//! (lower-case status strings, `-1` for infinite ratios) are different
//! concerns.

use h3o::Resolution;
use serde::{Deserialize, Serialize};

use dispatch_core::demand::DemandHexagon;
use dispatch_core::geo::Location;
use dispatch_core::matching::MatchMode;
use dispatch_core::model::{Assignment, Order, OrderId, OrderStatus, Route, Taxi, TaxiStatus};
use dispatch_core::store::Snapshot;

#[derive(Debug, Serialize)]
pub struct LocationDto {
    pub lat: f64,
    pub lng: f64,
}

impl From<Location> for LocationDto {
    fn from(loc: Location) -> Self {
        Self {
            lat: loc.lat,
            lng: loc.lng,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaxiDto {
    pub id: u64,
    pub location: LocationDto,
    pub status: &'static str,
}

impl From<&Taxi> for TaxiDto {
    fn from(taxi: &Taxi) -> Self {
        Self {
            id: taxi.id.0,
            location: taxi.location.into(),
            status: match taxi.status {
                TaxiStatus::Free => "free",
                TaxiStatus::Busy => "busy",
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDto {
    pub id: u64,
    pub pickup: LocationDto,
    pub dropoff: LocationDto,
    pub status: &'static str,
}

impl From<&Order> for OrderDto {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.0,
            pickup: order.pickup.into(),
            dropoff: order.dropoff.into(),
            status: match order.status {
                OrderStatus::Pending => "pending",
                OrderStatus::Assigned => "assigned",
                OrderStatus::Completed => "completed",
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RouteDto {
    pub path: Vec<(f64, f64)>,
    pub duration: f64,
}

impl From<&Route> for RouteDto {
    fn from(route: &Route) -> Self {
        Self {
            path: route.path.clone(),
            duration: route.duration,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssignmentDto {
    pub taxi_id: u64,
    pub order_id: u64,
    pub to_pickup_route: RouteDto,
    pub to_dropoff_route: RouteDto,
    pub algorithm_used: &'static str,
}

impl From<&Assignment> for AssignmentDto {
    fn from(assignment: &Assignment) -> Self {
        Self {
            taxi_id: assignment.taxi_id.0,
            order_id: assignment.order_id.0,
            to_pickup_route: (&assignment.to_pickup_route).into(),
            to_dropoff_route: (&assignment.to_dropoff_route).into(),
            algorithm_used: assignment.algorithm_used.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StateUpdateMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub taxis: Vec<TaxiDto>,
    pub orders: Vec<OrderDto>,
    pub assignments: Vec<AssignmentDto>,
}

impl From<&Snapshot> for StateUpdateMessage {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            kind: "state_update",
            taxis: snapshot.taxis.iter().map(TaxiDto::from).collect(),
            orders: snapshot.orders.iter().map(OrderDto::from).collect(),
            assignments: snapshot
                .assignments
                .iter()
                .map(AssignmentDto::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HexagonDto {
    pub hex_id: String,
    pub center: (f64, f64),
    pub boundary: Vec<(f64, f64)>,
    pub orders_count: usize,
    pub taxis_count: usize,
    /// `0` when the cell has neither orders nor taxis, `-1` when orders
    /// exist with no taxis (infinite ratio), else `orders / taxis`.
    pub demand_ratio: f64,
    pub color: &'static str,
    pub demand_level: &'static str,
}

fn hexagon_dto(hex: &DemandHexagon, boundary: &[Location]) -> HexagonDto {
    HexagonDto {
        hex_id: hex.cell.to_string(),
        center: (hex.center.lat, hex.center.lng),
        boundary: boundary.iter().map(|l| (l.lat, l.lng)).collect(),
        orders_count: hex.order_count,
        taxis_count: hex.taxi_count,
        demand_ratio: hex.ratio.unwrap_or(0.0),
        color: hex.color,
        demand_level: hex.level,
    }
}

#[derive(Debug, Serialize)]
pub struct DemandUpdateMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub hexagons: Vec<HexagonDto>,
    pub total_hexagons: usize,
    pub active_hexagons: usize,
    pub h3_resolution: u8,
}

/// Build a [`DemandUpdateMessage`] from a fresh recount. `boundaries` maps
/// 1:1 with `hexagons` by index — both come from iterating the same
/// [`dispatch_core::hexgrid::HexGrid`] in the same order.
pub fn demand_update_message(
    hexagons: &[DemandHexagon],
    boundaries: &[Vec<Location>],
    resolution: Resolution,
) -> DemandUpdateMessage {
    DemandUpdateMessage {
        kind: "demand_update",
        hexagons: hexagons
            .iter()
            .zip(boundaries.iter())
            .map(|(h, b)| hexagon_dto(h, b))
            .collect(),
        total_hexagons: hexagons.len(),
        active_hexagons: hexagons.len(),
        h3_resolution: u8::from(resolution),
    }
}

/// Inbound messages accepted from a subscriber.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    CompleteAssignment {
        #[serde(deserialize_with = "order_id_from_wire")]
        order_id: OrderId,
    },
    AlgorithmConfig {
        proximity: bool,
        supply_demand: bool,
    },
}

impl InboundMessage {
    pub fn into_mode(proximity: bool, supply_demand: bool) -> MatchMode {
        MatchMode::from_flags(proximity, supply_demand)
    }
}

/// `order_id` arrives as either a bare integer or a numeric string
/// (`"order_7"`); accept both rather than guessing which the client
/// actually sends.
fn order_id_from_wire<'de, D>(deserializer: D) -> Result<OrderId, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Num(u64),
        Str(String),
    }

    match Wire::deserialize(deserializer)? {
        Wire::Num(n) => Ok(OrderId(n)),
        Wire::Str(s) => s
            .trim_start_matches("order_")
            .parse::<u64>()
            .map(OrderId)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch_core::geo::Location;
    use dispatch_core::model::{OrderId as CoreOrderId, TaxiId};

    #[test]
    fn taxi_status_serializes_lowercase() {
        let taxi = Taxi {
            id: TaxiId(1),
            location: Location::new(51.1, 71.4),
            status: TaxiStatus::Free,
        };
        let dto = TaxiDto::from(&taxi);
        let json = serde_json::to_string(&dto).unwrap();
        assert!(json.contains("\"status\":\"free\""));
    }

    #[test]
    fn demand_ratio_none_maps_to_zero_on_the_wire() {
        let cell = dispatch_core::geo::cell_of(Location::new(51.1, 71.4), Resolution::Seven)
            .expect("valid coordinates");
        let hex = DemandHexagon {
            cell,
            center: Location::new(51.1, 71.4),
            taxi_count: 0,
            order_count: 0,
            ratio: None,
            color: "#F0F0F0",
            level: "None",
        };
        let dto = hexagon_dto(&hex, &[]);
        assert_eq!(dto.demand_ratio, 0.0);
    }

    #[test]
    fn demand_ratio_infinite_sentinel_is_preserved_as_minus_one() {
        let cell = dispatch_core::geo::cell_of(Location::new(51.1, 71.4), Resolution::Seven)
            .expect("valid coordinates");
        let hex = DemandHexagon {
            cell,
            center: Location::new(51.1, 71.4),
            taxi_count: 0,
            order_count: 4,
            ratio: Some(-1.0),
            color: "#FF4500",
            level: "High Unmet Demand",
        };
        let dto = hexagon_dto(&hex, &[]);
        assert_eq!(dto.demand_ratio, -1.0);
    }

    #[test]
    fn complete_assignment_accepts_bare_numbers_and_prefixed_strings() {
        let numeric: InboundMessage =
            serde_json::from_str(r#"{"type":"complete_assignment","order_id":7}"#).unwrap();
        let stringy: InboundMessage = serde_json::from_str(
            r#"{"type":"complete_assignment","order_id":"order_7"}"#,
        )
        .unwrap();
        match (numeric, stringy) {
            (
                InboundMessage::CompleteAssignment { order_id: a },
                InboundMessage::CompleteAssignment { order_id: b },
            ) => {
                assert_eq!(a, CoreOrderId(7));
                assert_eq!(b, CoreOrderId(7));
            }
            _ => panic!("expected CompleteAssignment variants"),
        }
    }

    #[test]
    fn algorithm_config_maps_both_false_to_proximity() {
        let msg: InboundMessage = serde_json::from_str(
            r#"{"type":"algorithm_config","proximity":false,"supply_demand":false}"#,
        )
        .unwrap();
        match msg {
            InboundMessage::AlgorithmConfig {
                proximity,
                supply_demand,
            } => {
                assert_eq!(
                    InboundMessage::into_mode(proximity, supply_demand),
                    MatchMode::Proximity
                );
            }
            _ => panic!("expected AlgorithmConfig"),
        }
    }

    #[test]
    fn assignment_dto_renders_the_algorithm_label() {
        use dispatch_core::model::{MatchAlgorithm, Route};

        let assignment = Assignment {
            taxi_id: TaxiId(1),
            order_id: CoreOrderId(1),
            to_pickup_route: Route {
                path: vec![(0.0, 0.0), (0.1, 0.1)],
                duration: 10.0,
            },
            to_dropoff_route: Route {
                path: vec![(0.1, 0.1), (0.2, 0.2)],
                duration: 20.0,
            },
            algorithm_used: MatchAlgorithm::Hybrid,
        };
        let dto = AssignmentDto::from(&assignment);
        assert_eq!(dto.algorithm_used, "hybrid");
    }
}
