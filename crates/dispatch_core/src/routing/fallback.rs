//! Deterministic straight-line route, used whenever the provider is
//! disabled or every retry has been exhausted.
//!
//! The engine must always produce a route for a pairing —
//! a taxi can't be assigned a trip with nowhere to drive.

use crate::config::ROUTE_FALLBACK_POINTS;
use crate::geo::Location;
use crate::model::Route;

/// Build a straight-line route of [`ROUTE_FALLBACK_POINTS`] evenly spaced
/// waypoints between `from` and `to`, with a fixed advisory duration.
pub fn build_fallback_route(from: Location, to: Location) -> Route {
    let n = ROUTE_FALLBACK_POINTS;
    let path = (0..n)
        .map(|i| {
            let t = i as f64 / (n - 1) as f64;
            let lat = from.lat + (to.lat - from.lat) * t;
            let lng = from.lng + (to.lng - from.lng) * t;
            (lat, lng)
        })
        .collect();
    Route {
        path,
        duration: crate::config::ROUTE_FALLBACK_DURATION_SECS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_route_starts_and_ends_at_the_given_points() {
        let from = Location::new(51.1, 71.4);
        let to = Location::new(51.2, 71.5);
        let route = build_fallback_route(from, to);
        assert_eq!(route.path.len(), ROUTE_FALLBACK_POINTS);
        assert_eq!(route.path[0], (from.lat, from.lng));
        assert_eq!(route.path[route.path.len() - 1], (to.lat, to.lng));
        assert_eq!(route.duration, 60.0);
    }
}
