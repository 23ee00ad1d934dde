//! Geographic primitives: haversine distance and H3 cell lookups.
//!
//! Thin wrappers over `h3o`. H3 itself has no notion of great-circle
//! distance between two arbitrary points, so `distance_km` is hand-rolled.

use h3o::{CellIndex, LatLng, Resolution};

/// Earth radius used by the haversine formula, in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point in WGS84 decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    fn to_latlng(self) -> Option<LatLng> {
        LatLng::new(self.lat, self.lng).ok()
    }
}

/// Haversine distance between two locations, in kilometres.
pub fn distance_km(a: Location, b: Location) -> f64 {
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lng.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Resolve the H3 cell containing `loc` at the given resolution.
///
/// Returns `None` if `loc` does not hold valid WGS84 coordinates.
pub fn cell_of(loc: Location, resolution: Resolution) -> Option<CellIndex> {
    loc.to_latlng().map(|ll| ll.to_cell(resolution))
}

/// Centroid of an H3 cell.
pub fn cell_center(cell: CellIndex) -> Location {
    let ll: LatLng = cell.into();
    Location::new(ll.lat(), ll.lng())
}

/// Polygon boundary of an H3 cell, as an ordered ring of locations.
pub fn cell_boundary(cell: CellIndex) -> Vec<Location> {
    cell.boundary()
        .iter()
        .map(|ll| Location::new(ll.lat(), ll.lng()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_symmetric_and_zero_at_same_point() {
        let a = Location::new(51.111339, 71.415581);
        let b = Location::new(51.120, 71.420);
        assert_eq!(distance_km(a, a), 0.0);
        assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
    }

    #[test]
    fn nearby_points_a_few_blocks_apart_are_about_1_km() {
        let taxi = Location::new(51.111, 71.416);
        let pickup = Location::new(51.120, 71.420);
        let d = distance_km(taxi, pickup);
        assert!((d - 1.05).abs() < 0.05, "expected ~1.05km, got {d}");
    }

    #[test]
    fn cell_of_roundtrips_through_center_within_a_cell_width() {
        let loc = Location::new(51.111339, 71.415581);
        let cell = cell_of(loc, Resolution::Seven).expect("valid coordinates");
        let center = cell_center(cell);
        assert!(distance_km(loc, center) < 1.5);
        assert_eq!(cell_boundary(cell).len() >= 5, true);
    }

    #[test]
    fn invalid_coordinates_return_none() {
        let loc = Location::new(f64::NAN, 0.0);
        assert!(cell_of(loc, Resolution::Seven).is_none());
    }
}
