//! GeoJSON response shapes for the directions provider.
//!
//! Only the fields the engine actually reads are modeled — the provider's
//! real response carries a great deal more (bbox, extras, warnings) that
//! nothing here needs.

use serde::Deserialize;

use crate::model::Route;

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    pub features: Vec<DirectionsFeature>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsFeature {
    pub geometry: DirectionsGeometry,
    pub properties: DirectionsProperties,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsGeometry {
    /// `[lng, lat]` pairs, GeoJSON order.
    pub coordinates: Vec<(f64, f64)>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsProperties {
    pub summary: DirectionsSummary,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsSummary {
    pub duration: f64,
}

impl DirectionsResponse {
    /// Convert the first feature's geometry into a [`Route`], swapping
    /// GeoJSON's `(lng, lat)` order to the engine's `(lat, lng)`.
    pub fn into_route(mut self) -> Option<Route> {
        if self.features.is_empty() {
            return None;
        }
        let feature = self.features.remove(0);
        if feature.geometry.coordinates.is_empty() {
            return None;
        }
        let duration = feature.properties.summary.duration;
        let path = feature
            .geometry
            .coordinates
            .into_iter()
            .map(|(lng, lat)| (lat, lng))
            .collect();
        Some(Route { path, duration })
    }
}
