//! Engine configuration: fleet size, timing, and matcher mode.
//!
//! A single struct with a `Default` impl holding the production constants,
//! plus `with_*` builder setters for the handful of values worth overriding
//! at startup.

use h3o::Resolution;

use crate::geo::Location;
use crate::matching::MatchMode;

/// Operational center: Astana, Kazakhstan.
pub const DEFAULT_CENTER: Location = Location {
    lat: 51.111339,
    lng: 71.415581,
};

pub const DEFAULT_MAX_TAXIS: usize = 10;
pub const DEFAULT_MAX_PENDING_ORDERS: usize = 50;
pub const DEFAULT_MAX_COMPLETED_ORDERS: usize = 2;
pub const DEFAULT_H3_RESOLUTION: Resolution = Resolution::Seven;
pub const DEFAULT_CREDENTIAL_POOL_SIZE: usize = 5;

/// Half-width (degrees) of the square taxis/order pickups/dropoffs are
/// sampled within, around their respective center point.
pub const SPAWN_HALF_WIDTH_DEG: f64 = 0.035;

/// Half-width (degrees) of the bounding box the hex tiling samples over.
pub const TILING_HALF_WIDTH_DEG: f64 = 0.10;

pub const TILING_LAT_STEPS: usize = 20;
pub const TILING_LNG_STEPS: usize = 25;

pub const GENERATOR_PERIOD_SECS: u64 = 3;
pub const MATCHER_PERIOD_SECS: u64 = 5;
pub const DEMAND_BROADCAST_PERIOD_SECS: u64 = 2;

pub const ROUTE_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const ROUTE_RETRY_ATTEMPTS: u32 = 4;
pub const ROUTE_BACKOFF_BASE_SECS: u64 = 2;
pub const ROUTE_FALLBACK_POINTS: usize = 21;
pub const ROUTE_FALLBACK_DURATION_SECS: f64 = 60.0;

/// Top-level engine configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub center: Location,
    pub max_taxis: usize,
    pub max_pending_orders: usize,
    pub max_completed_orders: usize,
    pub h3_resolution: Resolution,
    pub spawn_half_width_deg: f64,
    pub tiling_half_width_deg: f64,
    pub match_mode: MatchMode,
    pub routing: RoutingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            max_taxis: DEFAULT_MAX_TAXIS,
            max_pending_orders: DEFAULT_MAX_PENDING_ORDERS,
            max_completed_orders: DEFAULT_MAX_COMPLETED_ORDERS,
            h3_resolution: DEFAULT_H3_RESOLUTION,
            spawn_half_width_deg: SPAWN_HALF_WIDTH_DEG,
            tiling_half_width_deg: TILING_HALF_WIDTH_DEG,
            match_mode: MatchMode::Hybrid,
            routing: RoutingConfig::default(),
        }
    }
}

impl Config {
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    pub fn with_max_taxis(mut self, n: usize) -> Self {
        self.max_taxis = n;
        self
    }
}

/// Routing provider configuration: endpoint, credential pool, retry timing.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub credentials: Vec<String>,
    pub request_timeout_secs: u64,
    pub retry_attempts: u32,
    pub backoff_base_secs: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.openrouteservice.org/v2/directions/driving-car/geojson"
                .to_string(),
            credentials: Vec::new(),
            request_timeout_secs: ROUTE_REQUEST_TIMEOUT_SECS,
            retry_attempts: ROUTE_RETRY_ATTEMPTS,
            backoff_base_secs: ROUTE_BACKOFF_BASE_SECS,
        }
    }
}
