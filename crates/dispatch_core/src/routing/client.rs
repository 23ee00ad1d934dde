//! HTTP client for the external directions provider.
//!
//! Pick a random credential from
//! the pool for this call, request with a timeout, retry up to
//! `retry_attempts` times with exponential backoff, rotate to a fresh
//! random credential when a 429 shows up late in the retry budget, and fall
//! back to a straight line if every attempt fails (or the provider is
//! disabled).

use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::config::RoutingConfig;
use crate::geo::Location;
use crate::model::Route;

use super::backoff::BackoffPolicy;
use super::error::RoutingError;
use super::fallback::build_fallback_route;
use super::response::DirectionsResponse;

pub struct RoutingClient {
    http: reqwest::Client,
    endpoint: String,
    credentials: Vec<String>,
    enabled: bool,
    backoff: BackoffPolicy,
}

impl RoutingClient {
    pub fn new(config: &RoutingConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            endpoint: config.endpoint.clone(),
            credentials: config.credentials.clone(),
            enabled: config.enabled && !config.credentials.is_empty(),
            backoff: BackoffPolicy::new(config.retry_attempts, config.backoff_base_secs),
        }
    }

    /// Acquire a route from `from` to `to`. Never fails: on any provider
    /// error, timeout, or if routing is disabled, returns the deterministic
    /// straight-line fallback instead.
    pub async fn route(&self, from: Location, to: Location) -> Route {
        if !self.enabled {
            return build_fallback_route(from, to);
        }
        match self.try_route(from, to).await {
            Ok(route) => route,
            Err(err) => {
                warn!(error = %err, "route provider exhausted, using fallback route");
                build_fallback_route(from, to)
            }
        }
    }

    /// Random uniform pick over the credential pool, per call. Calls never
    /// share rotation state, so concurrent calls are free to land on the
    /// same credential.
    fn random_credential(&self) -> &str {
        self.credentials
            .choose(&mut rand::thread_rng())
            .expect("checked non-empty by try_route")
    }

    async fn try_route(&self, from: Location, to: Location) -> Result<Route, RoutingError> {
        if self.credentials.is_empty() {
            return Err(RoutingError::NoCredentials);
        }

        let mut credential = self.random_credential().to_string();
        let mut attempt = 0;
        loop {
            let result = self.request_once(from, to, &credential).await;

            match result {
                Ok(route) => return Ok(route),
                Err(RoutingError::Status(status)) if status == 429 => {
                    if self.backoff.should_rotate_credential(attempt, status) {
                        credential = self.random_credential().to_string();
                        debug!(credential = %credential, "rotating to a fresh routing credential");
                    }
                    if !self.backoff.should_retry(attempt) {
                        return Err(RoutingError::Status(status));
                    }
                    debug!(attempt, status, "routing request rate-limited, retrying");
                    tokio::time::sleep(self.backoff.delay_for(attempt)).await;
                    attempt += 1;
                }
                Err(err) => {
                    if !self.backoff.should_retry(attempt) {
                        return Err(err);
                    }
                    debug!(attempt, error = %err, "routing request failed, retrying");
                    tokio::time::sleep(self.backoff.delay_for(attempt)).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn request_once(
        &self,
        from: Location,
        to: Location,
        credential: &str,
    ) -> Result<Route, RoutingError> {
        let body = serde_json::json!({
            "coordinates": [[from.lng, from.lat], [to.lng, to.lat]],
        });

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("api_key", credential)])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RoutingError::Status(response.status().as_u16()));
        }

        let parsed: DirectionsResponse = response.json().await?;
        parsed.into_route().ok_or(RoutingError::EmptyGeometry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(credentials: Vec<&str>) -> RoutingConfig {
        RoutingConfig {
            enabled: true,
            endpoint: "http://127.0.0.1:0/unused".to_string(),
            credentials: credentials.into_iter().map(String::from).collect(),
            request_timeout_secs: 1,
            retry_attempts: 2,
            backoff_base_secs: 0,
        }
    }

    #[test]
    fn disabled_config_disables_the_client() {
        let mut cfg = config_with(vec!["key-a"]);
        cfg.enabled = false;
        let client = RoutingClient::new(&cfg);
        assert!(!client.enabled);
    }

    #[test]
    fn random_credential_always_picks_from_the_pool() {
        let cfg = config_with(vec!["key-a", "key-b"]);
        let client = RoutingClient::new(&cfg);
        for _ in 0..20 {
            assert!(["key-a", "key-b"].contains(&client.random_credential()));
        }
    }

    #[tokio::test]
    async fn falls_back_when_routing_is_disabled() {
        let mut cfg = config_with(vec!["key-a"]);
        cfg.enabled = false;
        let client = RoutingClient::new(&cfg);
        let from = Location::new(51.1, 71.4);
        let to = Location::new(51.2, 71.5);
        let route = client.route(from, to).await;
        assert_eq!(route.duration, 60.0);
    }
}
