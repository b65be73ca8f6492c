//! Valhalla routing engine client
//!
//! Valhalla API documentation:
//! https://valhalla.github.io/valhalla/api/turn-by-turn/api-reference/

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{RouteLeg, RouteProvider};
use crate::defaults::{ROUTE_MAX_RETRIES, ROUTE_RETRY_DELAY_SECS, ROUTE_TIMEOUT_SECS};
use crate::types::Coordinates;

/// Valhalla client configuration
#[derive(Debug, Clone)]
pub struct ValhallaConfig {
    /// Base URL of Valhalla server (e.g., "http://localhost:8002")
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Attempts per leg before giving up
    pub max_retries: u32,
    /// Base delay between attempts in seconds (grows linearly)
    pub retry_delay_seconds: u64,
}

impl Default for ValhallaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8002".to_string(),
            timeout_seconds: ROUTE_TIMEOUT_SECS,
            max_retries: ROUTE_MAX_RETRIES,
            retry_delay_seconds: ROUTE_RETRY_DELAY_SECS,
        }
    }
}

impl ValhallaConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// Valhalla routing client
pub struct ValhallaClient {
    client: Client,
    config: ValhallaConfig,
}

impl ValhallaClient {
    pub fn new(config: ValhallaConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Build the point-to-point route request
    fn build_route_request(&self, from: &Coordinates, to: &Coordinates) -> RouteRequest {
        RouteRequest {
            locations: vec![
                ValhallaLocation { lat: from.lat, lon: from.lng },
                ValhallaLocation { lat: to.lat, lon: to.lng },
            ],
            costing: "truck".to_string(),
            units: "km".to_string(),
        }
    }

    async fn try_route(&self, url: &str, request: &RouteRequest) -> Result<Option<RouteLeg>> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .context("Failed to send route request to Valhalla")?;

        let status = response.status();
        if status.is_client_error() {
            // Router answered but can't connect the points (unroutable
            // coordinates, island pairs). Not a transport failure.
            let body = response.text().await.unwrap_or_default();
            debug!("Valhalla found no route ({}): {}", status, body);
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Valhalla route returned error {}: {}", status, body);
        }

        let route: RouteResponse = response
            .json()
            .await
            .context("Failed to parse Valhalla route response")?;

        let shape = route.trip.legs.into_iter().next().map(|leg| leg.shape);
        Ok(Some(RouteLeg {
            distance_km: route.trip.summary.length,
            duration_hours: route.trip.summary.time / 3600.0,
            shape,
        }))
    }
}

#[async_trait]
impl RouteProvider for ValhallaClient {
    async fn route(&self, from: &Coordinates, to: &Coordinates) -> Result<Option<RouteLeg>> {
        let request = self.build_route_request(from, to);
        let url = format!("{}/route", self.config.base_url);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_route(&url, &request).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if attempt < self.config.max_retries => {
                    warn!(
                        "Route request attempt {}/{} failed: {:#}",
                        attempt, self.config.max_retries, e
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(
                        self.config.retry_delay_seconds * attempt as u64,
                    ))
                    .await;
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Valhalla route failed after {} attempts", attempt)
                    });
                }
            }
        }
    }

    fn name(&self) -> &str {
        "Valhalla"
    }
}

// Valhalla API types

#[derive(Debug, Serialize)]
struct RouteRequest {
    locations: Vec<ValhallaLocation>,
    costing: String,
    units: String,
}

#[derive(Debug, Serialize, Clone)]
struct ValhallaLocation {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    trip: Trip,
}

#[derive(Debug, Deserialize)]
struct Trip {
    summary: TripSummary,
    legs: Vec<Leg>,
}

#[derive(Debug, Deserialize)]
struct TripSummary {
    /// Length in kilometers (when units="km")
    length: f64,
    /// Time in seconds
    time: f64,
}

#[derive(Debug, Deserialize)]
struct Leg {
    /// Encoded polyline shape
    shape: String,
}
