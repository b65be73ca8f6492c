//! Route distance provider for truck legs
//!
//! Uses Valhalla for production, mock for tests.

mod cache;
mod valhalla;

pub use cache::RouteCache;
pub use valhalla::{ValhallaClient, ValhallaConfig};

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::Coordinates;

/// One resolved truck leg between two coordinates.
#[derive(Debug, Clone)]
pub struct RouteLeg {
    /// Road distance in kilometers.
    pub distance_km: f64,
    /// Router-estimated drive time in hours. Reporting only; schedule
    /// arithmetic in the matching engine uses fleet speeds instead.
    pub duration_hours: f64,
    /// Encoded polyline of the leg when the router supplied one.
    pub shape: Option<String>,
}

/// Route provider abstraction (Valhalla, mock, etc.)
///
/// `Ok(None)` means the router answered but found no route between the
/// points; `Err` means transport failure after retries. The per-run
/// [`RouteCache`] degrades both to an unresolved leg.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Resolve the leg from one coordinate to another.
    async fn route(&self, from: &Coordinates, to: &Coordinates) -> Result<Option<RouteLeg>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Mock route provider for tests and router-less environments
/// Uses Haversine distance × coefficient for estimation
pub struct MockRouteProvider {
    /// Coefficient for converting straight-line to road distance (default: 1.3)
    road_coefficient: f64,
    /// Average speed in km/h for time estimation (default: 40)
    average_speed_kmh: f64,
}

impl Default for MockRouteProvider {
    fn default() -> Self {
        Self {
            road_coefficient: 1.3,
            average_speed_kmh: 40.0,
        }
    }
}

impl MockRouteProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(road_coefficient: f64, average_speed_kmh: f64) -> Self {
        Self {
            road_coefficient,
            average_speed_kmh,
        }
    }
}

#[async_trait]
impl RouteProvider for MockRouteProvider {
    async fn route(&self, from: &Coordinates, to: &Coordinates) -> Result<Option<RouteLeg>> {
        use crate::services::geo::haversine_distance;

        let distance_km = haversine_distance(from, to) * self.road_coefficient;
        Ok(Some(RouteLeg {
            distance_km,
            duration_hours: distance_km / self.average_speed_kmh,
            shape: None,
        }))
    }

    fn name(&self) -> &str {
        "MockRouting"
    }
}

/// Create a route provider with automatic Valhalla detection and fallback
///
/// Tries to connect to Valhalla if a URL is provided. Falls back to the
/// mock provider if Valhalla is unavailable or no URL is configured.
pub async fn create_route_provider(valhalla_url: Option<String>) -> Arc<dyn RouteProvider> {
    use tracing::{info, warn};

    if let Some(url) = valhalla_url {
        let config = ValhallaConfig::new(&url);
        let client = ValhallaClient::new(config);

        // Test connection with a simple health check
        match check_valhalla_health(&url).await {
            Ok(()) => {
                info!("Valhalla routing available at {}", url);
                return Arc::new(client);
            }
            Err(e) => {
                warn!("Valhalla not available at {}: {}. Falling back to mock routing.", url, e);
            }
        }
    }

    info!("Using mock route provider (Valhalla not configured or unavailable)");
    Arc::new(MockRouteProvider::new())
}

/// Check if Valhalla is healthy by making a simple status request
async fn check_valhalla_health(base_url: &str) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()?;

    let url = format!("{}/status", base_url);
    let response = client.get(&url).send().await?;

    if response.status().is_success() {
        Ok(())
    } else {
        anyhow::bail!("Valhalla returned status {}", response.status())
    }
}
