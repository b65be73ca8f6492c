//! Configuration management

use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Valhalla routing engine URL (optional, falls back to mock if unavailable)
    pub valhalla_url: Option<String>,

    /// Path to the service-duration lookup JSON (optional, global default
    /// durations apply when unset)
    pub duration_lookup_path: Option<PathBuf>,

    /// Overall per-run timeout in seconds (optional, unbounded when unset)
    pub run_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let valhalla_url = std::env::var("VALHALLA_URL").ok().filter(|url| !url.is_empty());

        let duration_lookup_path = std::env::var("DURATION_LOOKUP_PATH")
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        let run_timeout_secs = match std::env::var("RUN_TIMEOUT_SECS") {
            Ok(raw) if !raw.is_empty() => Some(
                raw.parse::<u64>()
                    .with_context(|| format!("Invalid RUN_TIMEOUT_SECS value '{}'", raw))?,
            ),
            _ => None,
        };

        Ok(Self {
            valhalla_url,
            duration_lookup_path,
            run_timeout_secs,
        })
    }
}
