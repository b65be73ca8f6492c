//! Roundtrip Worker - triangulation matching for container trucking
//!
//! Pairs unload jobs (port → customer) with load jobs (customer → port)
//! so one truck can serve both without an empty leg back to the port.

mod cli;
mod config;
mod defaults;
mod ingest;
mod services;
mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::services::branches::BranchRegistry;
use crate::services::durations::DurationStore;
use crate::services::matching::MatchingEngine;
use crate::services::routing::create_route_provider;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs directory - use LOGS_DIR env var or default to ../logs (relative to worker)
    let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "../logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "worker.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stdout and file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,roundtrip_worker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer()) // stdout
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false)) // file
        .init();

    info!("Starting Roundtrip Worker...");

    // Load configuration
    let config = config::Config::from_env()?;
    info!("Configuration loaded");

    match cli::Cli::parse().command {
        cli::Command::Optimize { dest, orig, output, gap_model } => {
            let durations =
                DurationStore::load_or_default(config.duration_lookup_path.as_deref());

            let (dest_jobs, dest_stats) = ingest::load_jobs(&dest)?;
            let (orig_jobs, orig_stats) = ingest::load_jobs(&orig)?;
            info!(
                "Job sets ready: {} unload ({} dropped), {} load ({} dropped)",
                dest_stats.loaded, dest_stats.dropped, orig_stats.loaded, orig_stats.dropped
            );

            let provider = create_route_provider(config.valhalla_url.clone()).await;
            let engine =
                MatchingEngine::new(provider, Arc::new(durations)).with_gap_model(gap_model);

            let result = match config.run_timeout_secs {
                Some(secs) => tokio::time::timeout(
                    std::time::Duration::from_secs(secs),
                    engine.process_optimization(&dest_jobs, &orig_jobs),
                )
                .await
                .map_err(|_| anyhow::anyhow!("Optimization run timed out after {}s", secs))??,
                None => engine.process_optimization(&dest_jobs, &orig_jobs).await?,
            };

            let payload = serde_json::to_string_pretty(&result)
                .context("Failed to serialize optimization result")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, payload)
                        .with_context(|| format!("Failed to write result to {}", path.display()))?;
                    info!("Result written to {}", path.display());
                }
                None => println!("{payload}"),
            }
        }
        cli::Command::Branches => {
            let registry = BranchRegistry::builtin();
            for code in registry.codes() {
                let port = registry.port_of(code);
                println!("{code}  {:.6}, {:.6}", port.lat, port.lng);
            }
        }
    }

    Ok(())
}
