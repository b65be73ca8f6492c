//! Loading of validated job files
//!
//! Jobs arrive as JSON or CSV exports that already went through column
//! normalization and geocoding upstream; headers keep the upstream
//! column names. Records missing a coordinate or a parseable timestamp
//! are dropped with a warning and counted, never fatal.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{info, warn};

use crate::services::branches::BranchRegistry;
use crate::types::{Coordinates, Job};

/// One raw record as exported upstream. Coordinates and timestamp stay
/// optional here; validation decides whether the record becomes a [`Job`].
#[derive(Debug, Clone, Deserialize)]
pub struct JobRecord {
    #[serde(rename = "NO SOPT")]
    pub id: String,
    #[serde(rename = "CABANG", default)]
    pub branch: String,
    #[serde(rename = "CUST ID", default)]
    pub customer_id: String,
    #[serde(rename = "ALAMAT_LAT", default)]
    pub lat: Option<f64>,
    #[serde(rename = "ALAMAT_LONG", default)]
    pub lng: Option<f64>,
    #[serde(rename = "ACT. LOAD DATE", default)]
    pub scheduled_at: Option<String>,
    #[serde(rename = "SIZE CONT", default)]
    pub size_tag: String,
    #[serde(rename = "GRADE CONT", default)]
    pub grade: String,
    #[serde(rename = "SERVICE TYPE", default)]
    pub service_type: String,
}

/// How many records survived validation and how many were dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropStats {
    pub loaded: usize,
    pub dropped: usize,
}

/// Load one job file, JSON or CSV by extension.
pub fn load_jobs(path: &Path) -> Result<(Vec<Job>, DropStats)> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let records = match extension.as_str() {
        "json" => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read job file {}", path.display()))?;
            serde_json::from_str::<Vec<JobRecord>>(&raw)
                .with_context(|| format!("Failed to parse job file {}", path.display()))?
        }
        "csv" => {
            let mut reader = csv::Reader::from_path(path)
                .with_context(|| format!("Failed to open job file {}", path.display()))?;
            reader
                .deserialize()
                .collect::<std::result::Result<Vec<JobRecord>, _>>()
                .with_context(|| format!("Failed to parse job file {}", path.display()))?
        }
        other => bail!("Unsupported job file format '{}' ({})", other, path.display()),
    };

    let (jobs, stats) = validate_records(records);
    info!(
        "Loaded {} jobs from {} ({} records dropped)",
        stats.loaded,
        path.display(),
        stats.dropped
    );
    Ok((jobs, stats))
}

/// Keep records with a coordinate and a parseable timestamp, drop the rest.
pub fn validate_records(records: Vec<JobRecord>) -> (Vec<Job>, DropStats) {
    let total = records.len();
    let mut jobs = Vec::with_capacity(total);

    for record in records {
        let (Some(lat), Some(lng)) = (record.lat, record.lng) else {
            warn!("Job {} has no coordinates, dropping", record.id);
            continue;
        };
        let Some(scheduled_at) = record.scheduled_at.as_deref().and_then(parse_timestamp) else {
            warn!(
                "Job {} has no parseable schedule ({:?}), dropping",
                record.id, record.scheduled_at
            );
            continue;
        };
        // Unknown branches still load; they fall back to the default port
        if !BranchRegistry::builtin().is_known(&record.branch) {
            warn!("Job {} has unrecognized branch '{}'", record.id, record.branch);
        }

        jobs.push(Job {
            id: record.id,
            branch: record.branch,
            customer_id: record.customer_id.trim().to_string(),
            location: Coordinates::new(lat, lng),
            scheduled_at,
            size_tag: record.size_tag,
            grade: record.grade,
            service_type: record.service_type,
        });
    }

    let stats = DropStats { loaded: jobs.len(), dropped: total - jobs.len() };
    (jobs, stats)
}

/// Accept the upstream export format and common ISO variants.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    // Date-only exports mean start of day
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
