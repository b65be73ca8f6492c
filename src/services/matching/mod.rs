//! Triangulation matching engine
//!
//! One `process_optimization` call takes the day's unload and load jobs,
//! pairs them through the cost matrix, solves the global assignment, and
//! assembles the result payload with per-pair guidance and run-level
//! stats. Each run owns a fresh route cache; nothing carries over
//! between runs except the immutable registries.

pub mod feasibility;
pub mod matrix;
pub mod recommendation;
pub mod solver;

pub use feasibility::{classify, Feasibility, Tolerances};
pub use matrix::{build_cost_matrix, CandidateDetail, CostMatrix, GapModel};
pub use recommendation::{build_recommendation, Recommendation};
pub use solver::solve_assignment;

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::services::branches::BranchRegistry;
use crate::services::durations::DurationStore;
use crate::services::routing::{RouteCache, RouteProvider};
use crate::types::{
    BranchBreakdown, Coordinates, Direction, Job, MatchStats, MatchedPair, OptimizationResult,
};

/// Wire format for result timestamps.
const RESULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fatal matching failures. Everything operational (dead routes, unknown
/// branches, unmatchable jobs) degrades inside the run instead.
#[derive(Debug, Error)]
pub enum MatchError {
    /// The assembled cost matrix broke the solver's shape contract.
    #[error("Cost matrix is malformed: {0}")]
    MalformedMatrix(#[from] pathfinding::matrix::MatrixFormatError),
}

/// The matching engine: immutable registries plus a route provider.
pub struct MatchingEngine {
    registry: &'static BranchRegistry,
    durations: Arc<DurationStore>,
    provider: Arc<dyn RouteProvider>,
    tolerances: Tolerances,
    gap_model: GapModel,
}

impl MatchingEngine {
    pub fn new(provider: Arc<dyn RouteProvider>, durations: Arc<DurationStore>) -> Self {
        Self {
            registry: BranchRegistry::builtin(),
            durations,
            provider,
            tolerances: Tolerances::default(),
            gap_model: GapModel::default(),
        }
    }

    pub fn with_gap_model(mut self, gap_model: GapModel) -> Self {
        self.gap_model = gap_model;
        self
    }

    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Run one optimization batch over the given job sets.
    pub async fn process_optimization(
        &self,
        unload_jobs: &[Job],
        load_jobs: &[Job],
    ) -> Result<OptimizationResult, MatchError> {
        let run_id = Uuid::new_v4();
        info!(
            %run_id,
            provider = self.provider.name(),
            gap_model = ?self.gap_model,
            "Matching run started: {} unload jobs, {} load jobs",
            unload_jobs.len(),
            load_jobs.len()
        );

        let routes = RouteCache::new(self.provider.clone());
        routes.prefetch(&self.port_legs(unload_jobs, load_jobs)).await;

        let cost_matrix = build_cost_matrix(
            unload_jobs,
            load_jobs,
            self.registry,
            &self.durations,
            &routes,
            &self.tolerances,
            self.gap_model,
        )
        .await;

        let pairs = solve_assignment(&cost_matrix.cells)?;

        let mut results = Vec::with_capacity(pairs.len());
        for (row, column) in pairs {
            let Some(detail) = cost_matrix.details.get(&(row, column)) else {
                continue;
            };
            results.push(self.assemble_pair(detail));
        }

        let stats = self.assemble_stats(unload_jobs, load_jobs, &results);
        info!(
            %run_id,
            "Matching run finished: {} matches, {:.2} km saved, Rp {} saved ({} legs cached)",
            stats.total_match,
            stats.saving,
            stats.saving_cost,
            routes.len()
        );

        Ok(OptimizationResult { results, stats })
    }

    /// Port legs for both job sets, so the cache warms with bounded
    /// concurrency before the matrix loop hits it serially.
    fn port_legs(&self, unload_jobs: &[Job], load_jobs: &[Job]) -> Vec<(Coordinates, Coordinates)> {
        let mut legs = Vec::new();
        for job in unload_jobs.iter().chain(load_jobs.iter()) {
            let Some(branch) = self.registry.normalize(&job.branch) else {
                continue;
            };
            let port = self.registry.port_of(&branch);
            legs.push((port, job.location));
            legs.push((job.location, port));
        }
        legs
    }

    fn assemble_pair(&self, detail: &CandidateDetail) -> MatchedPair {
        let rec = build_recommendation(
            detail.pool,
            detail.shift_hours,
            detail.time_gap,
            &detail.actions,
            detail.unload_arrival,
            detail.load_deadline,
            &self.tolerances,
        );
        let port = self.registry.port_of(&detail.branch);

        MatchedPair {
            dest_id: detail.dest_id.clone(),
            orig_id: detail.orig_id.clone(),
            cabang: detail.branch.clone(),
            size_cont: detail.size_tag.clone(),
            status: "MATCHED".to_string(),
            kategori_pool: detail.pool,
            jarak_triangulasi: round2(detail.dist_triangulated),
            jarak_via_port: round2(detail.dist_via_port),
            jarak_bongkar_muat: round2(detail.dist_direct),
            saving_km: round2(detail.saving_km),
            cost_triangulasi: detail.cost_triangulated.round() as i64,
            cost_via_port: detail.cost_via_port.round() as i64,
            saving_cost: detail.saving_cost.round() as i64,
            score_final: round2(detail.score),
            est_perjalanan_jam: round2(detail.est_travel_hours),
            gap_waktu_asli: round2(detail.time_gap),
            rekomendasi_tindakan: rec.text,
            opsi_sisi_origin: rec.origin_option,
            opsi_sisi_dest: rec.dest_option,
            waktu_bongkar_asli: detail.unload_arrival.format(RESULT_DATE_FORMAT).to_string(),
            waktu_muat_asli: detail.load_deadline.format(RESULT_DATE_FORMAT).to_string(),
            durasi_bongkar_est: detail.unload_duration_hours,
            durasi_muat_est: detail.load_duration_hours,
            selesai_bongkar: detail.unload_finish.format(RESULT_DATE_FORMAT).to_string(),
            dest_cust_id: detail.dest_customer.clone(),
            orig_cust_id: detail.orig_customer.clone(),
            dest_time_profile: self.durations.time_profile(
                &detail.dest_customer,
                &detail.branch,
                Direction::Bongkar,
            ),
            orig_time_profile: self.durations.time_profile(
                &detail.orig_customer,
                &detail.branch,
                Direction::Muat,
            ),
            geometry: detail.shape.clone(),
            origin_coords: detail.orig_location.as_pair(),
            dest_coords: detail.dest_location.as_pair(),
            port_coords: port.as_pair(),
        }
    }

    /// Per-branch counts cover every input job whose branch normalizes,
    /// matched or not; savings accumulate from the matched pairs only.
    fn assemble_stats(
        &self,
        unload_jobs: &[Job],
        load_jobs: &[Job],
        results: &[MatchedPair],
    ) -> MatchStats {
        let mut breakdown: BTreeMap<String, BranchBreakdown> = BTreeMap::new();

        for job in unload_jobs {
            if let Some(branch) = self.registry.normalize(&job.branch) {
                branch_entry(&mut breakdown, branch).total_dest += 1;
            }
        }
        for job in load_jobs {
            if let Some(branch) = self.registry.normalize(&job.branch) {
                branch_entry(&mut breakdown, branch).total_origin += 1;
            }
        }
        for pair in results {
            if let Some(stats) = breakdown.get_mut(&pair.cabang) {
                stats.matches += 1;
                stats.saving += pair.saving_km;
                stats.saving_cost += pair.saving_cost;
            }
        }

        MatchStats {
            total_match: results.len(),
            total_origin: load_jobs.len(),
            total_dest: unload_jobs.len(),
            saving: results.iter().map(|r| r.saving_km).sum(),
            saving_cost: results.iter().map(|r| r.saving_cost).sum(),
            cabang_breakdown: breakdown.into_values().collect(),
        }
    }
}

fn branch_entry(
    breakdown: &mut BTreeMap<String, BranchBreakdown>,
    branch: String,
) -> &mut BranchBreakdown {
    breakdown.entry(branch.clone()).or_insert_with(|| BranchBreakdown {
        cabang: branch,
        total_origin: 0,
        total_dest: 0,
        matches: 0,
        saving: 0.0,
        saving_cost: 0,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
